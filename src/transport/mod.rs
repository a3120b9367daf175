// Copyright 2024 The SqlJob Client Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Transport used by a job to talk with the server

mod mock_transport;

use async_trait::async_trait;
pub use mock_transport::MockTransport;

use crate::errors::Result;

/// The abstraction for the socket connection owned by a job.
///
/// Implementations carry already encoded text frames and know nothing about
/// queries. Pairing a request with its reply is the job's business, see
/// [`SqlJob::exchange`](crate::job::SqlJob::exchange).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one encoded request.
    async fn send(&self, payload: String) -> Result<()>;

    /// Wait for the next inbound frame.
    ///
    /// There is no timeout here, a stalled server blocks the caller until the
    /// connection is closed.
    async fn recv(&self) -> Result<String>;
}
