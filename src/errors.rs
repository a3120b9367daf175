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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The query is in a state where the requested operation makes no sense,
    /// e.g. running a statement that has already been run.
    ///
    /// Nothing has been sent to the server when this is returned.
    #[error("usage error, msg:{0}")]
    Usage(String),

    /// The server answered the request and reported a failure.
    #[error("server error, msg:{0}")]
    Server(ServerError),

    /// Connection between client and server is broken.
    #[error("connect error, msg:{0}")]
    Connect(String),

    /// Error raised by the underlying transport while sending or receiving.
    #[error("transport error, err:{0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Failed to encode a request or decode a response envelope.
    #[error("codec error, err:{0}")]
    Codec(#[from] serde_json::Error),

    /// Invalid options or configuration, detected before any io.
    #[error("config error, msg:{0}")]
    Config(String),
}

/// Failure reported by the server in a response envelope.
///
/// `message` is the aggregated, comma joined form of whichever of `error`,
/// `sql_state` and `sql_rc` the server returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    pub message: String,
    pub sql_state: Option<String>,
    pub sql_rc: Option<i64>,
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error {
    /// Whether the error came from the connection rather than from the query
    /// itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Connect(_) | Error::Transport(_) | Error::Codec(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
