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

//! Client for a remote sql job service.
//!
//! A [`SqlJob`] owns the connection, a [`Query`] drives one statement through
//! its lifecycle on it:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sqljob_client::{MockTransport, QueryOptions, SqlJobBuilder};
//!
//! # async fn example() -> sqljob_client::Result<()> {
//! let job = SqlJobBuilder::new(Arc::new(MockTransport::new())).build()?;
//! let mut query = job.query("select * from qiws.qcustcdt", QueryOptions::default());
//! let first_page = query.run(Some(10)).await?;
//! println!("{:?}", first_page.field("data"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod job;
pub mod model;
pub mod options;
pub mod query;
pub mod transport;

pub use crate::{
    config::JobConfig,
    errors::{Error, Result, ServerError},
    job::{SqlJob, SqlJobBuilder},
    model::{QueryRequest, ResponseEnvelope},
    options::QueryOptions,
    query::{Query, QueryState},
    transport::{MockTransport, Transport},
};
