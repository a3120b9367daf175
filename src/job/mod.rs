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

//! The job owning one server connection

mod builder;
mod registry;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

pub use builder::SqlJobBuilder;
use dashmap::DashSet;
pub use registry::{QueryEntry, QueryRegistry};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::{
    config::JobConfig,
    errors::Result,
    model::{QueryRequest, ResponseEnvelope},
    options::QueryOptions,
    query::Query,
    transport::Transport,
};

/// A connection to the sql job server.
///
/// Every query created on the job dispatches through [`SqlJob::exchange`],
/// which pairs each request with exactly one reply.
pub struct SqlJob {
    transport: Arc<dyn Transport>,
    config: JobConfig,
    id_counter: AtomicU64,
    // Held from send until the reply has been read.
    exchange_lock: Mutex<()>,
    // Ids of requests whose exchange was dropped before the reply was read.
    abandoned: DashSet<String>,
    registry: QueryRegistry,
}

impl SqlJob {
    pub(crate) fn new(transport: Arc<dyn Transport>, config: JobConfig) -> Self {
        let registry = QueryRegistry::new(config.track_queries);
        Self {
            transport,
            config,
            id_counter: AtomicU64::new(0),
            exchange_lock: Mutex::new(()),
            abandoned: DashSet::new(),
            registry,
        }
    }

    /// Create a query bound to this job.
    pub fn query(self: &Arc<Self>, sql: impl Into<String>, opts: QueryOptions) -> Query {
        Query::new(self.clone(), sql, opts)
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn registry(&self) -> &QueryRegistry {
        &self.registry
    }

    /// Allocate a fresh correlation id, e.g. `query7`.
    ///
    /// The counter is shared by all categories, so ids never repeat on one
    /// job.
    pub fn unique_id(&self, category: &str) -> String {
        let n = self.id_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{category}{n}")
    }

    /// Send an already encoded payload.
    ///
    /// This bypasses the exchange lock, queries never call it directly.
    pub async fn send(&self, payload: String) -> Result<()> {
        trace!(%payload, "send frame");
        self.transport.send(payload).await
    }

    /// Read and decode the next reply from the connection.
    pub async fn recv(&self) -> Result<ResponseEnvelope> {
        let frame = self.transport.recv().await?;
        trace!(%frame, "recv frame");
        Ok(serde_json::from_str(&frame)?)
    }

    /// Send `request` and wait for its reply as one transaction.
    ///
    /// Concurrent callers are serialized, so a reply is never read by a query
    /// it doesn't belong to. No timeout and no retry.
    ///
    /// Dropping the returned future after the request went out (e.g. under a
    /// caller's timeout) leaves its reply on the connection. The request id is
    /// remembered and the stale reply is discarded by a later exchange.
    pub async fn exchange(&self, request: &QueryRequest) -> Result<ResponseEnvelope> {
        let payload = serde_json::to_string(request)?;

        let _guard = self.exchange_lock.lock().await;
        debug!(id = request.id(), kind = request.kind(), "dispatch request");

        let mut in_flight = InFlight::new(&self.abandoned, request.id());
        let result = self.round_trip(request, payload).await;
        in_flight.finish();

        result
    }

    async fn round_trip(&self, request: &QueryRequest, payload: String) -> Result<ResponseEnvelope> {
        self.send(payload).await?;

        loop {
            let resp = self.recv().await?;
            let Some(echoed) = resp.id.as_deref() else {
                return Ok(resp);
            };

            if echoed == request.id() {
                return Ok(resp);
            }
            if self.abandoned.remove(echoed).is_some() {
                debug!(echoed, "discard reply of abandoned request");
                continue;
            }

            warn!(
                sent = request.id(),
                echoed, "reply carries a different correlation id"
            );
            return Ok(resp);
        }
    }

    /// Number of abandoned requests whose reply has not been discarded yet.
    pub fn abandoned_requests(&self) -> usize {
        self.abandoned.len()
    }
}

/// Marks the request abandoned unless finished before being dropped.
struct InFlight<'a> {
    abandoned: &'a DashSet<String>,
    id: &'a str,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn new(abandoned: &'a DashSet<String>, id: &'a str) -> Self {
        Self {
            abandoned,
            id,
            finished: false,
        }
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(id = self.id, "exchange dropped before its reply was read");
            self.abandoned.insert(self.id.to_string());
        }
    }
}
