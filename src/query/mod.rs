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

//! Query lifecycle
//!
//! A [`Query`] is one sql statement or CL command bound to a [`SqlJob`]. It is
//! run once, then paged with [`Query::fetch_more`] until the server reports
//! it done, and it refuses to be run again after that.

mod state;

use std::sync::Arc;

use serde_json::Value;
pub use state::QueryState;
use tracing::{debug, warn};

use crate::{
    errors::{Error, Result},
    job::SqlJob,
    model::{QueryRequest, ResponseEnvelope, SqlRequest},
    options::QueryOptions,
};

/// Request shape, fixed when the query is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    ClCommand,
    Sql,
    PrepareSqlExecute,
}

pub struct Query {
    job: Arc<SqlJob>,
    handle: u64,
    sql: String,
    dispatch: Dispatch,
    is_prepared: bool,
    parameters: Option<Vec<Value>>,
    should_auto_close: bool,
    is_terse_results: bool,
    rows_to_fetch: u32,
    state: QueryState,
    correlation_id: Option<String>,
}

impl Query {
    /// Create a query on `job`. No io happens until [`Query::run`].
    pub fn new(job: Arc<SqlJob>, sql: impl Into<String>, opts: QueryOptions) -> Self {
        let sql = sql.into();
        let is_prepared = opts.parameters.is_none();
        let dispatch = if opts.is_cl_command {
            Dispatch::ClCommand
        } else if is_prepared {
            Dispatch::PrepareSqlExecute
        } else {
            Dispatch::Sql
        };
        let handle = job.registry().register(&sql);
        let rows_to_fetch = job.config().default_rows_to_fetch;

        Self {
            job,
            handle,
            sql,
            dispatch,
            is_prepared,
            parameters: opts.parameters,
            should_auto_close: opts.auto_close,
            is_terse_results: opts.is_terse_results,
            rows_to_fetch,
            state: QueryState::NotYetRun,
            correlation_id: None,
        }
    }

    /// Run the query and return the first page.
    ///
    /// `rows_to_fetch` replaces the stored page size when given. Fails without
    /// sending anything if the query has been run before.
    pub async fn run(&mut self, rows_to_fetch: Option<u32>) -> Result<ResponseEnvelope> {
        match self.state {
            QueryState::NotYetRun => {}
            QueryState::RunMoreDataAvail => {
                return Err(Error::Usage("statement has already been run".to_string()))
            }
            QueryState::RunDone => {
                return Err(Error::Usage(
                    "statement has already been fully run".to_string(),
                ))
            }
            QueryState::Error => {
                return Err(Error::Usage(
                    "statement failed previously and can't be run again".to_string(),
                ))
            }
        }
        self.set_rows_to_fetch(rows_to_fetch)?;

        let request = self.run_request();
        let resp = self.job.exchange(&request).await?;
        self.handle_response(&request, resp)
    }

    /// Fetch the next page of a query that has more data available.
    pub async fn fetch_more(&mut self, rows_to_fetch: Option<u32>) -> Result<ResponseEnvelope> {
        let cont_id = self.continuation_id("fetch more")?;
        self.set_rows_to_fetch(rows_to_fetch)?;

        let request = QueryRequest::SqlMore {
            id: self.job.unique_id("fetchMore"),
            cont_id,
            rows: self.rows_to_fetch,
        };
        let resp = self.job.exchange(&request).await?;
        self.handle_response(&request, resp)
    }

    /// Close the query on the server before all rows are fetched.
    ///
    /// Closing an exhausted or failed query does nothing.
    pub async fn close(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Ok(());
        }
        let cont_id = self.continuation_id("close")?;

        let request = QueryRequest::SqlClose {
            id: self.job.unique_id("sqlclose"),
            cont_id,
        };
        let resp = self.job.exchange(&request).await?;
        if !resp.success {
            warn!(handle = self.handle, id = request.id(), "failed to close query");
            return Err(Error::Server(resp.to_server_error()));
        }

        self.advance(QueryState::RunDone);
        Ok(())
    }

    fn set_rows_to_fetch(&mut self, rows_to_fetch: Option<u32>) -> Result<()> {
        match rows_to_fetch {
            Some(0) => Err(Error::Config("rows to fetch must be at least 1".to_string())),
            Some(rows) => {
                self.rows_to_fetch = rows;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Correlation id to continue from, only available while more data is
    /// available.
    fn continuation_id(&self, op: &str) -> Result<String> {
        match self.state {
            QueryState::RunMoreDataAvail => self
                .correlation_id
                .clone()
                .ok_or_else(|| Error::Usage(format!("can't {op}, no correlation id"))),
            QueryState::NotYetRun => Err(Error::Usage(format!(
                "can't {op}, statement has not been run yet"
            ))),
            QueryState::RunDone => Err(Error::Usage(format!(
                "can't {op}, statement has already been fully run"
            ))),
            QueryState::Error => Err(Error::Usage(format!(
                "can't {op}, statement failed previously"
            ))),
        }
    }

    fn run_request(&self) -> QueryRequest {
        match self.dispatch {
            Dispatch::ClCommand => QueryRequest::Cl {
                id: self.job.unique_id("clcommand"),
                terse: self.is_terse_results,
                cmd: self.sql.clone(),
            },
            Dispatch::Sql => QueryRequest::Sql(self.sql_request()),
            Dispatch::PrepareSqlExecute => QueryRequest::PrepareSqlExecute(self.sql_request()),
        }
    }

    fn sql_request(&self) -> SqlRequest {
        SqlRequest {
            id: self.job.unique_id("query"),
            sql: self.sql.clone(),
            terse: self.is_terse_results,
            rows: self.rows_to_fetch,
            parameters: self.parameters.clone(),
        }
    }

    fn handle_response(
        &mut self,
        request: &QueryRequest,
        resp: ResponseEnvelope,
    ) -> Result<ResponseEnvelope> {
        if !resp.success {
            // CL commands report failures in their messages, not through
            // `success`.
            if self.dispatch == Dispatch::ClCommand {
                warn!(
                    handle = self.handle,
                    id = request.id(),
                    "cl command reported failure"
                );
            } else {
                let err = resp.to_server_error();
                warn!(handle = self.handle, id = request.id(), error = %err, "query failed");
                self.advance(QueryState::Error);
                return Err(Error::Server(err));
            }
        }

        // Pages are always continued from the id of the first run.
        if self.correlation_id.is_none() {
            let correlation_id = resp
                .id
                .clone()
                .unwrap_or_else(|| request.id().to_string());
            self.correlation_id = Some(correlation_id);
        }
        self.advance(if resp.is_done {
            QueryState::RunDone
        } else {
            QueryState::RunMoreDataAvail
        });

        Ok(resp)
    }

    fn advance(&mut self, next: QueryState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!(handle = self.handle, from = %self.state, to = %next, "query state changed");

        self.state = next;
        self.job
            .registry()
            .update(self.handle, next, self.correlation_id.as_deref());
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// True iff the query was created without parameters.
    pub fn is_prepared(&self) -> bool {
        self.is_prepared
    }

    pub fn parameters(&self) -> Option<&[Value]> {
        self.parameters.as_deref()
    }

    pub fn is_cl_command(&self) -> bool {
        self.dispatch == Dispatch::ClCommand
    }

    pub fn should_auto_close(&self) -> bool {
        self.should_auto_close
    }

    pub fn is_terse_results(&self) -> bool {
        self.is_terse_results
    }

    pub fn rows_to_fetch(&self) -> u32 {
        self.rows_to_fetch
    }

    /// Id of the server side query, set once a run succeeded.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Handle of the query in its job's registry.
    pub fn handle(&self) -> u64 {
        self.handle
    }
}

impl std::fmt::Debug for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("handle", &self.handle)
            .field("sql", &self.sql)
            .field("dispatch", &self.dispatch)
            .field("rows_to_fetch", &self.rows_to_fetch)
            .field("state", &self.state)
            .field("correlation_id", &self.correlation_id)
            .finish()
    }
}

impl Drop for Query {
    fn drop(&mut self) {
        self.job.registry().forget(self.handle);
    }
}
