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

/// Default number of rows requested per fetch.
pub const DEFAULT_ROWS_TO_FETCH: u32 = 100;

/// Config for a [`SqlJob`](crate::job::SqlJob).
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Rows requested by the first run of a query unless the caller passes
    /// an explicit count.
    ///
    /// Default value is 100, must be at least 1.
    pub default_rows_to_fetch: u32,
    /// Keep a registry of the queries created through the job.
    ///
    /// It is enabled by default.
    pub track_queries: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            default_rows_to_fetch: DEFAULT_ROWS_TO_FETCH,
            track_queries: true,
        }
    }
}
