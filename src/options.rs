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

//! Options for a single query

use serde_json::Value;

/// Options used when creating a [`Query`](crate::query::Query).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Run the text as a CL (system) command instead of sql.
    pub is_cl_command: bool,
    /// Bind parameters.
    ///
    /// Presence, not emptiness, decides whether the query is prepared: a query
    /// without parameters is treated as prepared.
    pub parameters: Option<Vec<Value>>,
    /// Close the query after the first fetch.
    ///
    /// Only recorded on the query, the job is responsible for honoring it.
    pub auto_close: bool,
    /// Ask the server for the terse result encoding.
    pub is_terse_results: bool,
}

#[allow(clippy::return_self_not_must_use)]
impl QueryOptions {
    pub fn cl_command(mut self, is_cl_command: bool) -> Self {
        self.is_cl_command = is_cl_command;
        self
    }

    pub fn parameters(mut self, parameters: Vec<Value>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn auto_close(mut self, auto_close: bool) -> Self {
        self.auto_close = auto_close;
        self
    }

    pub fn terse_results(mut self, is_terse_results: bool) -> Self {
        self.is_terse_results = is_terse_results;
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_options() {
        let opts = QueryOptions::default();
        assert!(!opts.is_cl_command);
        assert!(opts.parameters.is_none());
        assert!(!opts.auto_close);
        assert!(!opts.is_terse_results);
    }

    #[test]
    fn test_builder_setters() {
        let opts = QueryOptions::default()
            .parameters(vec![json!(1), json!("a")])
            .auto_close(true)
            .terse_results(true);
        assert_eq!(Some(vec![json!(1), json!("a")]), opts.parameters);
        assert!(opts.auto_close);
        assert!(opts.is_terse_results);

        // An empty list still counts as present.
        let opts = QueryOptions::default().parameters(vec![]);
        assert_eq!(Some(vec![]), opts.parameters);
    }
}
