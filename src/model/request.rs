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

use serde::Serialize;
use serde_json::Value;

/// Request sent to the server, tagged by `type`.
///
/// The tag selects the execution path on the server side, the client never
/// looks at it again once the request is encoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryRequest {
    /// Run a CL command.
    Cl { id: String, terse: bool, cmd: String },
    /// Run sql with bind parameters.
    Sql(SqlRequest),
    /// Run sql without bind parameters.
    PrepareSqlExecute(SqlRequest),
    /// Fetch the next page of an open query.
    #[serde(rename = "sqlmore")]
    SqlMore {
        id: String,
        cont_id: String,
        rows: u32,
    },
    /// Close an open query before it is exhausted.
    #[serde(rename = "sqlclose")]
    SqlClose { id: String, cont_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlRequest {
    pub id: String,
    pub sql: String,
    pub terse: bool,
    pub rows: u32,
    /// Encoded as `null` when absent.
    pub parameters: Option<Vec<Value>>,
}

impl QueryRequest {
    pub fn id(&self) -> &str {
        match self {
            QueryRequest::Cl { id, .. }
            | QueryRequest::SqlMore { id, .. }
            | QueryRequest::SqlClose { id, .. } => id.as_str(),
            QueryRequest::Sql(req) | QueryRequest::PrepareSqlExecute(req) => req.id.as_str(),
        }
    }

    /// The `type` tag as written on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryRequest::Cl { .. } => "cl",
            QueryRequest::Sql(_) => "sql",
            QueryRequest::PrepareSqlExecute(_) => "prepare_sql_execute",
            QueryRequest::SqlMore { .. } => "sqlmore",
            QueryRequest::SqlClose { .. } => "sqlclose",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_encode_cl_request() {
        let req = QueryRequest::Cl {
            id: "clcommand1".to_string(),
            terse: false,
            cmd: "CRTLIB LIB(X)".to_string(),
        };
        assert_eq!(
            json!({"type": "cl", "id": "clcommand1", "terse": false, "cmd": "CRTLIB LIB(X)"}),
            serde_json::to_value(&req).unwrap()
        );
        assert_eq!("clcommand1", req.id());
    }

    #[test]
    fn test_encode_sql_requests() {
        let sql = SqlRequest {
            id: "query3".to_string(),
            sql: "select * from t where a = ?".to_string(),
            terse: true,
            rows: 10,
            parameters: Some(vec![json!(1)]),
        };
        assert_eq!(
            json!({
                "type": "sql",
                "id": "query3",
                "sql": "select * from t where a = ?",
                "terse": true,
                "rows": 10,
                "parameters": [1],
            }),
            serde_json::to_value(QueryRequest::Sql(sql.clone())).unwrap()
        );

        let prepared = QueryRequest::PrepareSqlExecute(SqlRequest {
            parameters: None,
            ..sql
        });
        let encoded = serde_json::to_value(&prepared).unwrap();
        assert_eq!(json!("prepare_sql_execute"), encoded["type"]);
        assert_eq!(Some(&Value::Null), encoded.get("parameters"));
        assert_eq!(prepared.kind(), encoded["type"]);
    }

    #[test]
    fn test_encode_continuation_requests() {
        let more = QueryRequest::SqlMore {
            id: "fetchMore4".to_string(),
            cont_id: "query3".to_string(),
            rows: 50,
        };
        assert_eq!(
            json!({"type": "sqlmore", "id": "fetchMore4", "cont_id": "query3", "rows": 50}),
            serde_json::to_value(&more).unwrap()
        );

        let close = QueryRequest::SqlClose {
            id: "sqlclose5".to_string(),
            cont_id: "query3".to_string(),
        };
        assert_eq!(
            json!({"type": "sqlclose", "id": "sqlclose5", "cont_id": "query3"}),
            serde_json::to_value(&close).unwrap()
        );
    }
}
