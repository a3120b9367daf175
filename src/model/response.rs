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

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::ServerError;

/// Message used when a failed response carries no detail at all.
pub const UNKNOWN_FAILURE: &str = "failed to run query for unknown reason";

/// Decoded response envelope.
///
/// Only the fields driving the query state are typed, rows and column
/// metadata stay opaque in `extra`. The server is not strict about the types
/// of the flags and failure details, so `success`/`is_done` are read by
/// truthiness (null and missing are false) and the failure details are kept
/// as raw json. A null detail counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ResponseEnvelope {
    /// Correlation id echoed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub success: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub is_done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_state: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_rc: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResponseEnvelope {
    /// Get an opaque field, e.g. `data` or `metadata`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Join `error`, `sql_state` and `sql_rc` (in that order, skipping the
    /// absent ones) with ", ".
    pub fn failure_message(&self) -> String {
        let parts = [&self.error, &self.sql_state, &self.sql_rc]
            .into_iter()
            .flatten()
            .map(render)
            .collect::<Vec<_>>();

        if parts.is_empty() {
            UNKNOWN_FAILURE.to_string()
        } else {
            parts.join(", ")
        }
    }

    pub fn to_server_error(&self) -> ServerError {
        ServerError {
            message: self.failure_message(),
            sql_state: self.sql_state.as_ref().map(render),
            sql_rc: self.sql_rc.as_ref().and_then(|rc| match rc {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }),
        }
    }
}

/// Strings as is, anything else as json text.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let truthy = match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    };
    Ok(truthy)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_defaults() {
        let resp: ResponseEnvelope = serde_json::from_str(r#"{"id":"query1"}"#).unwrap();
        assert_eq!(Some("query1".to_string()), resp.id);
        assert!(!resp.success);
        assert!(!resp.is_done);
        assert!(resp.extra.is_empty());
    }

    #[test]
    fn test_opaque_fields_are_kept() {
        let resp: ResponseEnvelope = serde_json::from_value(json!({
            "id": "query1",
            "success": true,
            "is_done": true,
            "data": [{"A": 1}],
            "metadata": {"column_count": 1},
        }))
        .unwrap();
        assert_eq!(Some(&json!([{"A": 1}])), resp.field("data"));
        assert_eq!(Some(&json!({"column_count": 1})), resp.field("metadata"));
        assert_eq!(None, resp.field("success"));
    }

    #[test]
    fn test_failure_message() {
        let cases = vec![
            (json!({"sql_state": "42S02", "sql_rc": -204}), "42S02, -204"),
            (
                json!({"error": "not found", "sql_state": "42S02", "sql_rc": -204}),
                "not found, 42S02, -204",
            ),
            (json!({"error": "boom"}), "boom"),
            (json!({}), UNKNOWN_FAILURE),
        ];

        for (raw, expected) in cases {
            let resp: ResponseEnvelope = serde_json::from_value(raw).unwrap();
            assert_eq!(expected, resp.failure_message());
        }
    }

    #[test]
    fn test_to_server_error() {
        let resp: ResponseEnvelope =
            serde_json::from_value(json!({"success": false, "sql_rc": -7})).unwrap();
        let err = resp.to_server_error();
        assert_eq!("-7", err.message);
        assert_eq!(None, err.sql_state);
        assert_eq!(Some(-7), err.sql_rc);
    }

    #[test]
    fn test_lenient_flags() {
        let cases = vec![
            (json!({"success": true, "is_done": null}), true, false),
            (json!({"success": null, "is_done": true}), false, true),
            (json!({"success": 1, "is_done": 0}), true, false),
            (json!({"success": "", "is_done": "yes"}), false, true),
        ];

        for (raw, success, is_done) in cases {
            let resp: ResponseEnvelope = serde_json::from_value(raw).unwrap();
            assert_eq!(success, resp.success);
            assert_eq!(is_done, resp.is_done);
        }
    }

    #[test]
    fn test_failure_details_of_any_type() {
        let resp: ResponseEnvelope = serde_json::from_value(json!({
            "success": false,
            "error": null,
            "sql_state": "42S02",
            "sql_rc": "-204",
        }))
        .unwrap();
        assert_eq!("42S02, -204", resp.failure_message());
        let err = resp.to_server_error();
        assert_eq!(Some("42S02".to_string()), err.sql_state);
        assert_eq!(Some(-204), err.sql_rc);

        let resp: ResponseEnvelope = serde_json::from_value(json!({
            "error": {"code": 7},
            "sql_state": 42,
            "sql_rc": true,
        }))
        .unwrap();
        assert_eq!(r#"{"code":7}, 42, true"#, resp.failure_message());
        let err = resp.to_server_error();
        assert_eq!(Some("42".to_string()), err.sql_state);
        assert_eq!(None, err.sql_rc);
    }
}
