//! JSON-RPC 2.0 frames exchanged with the daemon.
//!
//! Outgoing frames are always requests with a numeric id. Incoming frames are
//! either responses (carrying the id of a request) or notifications (carrying
//! a method name and no id).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RpcError;

/// JSON-RPC 2.0 request.
#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// Any frame the daemon may send; classified by [`Incoming::parse`].
#[derive(Debug, Deserialize)]
struct RawIncoming {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
}

/// A server-initiated message without an id.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub method: String,
    pub params: Value,
}

/// A classified incoming frame.
#[derive(Debug)]
pub(crate) enum Incoming {
    Response {
        id: u64,
        outcome: Result<Value, RpcError>,
    },
    Notification(Notification),
}

impl Incoming {
    /// Parses one text frame. Frames that are neither a response to a numeric
    /// id nor a notification are a protocol error.
    pub fn parse(text: &str) -> Result<Self, RpcError> {
        let raw: RawIncoming = serde_json::from_str(text)?;

        if let Some(id) = raw.id.filter(|v| !v.is_null()) {
            let id = id
                .as_u64()
                .or_else(|| id.as_str().and_then(|s| s.parse().ok()))
                .ok_or_else(|| RpcError::Protocol(format!("unexpected response id {id}")))?;
            let outcome = match (raw.error, raw.result) {
                (Some(err), _) => Err(RpcError::Server {
                    code: err.code,
                    message: err.message,
                }),
                (None, Some(result)) => Ok(result),
                (None, None) => Err(RpcError::Protocol(
                    "missing result in response".to_string(),
                )),
            };
            return Ok(Incoming::Response { id, outcome });
        }

        match raw.method {
            Some(method) => Ok(Incoming::Notification(Notification {
                method,
                params: raw.params.unwrap_or(Value::Null),
            })),
            None => Err(RpcError::Protocol(format!(
                "frame is neither response nor notification: {text}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serialization() {
        let req = JsonRpcRequest::new(7, "aria2.getVersion", json!([]));
        let text = serde_json::to_string(&req).unwrap();
        assert!(text.contains("\"jsonrpc\":\"2.0\""));
        assert!(text.contains("\"id\":7"));
        assert!(text.contains("\"method\":\"aria2.getVersion\""));
        assert!(text.contains("\"params\":[]"));
    }

    #[test]
    fn parse_result_response() {
        let frame = r#"{"jsonrpc":"2.0","id":3,"result":"2089b05ecca3d829"}"#;
        match Incoming::parse(frame).unwrap() {
            Incoming::Response { id, outcome } => {
                assert_eq!(id, 3);
                assert_eq!(outcome.unwrap(), json!("2089b05ecca3d829"));
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn parse_string_id() {
        let frame = r#"{"jsonrpc":"2.0","id":"12","result":"OK"}"#;
        match Incoming::parse(frame).unwrap() {
            Incoming::Response { id, .. } => assert_eq!(id, 12),
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn parse_error_response() {
        let frame =
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":1,"message":"Unauthorized"}}"#;
        match Incoming::parse(frame).unwrap() {
            Incoming::Response { id, outcome } => {
                assert_eq!(id, 1);
                match outcome {
                    Err(RpcError::Server { code, message }) => {
                        assert_eq!(code, 1);
                        assert_eq!(message, "Unauthorized");
                    }
                    other => panic!("expected server error, got {other:?}"),
                }
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn parse_response_without_result() {
        let frame = r#"{"jsonrpc":"2.0","id":4}"#;
        match Incoming::parse(frame).unwrap() {
            Incoming::Response { outcome, .. } => {
                assert!(matches!(outcome, Err(RpcError::Protocol(_))));
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn parse_notification() {
        let frame = r#"{"jsonrpc":"2.0","method":"aria2.onDownloadComplete","params":[{"gid":"abc"}]}"#;
        match Incoming::parse(frame).unwrap() {
            Incoming::Notification(n) => {
                assert_eq!(n.method, "aria2.onDownloadComplete");
                assert_eq!(n.params, json!([{"gid": "abc"}]));
            }
            other => panic!("expected notification, got {other:?}"),
        }
    }

    #[test]
    fn parse_garbage_is_error() {
        assert!(Incoming::parse("not json").is_err());
        assert!(matches!(
            Incoming::parse(r#"{"jsonrpc":"2.0"}"#),
            Err(RpcError::Protocol(_))
        ));
    }
}
