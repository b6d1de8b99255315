//! Line-delimited JSON-RPC 2.0 framing: one request or response per line.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// One incoming line. A request without an `id` is a notification.
///
/// The `jsonrpc` member is not checked; hosts that omit it are served anyway.
#[derive(Debug, Default, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl Request {
    /// String parameter `name`, if present.
    pub fn str_param(&self, name: &str) -> Option<&str> {
        self.params.as_ref()?.get(name)?.as_str()
    }
}

#[derive(Debug, Serialize)]
pub struct Response {
    jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(ErrorObject {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Attach `data` to an error response. No effect on a success.
    pub fn with_data(mut self, data: Value) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.data = Some(data);
        }
        self
    }

    /// A line that is not valid JSON. The id is unknown, so it is `null`.
    pub fn parse_error(cause: &serde_json::Error) -> Self {
        Self::err(Value::Null, PARSE_ERROR, format!("parse error: {cause}"))
    }

    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self::err(id, METHOD_NOT_FOUND, format!("method not found: {method}"))
    }

    pub fn invalid_params(id: Value, message: impl Into<String>) -> Self {
        Self::err(id, INVALID_PARAMS, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_without_version_or_id() {
        let req: Request =
            serde_json::from_str(r#"{"method":"calculator/press","params":{"key":"7"}}"#).unwrap();
        assert!(req.id.is_none());
        assert_eq!(req.method, "calculator/press");
        assert_eq!(req.str_param("key"), Some("7"));
        assert_eq!(req.str_param("missing"), None);
    }

    #[test]
    fn test_error_response_shape() {
        let resp = Response::invalid_params(json!(3), "bad key").with_data(json!({ "token": "^" }));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 3);
        assert_eq!(value["error"]["code"], INVALID_PARAMS);
        assert_eq!(value["error"]["data"]["token"], "^");
        assert!(value.get("result").is_none());
    }

    #[test]
    fn test_success_ignores_data() {
        let resp = Response::ok(json!(1), json!({ "display": "0" })).with_data(json!(1));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["result"]["display"], "0");
        assert!(value.get("error").is_none());
    }
}
