//! JSON-RPC 2.0 message envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    core::error::LinkError,
    protocol::{notification::Notification, request::Request, response::Response},
};

/// JSON-RPC 2.0 request wrapper
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(flatten)]
    pub request: Request,
    pub id: RequestId,
}

/// JSON-RPC 2.0 response wrapper
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: RequestId,
}

/// JSON-RPC 2.0 notification wrapper
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    #[serde(flatten)]
    pub notification: Notification,
}

/// Request ID (number or string)
///
/// `Null` only appears in error responses to requests whose id could not be
/// read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
    Null,
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Standard JSON-RPC error codes
impl JsonRpcError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Custom error codes
    pub const BUSY: i32 = -32001;
    pub const NOT_STARTED: i32 = -32002;
    pub const BACKEND_ERROR: i32 = -32003;
    pub const TIMEOUT: i32 = -32004;
    pub const PERSISTENCE_ERROR: i32 = -32005;

    fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error() -> Self {
        Self::with_code(Self::PARSE_ERROR, "Parse error")
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_code(Self::INVALID_REQUEST, message)
    }

    pub fn method_not_found() -> Self {
        Self::with_code(Self::METHOD_NOT_FOUND, "Method not found")
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::with_code(Self::INVALID_PARAMS, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_code(Self::INTERNAL_ERROR, message)
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self::with_code(Self::BUSY, message)
    }

    pub fn not_started() -> Self {
        Self::with_code(Self::NOT_STARTED, "HaLow not started")
    }

    pub fn backend_error(message: impl Into<String>) -> Self {
        Self::with_code(Self::BACKEND_ERROR, message)
    }

    pub fn timeout() -> Self {
        Self::with_code(Self::TIMEOUT, "Operation timed out")
    }

    pub fn persistence_error(message: impl Into<String>) -> Self {
        Self::with_code(Self::PERSISTENCE_ERROR, message)
    }
}

impl From<&LinkError> for JsonRpcError {
    fn from(error: &LinkError) -> Self {
        match error {
            e if e.is_validation() => Self::invalid_params(e.to_string()),
            LinkError::Busy => Self::busy(error.to_string()),
            LinkError::NotStarted => Self::not_started(),
            LinkError::Persistence(e) => Self::persistence_error(e.to_string()),
            e => Self::backend_error(e.to_string()),
        }
    }
}

impl JsonRpcRequest {
    pub fn new(request: Request, id: RequestId) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            request,
            id,
        }
    }
}

impl JsonRpcResponse {
    pub fn success(result: Response, id: RequestId) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(error: JsonRpcError, id: RequestId) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

impl JsonRpcNotification {
    pub fn new(notification: Notification) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            notification,
        }
    }
}
