//! Wire types of the HTTP surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC error code for unparseable or structurally invalid envelopes.
pub const PARSE_ERROR: i64 = -32700;
/// JSON-RPC error code for unknown methods.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC error code for parameters of the wrong shape.
pub const INVALID_PARAMS: i64 = -32602;
/// JSON-RPC error code for storage and other infrastructure faults.
pub const INTERNAL_ERROR: i64 = -32603;

/// Incoming call envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
    #[serde(default)]
    pub id: Value,
}

/// Error object of a failed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
}

/// Reply envelope. Exactly one of `result` and `error` is non-null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub id: Value,
    pub result: Value,
    pub error: Option<RpcErrorBody>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            id,
            result,
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            id,
            result: Value::Null,
            error: Some(RpcErrorBody {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
}

/// One runtime dependency health status.
#[derive(Debug, Serialize)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}
