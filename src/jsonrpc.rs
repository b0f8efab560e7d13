// ABOUTME: JSON-RPC 2.0 wire types and canonical error/notification envelope construction
// ABOUTME: Shared by the gateway endpoint, the bus demultiplexer, and the shutdown broadcaster

//! JSON-RPC 2.0 foundation types.
//!
//! This module owns the wire shapes the gateway speaks to clients and the
//! bus, plus the four canonical error envelopes the core itself emits
//! (parse error, invalid request, method not found, custom). It does not
//! know about sessions, modules, or dispatch, those live in
//! [`crate::registry`], [`crate::session`], and [`crate::gateway`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 version string; the only version this gateway accepts.
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes, plus the gateway's own custom range.
pub mod error_codes {
    /// Request body could not be parsed as JSON, or required fields were missing.
    pub const PARSE_ERROR: i32 = -32700;
    /// `jsonrpc` field was present but not exactly `"2.0"`.
    pub const INVALID_REQUEST: i32 = -32600;
    /// `method` is not registered.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Default code for a module-signaled domain failure, when the module
    /// does not choose its own. Modules are free to use any code instead.
    pub const CUSTOM_DEFAULT: i32 = -32001;
}

/// A request as decoded off the wire from a client.
///
/// `id`'s absence (no `id` key at all) means this is a notification; a
/// present `id`, even `Value::Null`, means the client expects a reply. See
/// `SPEC_FULL.md` §4.D for why this crate departs from the reference's
/// truthiness check on `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Must equal [`JSONRPC_VERSION`] or the request is rejected.
    pub jsonrpc: String,
    /// Dotted method name used as the registry lookup key.
    pub method: String,
    /// Opaque parameters; the core never inspects these.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Presence (not truthiness) of this field decides request vs notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

/// A JSON-RPC 2.0 response or error, as forwarded to a client verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always [`JSONRPC_VERSION`].
    pub jsonrpc: String,
    /// Present on success; mutually exclusive with `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Present on failure; mutually exclusive with `result`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Echoes the request's `id`. `null` for errors that predate id extraction
    /// (parse errors, invalid-version errors).
    pub id: Value,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// One of [`error_codes`], or a module-chosen code for custom errors.
    pub code: i32,
    /// Human-readable message. Tests should treat this as the observable
    /// part of a custom error; the code is module-defined.
    pub message: String,
    /// Optional structured detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Canonical parse-error envelope: bad JSON, or `jsonrpc`/`method` missing.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::error_envelope(Value::Null, error_codes::PARSE_ERROR, "Parse error")
    }

    /// Canonical invalid-request envelope: `jsonrpc` present but not `"2.0"`.
    #[must_use]
    pub fn invalid_request() -> Self {
        Self::error_envelope(Value::Null, error_codes::INVALID_REQUEST, "Invalid Request")
    }

    /// Canonical method-not-found envelope, echoing the request's id.
    #[must_use]
    pub fn method_not_found(id: Value) -> Self {
        Self::error_envelope(id, error_codes::METHOD_NOT_FOUND, "Method not found")
    }

    /// A module-signaled domain failure, echoing the request's id.
    #[must_use]
    pub fn custom(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self::error_envelope(id, code, message)
    }

    fn error_envelope(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }

    /// A successful response carrying `result`, echoing the request's id.
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            result: Some(result),
            error: None,
            id,
        }
    }
}

/// A JSON-RPC 2.0 notification: no `id`, so no reply is expected.
///
/// Used only by the Shutdown Broadcaster to emit `*.reset` notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    /// Always [`JSONRPC_VERSION`].
    pub jsonrpc: String,
    /// The reset method name, e.g. `"frsw.reset"`.
    pub method: String,
    /// Optional notification payload; unused by the Shutdown Broadcaster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl NotificationEnvelope {
    /// A bare notification with no params, as emitted on the reset broadcast.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.into(),
            params: None,
        }
    }
}
