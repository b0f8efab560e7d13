// ABOUTME: Internal error taxonomy for the gateway core, distinct from wire-level JSON-RPC errors
// ABOUTME: Never serialized to clients; for embedding binaries and tests to match/log/propagate

//! Internal error type for fallible gateway operations.
//!
//! [`crate::jsonrpc::JsonRpcError`] is what a client sees on the wire;
//! [`GatewayError`] is what the crate's own API returns when an operation
//! fails for reasons a client should never observe directly (a startup
//! configuration bug, a dead client's send failing, the bus rejecting a
//! send). See `SPEC_FULL.md` §11 for why these two are kept separate rather
//! than one converting automatically into the other.

use thiserror::Error;

/// Errors produced by the gateway's own API surface.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Two registrations claimed the same method. Fatal at startup, see
    /// `spec.md` §4.B: "fails (fatal, not recoverable)".
    #[error("method {method:?} is already bound to module {existing:?}")]
    DuplicateMethod {
        /// The method string that was registered twice.
        method: String,
        /// The module the method was already bound to.
        existing: String,
    },

    /// The bus rejected an outbound send (module address unreachable, bus
    /// handle closed, etc). The gateway endpoint that hit this should log it
    /// and move on, a request that can't be routed gets no asynchronous
    /// reply, which looks the same to the client as a worker that never
    /// answers.
    #[error("failed to send to module {module:?} on the bus: {reason}")]
    BusSendFailed {
        /// The module address the send was addressed to.
        module: String,
        /// Underlying transport-reported reason.
        reason: String,
    },

    /// Writing a reply to a client's connection failed (socket already
    /// closed, write buffer full and rejected, etc).
    #[error("failed to send to session {session}: {reason}")]
    SendFailed {
        /// The session the write was addressed to.
        session: String,
        /// Underlying transport-reported reason.
        reason: String,
    },
}

/// Result alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
