// ABOUTME: Per-connection gateway endpoint: decodes, classifies, and routes inbound frames
// ABOUTME: One instance per WebSocket connection; owns no state the session directory doesn't

//! Gateway Endpoint: `spec.md` §4.D.
//!
//! One [`GatewayEndpoint`] exists per connected client. It holds no state
//! beyond its own session id and references to the shared collaborators
//! (registry, directory, bus, shutdown broadcaster), membership lifetime
//! is owned entirely by the [`crate::session::SessionDirectory`], per the
//! "weak back-reference" model in `spec.md` §9.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::bus::BusHandle;
use crate::jsonrpc::{JsonRpcResponse, JSONRPC_VERSION};
use crate::registry::{Dispatch, MethodRegistry};
use crate::session::{ClientConnection, Session, SessionDirectory, SessionId};
use crate::shutdown::ShutdownBroadcaster;

/// A client frame after structural validation, retaining the original JSON
/// object (`raw`) so it can be forwarded to the bus unchanged.
struct DecodedRequest {
    jsonrpc: String,
    method: String,
    id: Option<Value>,
    raw: Value,
}

/// One WebSocket connection's view of the gateway.
pub struct GatewayEndpoint {
    id: SessionId,
    registry: Arc<MethodRegistry>,
    directory: Arc<SessionDirectory>,
    bus: Arc<dyn BusHandle>,
    shutdown: Arc<ShutdownBroadcaster>,
}

impl GatewayEndpoint {
    /// Build an endpoint for a connection that has not yet been opened.
    /// Call [`GatewayEndpoint::open`] before feeding it any frames.
    #[must_use]
    pub fn new(
        registry: Arc<MethodRegistry>,
        directory: Arc<SessionDirectory>,
        bus: Arc<dyn BusHandle>,
        shutdown: Arc<ShutdownBroadcaster>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            registry,
            directory,
            bus,
            shutdown,
        }
    }

    /// This endpoint's session id.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.id
    }

    /// Invoked when the transport accepts a new client. Inserts this
    /// endpoint's session into the directory and logs the session id
    /// (`spec.md` §4.D).
    pub fn open(&self, connection: Arc<dyn ClientConnection>) {
        info!(session = %self.id, "websocket client connected");
        self.directory.insert(Session::new(self.id, connection));
    }

    /// Invoked when the transport reports disconnect. Removes this
    /// endpoint's session; if the directory is now empty, triggers the
    /// Shutdown Broadcaster exactly once for this transition (`spec.md`
    /// §4.D, §4.F, invariant 7).
    pub async fn on_close(&self) {
        info!(session = %self.id, "websocket client disconnected");
        self.directory.remove(self.id);
        if self.directory.is_empty() {
            self.shutdown.broadcast(self.id).await;
        }
    }

    /// Handle one inbound WebSocket text frame. Delivers exactly one reply
    /// (or zero, for a notification) per invocation (`spec.md` §4.D).
    pub async fn on_text_frame(&self, frame: &str) {
        async {
            self.dispatch(frame).await;
        }
        .instrument(info_span!("frame", session = %self.id))
        .await;
    }

    async fn dispatch(&self, frame: &str) {
        // Step 1: decode as a JSON-RPC request. Any structural failure,
        // invalid JSON or `jsonrpc`/`method` missing, is a parse error.
        // The full decoded object is kept verbatim (`raw`) so unrecognized
        // top-level fields survive into the bus envelope unchanged
        // (`spec.md` §8 boundary behavior), rather than being dropped by a
        // strict struct deserialization.
        let request = match Self::decode(frame) {
            Ok(request) => request,
            Err(reason) => {
                debug!(reason = %reason, "parse error on inbound frame");
                self.reply(JsonRpcResponse::parse_error());
                return;
            }
        };

        // Step 2: version check.
        if request.jsonrpc != JSONRPC_VERSION {
            debug!(version = %request.jsonrpc, "invalid request: unsupported jsonrpc version");
            self.reply(JsonRpcResponse::invalid_request());
            return;
        }

        // Step 3: registry lookup. Presence (not truthiness) of `id` decides
        // request vs notification, see `SPEC_FULL.md` §4.D for why this
        // departs from the reference's truthiness check.
        let has_id = request.id.is_some();
        let Some(dispatch) = self.registry.lookup(&request.method) else {
            if has_id {
                warn!(method = %request.method, "method not found");
                self.reply(JsonRpcResponse::method_not_found(
                    request.id.unwrap_or(Value::Null),
                ));
            } else {
                debug!(method = %request.method, "unknown method as notification, dropping silently");
            }
            return;
        };

        match dispatch {
            // Step 4: local builtins take no arguments and produce no reply.
            Dispatch::Local(handler) => {
                info!(method = %request.method, "calling built-in method");
                handler();
            }
            // Step 5: forward to the bus; fire-and-forget.
            Dispatch::Remote(module) => {
                self.forward_to_bus(&module, &request.raw).await;
            }
        }
    }

    async fn forward_to_bus(&self, module: &str, raw_request: &Value) {
        let envelope = serde_json::json!([self.id.to_string(), raw_request]);
        let payload = match serde_json::to_vec(&envelope) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "failed to serialize outbound bus envelope");
                return;
            }
        };
        if let Err(e) = self.bus.send(module, payload).await {
            error!(module = %module, error = %e, "bus send failed");
        }
    }

    fn decode(frame: &str) -> Result<DecodedRequest, String> {
        let raw: Value = serde_json::from_str(frame).map_err(|e| e.to_string())?;
        let object = raw.as_object().ok_or("top-level frame is not a JSON object")?;

        let jsonrpc = object
            .get("jsonrpc")
            .and_then(Value::as_str)
            .ok_or("missing or non-string jsonrpc field")?
            .to_owned();
        let method = object
            .get("method")
            .and_then(Value::as_str)
            .ok_or("missing or non-string method field")?
            .to_owned();
        // `id` presence (not truthiness) distinguishes request from
        // notification; `object.get` already does a key-presence check.
        let id = object.get("id").cloned();

        Ok(DecodedRequest {
            jsonrpc,
            method,
            id,
            raw,
        })
    }

    fn reply(&self, response: JsonRpcResponse) {
        let text = match serde_json::to_string(&response) {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "failed to serialize local reply");
                return;
            }
        };
        if let Err(e) = self.directory.send_to(self.id, text) {
            error!(session = %self.id, error = %e, "failed to deliver local reply");
        }
    }
}
