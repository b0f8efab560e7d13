// ABOUTME: Abstract message bus handle and the single process-wide inbound demultiplexer
// ABOUTME: Outbound sends are fire-and-forget; inbound frames are decoded and routed by session id

//! Bus-facing half of the gateway: `spec.md` §4.E and the bus envelope
//! shapes in §3/§6.
//!
//! The bus itself (ZeroMQ ROUTER/DEALER in the reference) is out of scope
//! (`spec.md` §1); this module only defines the envelope and the
//! [`BusHandle`] trait an adapter crate implements, plus the
//! [`BusDemultiplexer`] that turns inbound two-frame messages into
//! deliveries against the [`crate::session::SessionDirectory`].

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info_span, Instrument};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::session::{SessionDirectory, SessionId};
use std::sync::Arc;

/// Capability to send a two-frame message `[module-address, payload]` on
/// the bus. Fire-and-forget: the gateway endpoint does not await a
/// confirmation before returning control to the transport (`spec.md` §4.D).
#[async_trait::async_trait]
pub trait BusHandle: Send + Sync {
    /// Send `payload` addressed to `module`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BusSendFailed`] if the bus rejects the send
    /// (unreachable module, closed handle, etc).
    async fn send(&self, module: &str, payload: Vec<u8>) -> Result<(), GatewayError>;
}

/// One inbound frame from the bus: the module address that sent it, and the
/// raw JSON payload `[session_id, response]` (`spec.md` §3, §6).
#[derive(Debug, Clone)]
pub struct InboundFrame {
    /// The module address the frame arrived from, used only for logging.
    pub module: String,
    /// Raw JSON bytes of `[session_id, response]`.
    pub payload: Vec<u8>,
}

/// The single process-wide consumer of inbound bus frames (`spec.md` §4.E).
///
/// Owns the receiving end of an mpsc channel that an adapter crate feeds
/// with [`InboundFrame`]s as they arrive off the bus. There is exactly one
/// demultiplexer per gateway; running more than one would break the
/// single-consumer invariant the reference behavior relies on.
pub struct BusDemultiplexer {
    directory: Arc<SessionDirectory>,
}

impl BusDemultiplexer {
    /// Build a demultiplexer that delivers decoded replies into `directory`.
    #[must_use]
    pub fn new(directory: Arc<SessionDirectory>) -> Self {
        Self { directory }
    }

    /// Build the inbound channel a [`BusDemultiplexer::run`] loop consumes,
    /// sized per `config.inbound_channel_capacity`. The returned sender is
    /// what an adapter crate feeds with [`InboundFrame`]s as they arrive off
    /// the bus; the receiver is handed to `run`.
    #[must_use]
    pub fn channel(config: &GatewayConfig) -> (mpsc::Sender<InboundFrame>, mpsc::Receiver<InboundFrame>) {
        mpsc::channel(config.inbound_channel_capacity)
    }

    /// Run the receive loop until `inbound` is closed.
    ///
    /// Each frame is processed independently: a malformed frame is logged
    /// and discarded (never crashes the loop); a frame for a session that
    /// has since disconnected is silently discarded (`spec.md` §4.E, §7).
    pub async fn run(&self, mut inbound: mpsc::Receiver<InboundFrame>) {
        while let Some(frame) = inbound.recv().await {
            self.process(frame).await;
        }
    }

    /// Process exactly one inbound frame. Exposed separately from [`run`]
    /// so tests can drive single frames without spinning up a channel loop.
    pub async fn process(&self, frame: InboundFrame) {
        let module = frame.module.clone();
        async {
            match Self::decode(&frame.payload) {
                Ok((session_id, response)) => {
                    self.deliver(session_id, response);
                }
                Err(decode_err) => {
                    error!(
                        module = %module,
                        error = %decode_err,
                        "could not decode inbound bus frame"
                    );
                }
            }
        }
        .instrument(info_span!("bus_frame", module = %module))
        .await;
    }

    fn decode(payload: &[u8]) -> Result<(SessionId, Value), String> {
        let decoded: Value =
            serde_json::from_slice(payload).map_err(|e| format!("invalid JSON: {e}"))?;
        let pair = decoded
            .as_array()
            .filter(|arr| arr.len() == 2)
            .ok_or_else(|| "expected a 2-element array [session_id, response]".to_owned())?;

        let session_id_str = pair[0]
            .as_str()
            .ok_or_else(|| "session id element is not a string".to_owned())?;
        let session_id =
            SessionId::parse(session_id_str).map_err(|e| format!("invalid session id: {e}"))?;

        Ok((session_id, pair[1].clone()))
    }

    fn deliver(&self, session_id: SessionId, response: Value) {
        if !self.directory.contains(session_id) {
            debug!(session = %session_id, "discarding reply for session that has disconnected");
            return;
        }
        let text = match serde_json::to_string(&response) {
            Ok(text) => text,
            Err(e) => {
                error!(session = %session_id, error = %e, "failed to re-serialize response");
                return;
            }
        };
        if let Err(e) = self.directory.send_to(session_id, text) {
            error!(session = %session_id, error = %e, "failed to deliver reply to session");
        }
    }
}
