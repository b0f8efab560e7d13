// ABOUTME: Emits one reset notification per registered *.reset method when the last client leaves
// ABOUTME: Triggered exactly once per directory transition from non-empty to empty

//! Shutdown Broadcaster: `spec.md` §4.F.
//!
//! "Last one out resets everything", when [`crate::gateway::GatewayEndpoint::on_close`]
//! observes the [`crate::session::SessionDirectory`] become empty, it calls
//! [`ShutdownBroadcaster::broadcast`] exactly once. Every registered method
//! ending in the literal suffix `reset` gets its own notification; modules
//! that expose more than one reset method get one notification per method,
//! not one per module (`spec.md` §4.F: "the core does not deduplicate by
//! module").

use tracing::{error, info};

use std::sync::Arc;

use crate::bus::BusHandle;
use crate::jsonrpc::NotificationEnvelope;
use crate::registry::MethodRegistry;
use crate::session::SessionId;

/// Fans a reset notification out to every module with a registered `*.reset`
/// method.
pub struct ShutdownBroadcaster {
    registry: Arc<MethodRegistry>,
    bus: Arc<dyn BusHandle>,
}

impl ShutdownBroadcaster {
    /// Build a broadcaster over `registry`, sending through `bus`.
    #[must_use]
    pub fn new(registry: Arc<MethodRegistry>, bus: Arc<dyn BusHandle>) -> Self {
        Self { registry, bus }
    }

    /// Send one `[module, JSON([sender_session_id, NotificationEnvelope(method)])]`
    /// message per registered reset method.
    ///
    /// `sender_session_id` is the id of the session that just disconnected;
    /// it will not match any live session by the time modules process it,
    /// and exists only because the bus envelope format requires a slot
    /// (`spec.md` §4.F). Workers are expected to accept reset notifications
    /// addressed to a defunct session (`spec.md` §9).
    pub async fn broadcast(&self, sender_session_id: SessionId) {
        let resets = self.registry.reset_methods();
        info!(count = resets.len(), "directory empty, broadcasting resets");

        for (method, module) in resets {
            let notification = NotificationEnvelope::new(method.clone());
            let envelope = serde_json::json!([sender_session_id.to_string(), notification]);
            let payload = match serde_json::to_vec(&envelope) {
                Ok(payload) => payload,
                Err(e) => {
                    error!(method = %method, error = %e, "failed to serialize reset notification");
                    continue;
                }
            };
            if let Err(e) = self.bus.send(&module, payload).await {
                error!(module = %module, method = %method, error = %e, "failed to send reset notification");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::registry::Dispatch;
    use serde_json::Value;
    use std::sync::Mutex;

    struct RecordingBus {
        sent: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl RecordingBus {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl BusHandle for RecordingBus {
        async fn send(&self, module: &str, payload: Vec<u8>) -> Result<(), GatewayError> {
            self.sent.lock().unwrap().push((module.to_owned(), payload));
            Ok(())
        }
    }

    #[tokio::test]
    async fn broadcasts_one_notification_per_reset_method_not_per_module() {
        let registry = Arc::new(MethodRegistry::new());
        registry
            .register("mod.reset", Dispatch::Remote("m1".to_owned()))
            .unwrap();
        registry
            .register("mod.other", Dispatch::Remote("m1".to_owned()))
            .unwrap();
        registry
            .register("n.reset", Dispatch::Remote("m2".to_owned()))
            .unwrap();
        let bus = RecordingBus::new();
        let broadcaster = ShutdownBroadcaster::new(registry, bus.clone());

        let sender = SessionId::new();
        broadcaster.broadcast(sender).await;

        let sent = bus.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);

        let mut modules: Vec<&str> = sent.iter().map(|(m, _)| m.as_str()).collect();
        modules.sort_unstable();
        assert_eq!(modules, vec!["m1", "m2"]);

        for (_, payload) in sent.iter() {
            let envelope: Value = serde_json::from_slice(payload).unwrap();
            assert_eq!(envelope[0], sender.to_string());
            assert!(envelope[1]["method"]
                .as_str()
                .unwrap()
                .ends_with("reset"));
            assert!(envelope[1].get("id").is_none());
        }
    }

    #[tokio::test]
    async fn no_reset_methods_sends_nothing() {
        let registry = Arc::new(MethodRegistry::new());
        registry
            .register("mod.create", Dispatch::Remote("m1".to_owned()))
            .unwrap();
        let bus = RecordingBus::new();
        let broadcaster = ShutdownBroadcaster::new(registry, bus.clone());

        broadcaster.broadcast(SessionId::new()).await;

        assert!(bus.sent.lock().unwrap().is_empty());
    }
}
