// ABOUTME: In-memory ClientConnection and BusHandle fakes shared across inline and tests/ suites
// ABOUTME: Gated behind cfg(test) or the testing feature; never compiled into production builds

//! `SPEC_FULL.md` §13: shared test fixtures.
//!
//! Mirrors the corpus's `tests/common.rs` pattern of one fixture module that
//! both inline `#[cfg(test)]` blocks and the `tests/` integration suite pull
//! from, instead of each test file hand-rolling its own recording fakes.

use std::sync::Mutex;

use crate::bus::BusHandle;
use crate::error::GatewayError;
use crate::session::ClientConnection;

/// A [`ClientConnection`] that records every frame sent to it instead of
/// writing to a real socket.
#[derive(Default)]
pub struct RecordingConnection {
    frames: Mutex<Vec<String>>,
}

impl RecordingConnection {
    /// A connection with no frames recorded yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every frame sent to this connection, in send order.
    #[must_use]
    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().unwrap().clone()
    }

    /// True if no frames have been sent yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.lock().unwrap().is_empty()
    }
}

impl ClientConnection for RecordingConnection {
    fn send_text(&self, frame: String) -> Result<(), GatewayError> {
        self.frames.lock().unwrap().push(frame);
        Ok(())
    }
}

/// A [`BusHandle`] that records every `(module, payload)` send instead of
/// addressing a real bus.
#[derive(Default)]
pub struct RecordingBus {
    sent: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingBus {
    /// A bus with no sends recorded yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(module, payload)` pair sent, in send order.
    #[must_use]
    pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
        self.sent.lock().unwrap().clone()
    }

    /// True if nothing has been sent yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sent.lock().unwrap().is_empty()
    }
}

#[async_trait::async_trait]
impl BusHandle for RecordingBus {
    async fn send(&self, module: &str, payload: Vec<u8>) -> Result<(), GatewayError> {
        self.sent.lock().unwrap().push((module.to_owned(), payload));
        Ok(())
    }
}
