// ABOUTME: The handful of tunables the gateway core genuinely has
// ABOUTME: No CLI or config-file parsing lives here, that surface is explicitly out of scope

//! `SPEC_FULL.md` §12: ambient configuration.
//!
//! `spec.md` §1 excludes CLI/config-file parsing as a feature of the core,
//! and that remains true here, there is no `clap` command, no file format.
//! What's left is the small amount of runtime tuning the core's own
//! collaborators need: how large to make the inbound bus channel before a
//! slow demultiplexer applies backpressure to bus readers.

/// Runtime tunables for wiring a [`crate::bus::BusDemultiplexer`] to its
/// inbound channel.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Capacity of the mpsc channel feeding the [`crate::bus::BusDemultiplexer`],
    /// passed to [`crate::bus::BusDemultiplexer::channel`] to build that
    /// channel. `spec.md` places no backpressure requirement on the core
    /// beyond what the transport/bus naturally provide, so this is simply
    /// sized generously by default.
    pub inbound_channel_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            inbound_channel_capacity: 1024,
        }
    }
}
