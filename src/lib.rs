// ABOUTME: Session-aware JSON-RPC 2.0 gateway library entry point
// ABOUTME: Wires the wire protocol, registry, session directory, bus, and shutdown modules together
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![deny(unsafe_code)]

//! # RPC Gateway
//!
//! A session-aware JSON-RPC 2.0 gateway that bridges WebSocket clients to
//! bus-addressed worker modules. One [`gateway::GatewayEndpoint`] is created
//! per connection; it decodes inbound frames, looks methods up in a shared
//! [`registry::MethodRegistry`], and either answers locally (`builtin.*`) or
//! forwards to a module over an abstract [`bus::BusHandle`]. Replies come
//! back through a [`bus::BusDemultiplexer`] that looks the originating
//! session up in a shared [`session::SessionDirectory`] and discards replies
//! for sessions that have since disconnected.
//!
//! ## Architecture
//!
//! - **`jsonrpc`**: wire types and the canonical error/notification envelopes.
//! - **`registry`**: method name → module-or-local-handler bindings.
//! - **`session`**: the directory of currently connected clients.
//! - **`bus`**: the bus-facing trait and the inbound demultiplexer.
//! - **`gateway`**: per-connection decode/dispatch/reply.
//! - **`shutdown`**: last-client-gone reset fan-out.
//! - **`error`**: the crate's own internal error taxonomy.
//! - **`config`**: the small set of runtime tunables the core has.
//! - **`logging`**: `tracing` subscriber setup for binaries embedding this crate.
//!
//! This crate does not provide a WebSocket server, a bus transport, or a
//! process supervisor; it expects a thin binary to supply those and wire
//! them to the traits above.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rpc_gateway::bus::BusHandle;
//! use rpc_gateway::error::GatewayError;
//! use rpc_gateway::gateway::GatewayEndpoint;
//! use rpc_gateway::registry::{Dispatch, MethodRegistry};
//! use rpc_gateway::session::SessionDirectory;
//! use rpc_gateway::shutdown::ShutdownBroadcaster;
//!
//! struct NoopBus;
//!
//! #[async_trait::async_trait]
//! impl BusHandle for NoopBus {
//!     async fn send(&self, _module: &str, _payload: Vec<u8>) -> Result<(), GatewayError> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn run() {
//! let registry = Arc::new(MethodRegistry::new());
//! registry
//!     .register("frsw.create", Dispatch::Remote("dynamips".to_owned()))
//!     .expect("startup registration");
//!
//! let directory = Arc::new(SessionDirectory::new());
//! let bus: Arc<dyn BusHandle> = Arc::new(NoopBus);
//! let shutdown = Arc::new(ShutdownBroadcaster::new(registry.clone(), bus.clone()));
//!
//! let endpoint = GatewayEndpoint::new(registry, directory, bus, shutdown);
//! # let _ = endpoint;
//! # }
//! ```

/// Abstract message bus handle and the inbound frame demultiplexer.
pub mod bus;

/// Runtime tunables for wiring a [`bus::BusDemultiplexer`] to its channel.
pub mod config;

/// The gateway's own internal error taxonomy, distinct from wire errors.
pub mod error;

/// Per-connection decode, dispatch, and reply logic.
pub mod gateway;

/// JSON-RPC 2.0 wire types and canonical error/notification envelopes.
pub mod jsonrpc;

/// Structured logging setup for binaries embedding this crate.
pub mod logging;

/// Method name to module-or-handler bindings.
pub mod registry;

/// The directory of currently connected client sessions.
pub mod session;

/// Last-client-gone reset notification fan-out.
pub mod shutdown;

/// In-memory fakes for `ClientConnection` and `BusHandle`, for crates that
/// embed this gateway and want to exercise it without a real transport.
#[cfg(any(test, feature = "testing"))]
pub mod testing;
