// ABOUTME: Session directory tracking live WebSocket clients keyed by opaque session id
// ABOUTME: Backed by a concurrent map so inserts, removes, and lookups never block each other

//! Session Directory: `spec.md` §4.C, and the `Session` entry in §3.
//!
//! A `Session` exists in the directory for exactly as long as its
//! underlying connection is live (`spec.md` §3's invariant); it is inserted
//! in [`crate::gateway::GatewayEndpoint::open`] and removed in
//! [`crate::gateway::GatewayEndpoint::on_close`], never anywhere else, so
//! there is exactly one place where directory membership and connection
//! lifetime can drift, and that place is covered by the round-trip tests in
//! `tests/`.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::error::GatewayError;

/// An opaque, globally unique session id: a 128-bit random value rendered in
/// canonical 8-4-4-4-12 hex form (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh, random session id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a session id from its canonical textual form.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not a valid UUID.
    pub fn parse(text: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(text).map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The capability a session exposes to the rest of the gateway: pushing one
/// JSON text frame to the underlying client. Implemented by the transport
/// layer, which this crate does not provide (`spec.md` §1).
pub trait ClientConnection: Send + Sync {
    /// Push one JSON text frame to this client.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SendFailed`] if the underlying connection
    /// can no longer accept frames (e.g. it has already closed).
    fn send_text(&self, frame: String) -> Result<(), GatewayError>;
}

/// One live WebSocket client: its id and its send capability.
pub struct Session {
    id: SessionId,
    connection: Arc<dyn ClientConnection>,
}

impl Session {
    /// Pair a fresh session id with a connection.
    #[must_use]
    pub fn new(id: SessionId, connection: Arc<dyn ClientConnection>) -> Self {
        Self { id, connection }
    }

    /// This session's id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Push one JSON text frame to this session's client.
    ///
    /// # Errors
    ///
    /// See [`ClientConnection::send_text`].
    pub fn send(&self, frame: String) -> Result<(), GatewayError> {
        self.connection.send_text(frame)
    }
}

/// The set of currently live sessions, keyed by session id.
///
/// O(1) insert/remove/lookup via a concurrent map; O(n) iteration for the
/// Shutdown Broadcaster's "directory is now empty" check and for any future
/// broadcast. Insertion order is not preserved (`spec.md` §4.C).
#[derive(Default)]
pub struct SessionDirectory {
    sessions: DashMap<SessionId, Session>,
}

impl SessionDirectory {
    /// An empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Insert a session. Invariant 1 (`spec.md` §8) holds because
    /// [`SessionId`] is generated fresh per connection and a map key can
    /// only be bound once.
    pub fn insert(&self, session: Session) {
        self.sessions.insert(session.id(), session);
    }

    /// Remove a session by id, returning whether it was present.
    pub fn remove(&self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// True if no sessions are currently live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of currently live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Push `frame` to the session with the given id, if it is still live.
    /// Silently does nothing if the session has disappeared, this is the
    /// Bus Demultiplexer's "stale reply" path (`spec.md` §4.E, §7).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SendFailed`] if the session is live but the
    /// underlying write fails.
    pub fn send_to(&self, id: SessionId, frame: String) -> Result<(), GatewayError> {
        match self.sessions.get(&id) {
            Some(session) => session.send(frame),
            None => Ok(()),
        }
    }

    /// True if a session with this id is currently live.
    #[must_use]
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingConnection {
        frames: Mutex<Vec<String>>,
    }

    impl RecordingConnection {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                frames: Mutex::new(Vec::new()),
            })
        }
    }

    impl ClientConnection for RecordingConnection {
        fn send_text(&self, frame: String) -> Result<(), GatewayError> {
            self.frames.lock().unwrap().push(frame);
            Ok(())
        }
    }

    #[test]
    fn insert_then_lookup_delivers_frame() {
        let directory = SessionDirectory::new();
        let conn = RecordingConnection::new();
        let id = SessionId::new();
        directory.insert(Session::new(id, conn.clone()));

        directory.send_to(id, "hello".to_owned()).unwrap();

        assert_eq!(*conn.frames.lock().unwrap(), vec!["hello".to_owned()]);
    }

    #[test]
    fn send_to_unknown_session_is_silent_noop() {
        let directory = SessionDirectory::new();
        let result = directory.send_to(SessionId::new(), "hello".to_owned());
        assert!(result.is_ok());
    }

    #[test]
    fn remove_makes_directory_empty_and_lookups_silent() {
        let directory = SessionDirectory::new();
        let conn = RecordingConnection::new();
        let id = SessionId::new();
        directory.insert(Session::new(id, conn.clone()));
        assert!(!directory.is_empty());

        assert!(directory.remove(id));
        assert!(directory.is_empty());
        assert!(!directory.contains(id));

        directory.send_to(id, "late reply".to_owned()).unwrap();
        assert!(conn.frames.lock().unwrap().is_empty());
    }

    #[test]
    fn session_id_round_trips_through_text_form() {
        let id = SessionId::new();
        let parsed = SessionId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }
}
