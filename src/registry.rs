// ABOUTME: Method registry partitioning dotted method names across registered modules
// ABOUTME: Enforces the one-method-one-module invariant and tags builtin vs bus dispatch

//! Method Registry: `spec.md` §4.B.
//!
//! Maps a dotted method name (e.g. `"frsw.create"`) to exactly one
//! [`Dispatch`] target, either a remote module address reachable over the
//! bus, or a zero-argument in-process handler for `builtin.*` methods.
//! Registration is expected to happen once, at module bring-up, before any
//! client connects; a second registration of the same method is treated as
//! a programmer error (`spec.md` §4.B), surfaced as a typed
//! [`GatewayError::DuplicateMethod`] rather than a panic so the caller can
//! log full context before aborting.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{GatewayError, GatewayResult};

/// The literal prefix that routes a method to an in-process handler instead
/// of the bus. Matched literally (not as a regex) per `spec.md` §8.
pub const BUILTIN_PREFIX: &str = "builtin";

/// The literal suffix identifying a module's reset method, used by the
/// Shutdown Broadcaster (`spec.md` §4.F).
pub const RESET_SUFFIX: &str = "reset";

/// A zero-argument, no-reply in-process handler for a `builtin.*` method.
pub type LocalHandler = Arc<dyn Fn() + Send + Sync>;

/// Where a registered method routes to.
#[derive(Clone)]
pub enum Dispatch {
    /// Route to a module over the bus, addressed by this string.
    Remote(String),
    /// Invoke this handler in-process; it takes no arguments and produces no reply.
    Local(LocalHandler),
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(module) => f.debug_tuple("Remote").field(module).finish(),
            Self::Local(_) => f.debug_tuple("Local").field(&"<handler>").finish(),
        }
    }
}

impl Dispatch {
    /// The module address this entry should appear under for the Shutdown
    /// Broadcaster's reset fan-out. `Local` entries have no bus address and
    /// are never reset-broadcast (`builtin` methods don't end in `reset` in
    /// the reference behavior, but this keeps the contract explicit).
    fn module_address(&self) -> Option<&str> {
        match self {
            Self::Remote(module) => Some(module.as_str()),
            Self::Local(_) => None,
        }
    }
}

/// The method → module-or-handler registry.
///
/// Backed by a concurrent map so lookups from many gateway endpoints never
/// block each other; `spec.md` §5 allows this as an alternative to a single
/// global lock as long as the registry is effectively read-only after
/// startup, which it is in the reference behavior.
#[derive(Default)]
pub struct MethodRegistry {
    bindings: DashMap<String, Dispatch>,
}

impl MethodRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: DashMap::new(),
        }
    }

    /// Register `method` as routing to `dispatch`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DuplicateMethod`] if `method` is already
    /// bound. Callers should treat this as fatal at startup (`spec.md`
    /// §4.B), it indicates two modules configured to serve the same
    /// method name.
    pub fn register(&self, method: impl Into<String>, dispatch: Dispatch) -> GatewayResult<()> {
        let method = method.into();
        match self.bindings.entry(method.clone()) {
            dashmap::mapref::entry::Entry::Occupied(existing) => {
                let existing_module = match existing.get() {
                    Dispatch::Remote(module) => module.clone(),
                    Dispatch::Local(_) => "<local>".to_owned(),
                };
                Err(GatewayError::DuplicateMethod {
                    method,
                    existing: existing_module,
                })
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(dispatch);
                Ok(())
            }
        }
    }

    /// Look up the dispatch target for `method`. Pure, no side effects.
    #[must_use]
    pub fn lookup(&self, method: &str) -> Option<Dispatch> {
        self.bindings.get(method).map(|entry| entry.value().clone())
    }

    /// True if `method` begins with the literal `builtin` prefix.
    #[must_use]
    pub fn is_builtin(method: &str) -> bool {
        method.starts_with(BUILTIN_PREFIX)
    }

    /// All `(method, module)` bindings whose method ends in the literal
    /// suffix `reset`. Used solely by the Shutdown Broadcaster; `Local`
    /// bindings are excluded because they have no module address to notify.
    #[must_use]
    pub fn reset_methods(&self) -> Vec<(String, String)> {
        self.bindings
            .iter()
            .filter(|entry| entry.key().ends_with(RESET_SUFFIX))
            .filter_map(|entry| {
                entry
                    .value()
                    .module_address()
                    .map(|module| (entry.key().clone(), module.to_owned()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_lookup_returns_bound_module() {
        let registry = MethodRegistry::new();
        registry
            .register("frsw.create", Dispatch::Remote("dynamips".to_owned()))
            .unwrap();

        match registry.lookup("frsw.create") {
            Some(Dispatch::Remote(module)) => assert_eq!(module, "dynamips"),
            other => panic!("expected Remote(dynamips), got {other:?}"),
        }
    }

    #[test]
    fn lookup_of_unregistered_method_is_none() {
        let registry = MethodRegistry::new();
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn duplicate_registration_fails_loudly() {
        let registry = MethodRegistry::new();
        registry
            .register("frsw.create", Dispatch::Remote("dynamips".to_owned()))
            .unwrap();

        let err = registry
            .register("frsw.create", Dispatch::Remote("other".to_owned()))
            .unwrap_err();

        match err {
            GatewayError::DuplicateMethod { method, existing } => {
                assert_eq!(method, "frsw.create");
                assert_eq!(existing, "dynamips");
            }
            other => panic!("expected DuplicateMethod, got {other:?}"),
        }
    }

    #[test]
    fn reset_methods_returns_only_reset_suffixed_remote_bindings() {
        let registry = MethodRegistry::new();
        registry
            .register("mod.reset", Dispatch::Remote("m1".to_owned()))
            .unwrap();
        registry
            .register("mod.other", Dispatch::Remote("m1".to_owned()))
            .unwrap();
        registry
            .register("n.reset", Dispatch::Remote("m2".to_owned()))
            .unwrap();

        let mut resets = registry.reset_methods();
        resets.sort();

        assert_eq!(
            resets,
            vec![
                ("mod.reset".to_owned(), "m1".to_owned()),
                ("n.reset".to_owned(), "m2".to_owned()),
            ]
        );
    }

    #[test]
    fn builtin_prefix_is_literal_not_regex() {
        assert!(MethodRegistry::is_builtin("builtin"));
        assert!(MethodRegistry::is_builtin("builtin.ping"));
        assert!(!MethodRegistry::is_builtin("notbuiltin.ping"));
    }

    #[test]
    fn local_dispatch_is_invoked_with_no_reply() {
        let registry = MethodRegistry::new();
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let calls_clone = calls.clone();
        registry
            .register(
                "builtin.ping",
                Dispatch::Local(Arc::new(move || {
                    calls_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                })),
            )
            .unwrap();

        match registry.lookup("builtin.ping") {
            Some(Dispatch::Local(handler)) => handler(),
            other => panic!("expected Local, got {other:?}"),
        }
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
