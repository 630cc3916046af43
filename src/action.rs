use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix of the action-type namespace reserved for the store itself.
///
/// The store dispatches its own bookkeeping actions (initialization, contract
/// probes) under this prefix. Reducers must treat every action in this
/// namespace as unknown and return their current state unchanged; the reducer
/// combinator actively checks for violations at build time.
pub const RESERVED_TYPE_PREFIX: &str = "statefold/";

/// Action type dispatched exactly once when a store is constructed, so that
/// every reducer produces its initial state.
pub(crate) const INIT_TYPE: &str = "statefold/INIT";

const PROBE_TYPE_PREFIX: &str = "statefold/PROBE_UNKNOWN_ACTION_";

/// Returns `true` if the action type belongs to the store's private
/// namespace.
///
/// # Examples
///
/// ```
/// use statefold::is_reserved_type;
///
/// assert!(is_reserved_type("statefold/INIT"));
/// assert!(!is_reserved_type("todos/added"));
/// ```
pub fn is_reserved_type(action_type: &str) -> bool {
    action_type.starts_with(RESERVED_TYPE_PREFIX)
}

/// A dispatched description of "what happened."
///
/// Actions are identified by their `action_type` and carry an untyped
/// ([`serde_json::Value`]) payload — the store has no opinion about payload
/// shapes. Reducers give actions meaning. Actions flow through the middleware
/// chain by value and are read-only by convention; the store returns the
/// action from `dispatch` once the chain completes.
///
/// # Examples
///
/// ```
/// use statefold::Action;
/// use serde_json::json;
///
/// let action = Action::new("todos/added", json!({"text": "write docs"}));
/// assert_eq!(action.action_type, "todos/added");
/// assert_eq!(action.payload["text"], "write docs");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Action {
    /// The action type identifier (e.g. `"todos/added"`).
    ///
    /// Types starting with [`RESERVED_TYPE_PREFIX`] are private to the store.
    pub action_type: String,

    /// Arbitrary JSON payload. The store does not validate this — reducers
    /// and middleware interpret it however they need.
    pub payload: Value,
}

impl Action {
    /// Create a new action with the given type and payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use statefold::Action;
    /// use serde_json::{json, Value};
    ///
    /// let action = Action::new("counter/incremented", Value::Null);
    /// assert_eq!(action.action_type, "counter/incremented");
    ///
    /// let action = Action::new("todos/added", json!({"text": "ship it"}));
    /// assert_eq!(action.payload["text"], "ship it");
    /// ```
    pub fn new(action_type: &str, payload: Value) -> Self {
        Action {
            action_type: action_type.to_string(),
            payload,
        }
    }

    /// The initialization action fed to reducers when a store is built.
    pub(crate) fn init() -> Self {
        Action::new(INIT_TYPE, Value::Null)
    }

    /// A probe action with a freshly minted, unguessable type in the
    /// reserved namespace.
    ///
    /// Minted per call so a reducer cannot special-case the probe: the token
    /// is the xxh64 hash of the current clock reading mixed with a
    /// process-wide counter.
    pub(crate) fn probe_unknown() -> Self {
        static PROBE_SEED: AtomicU64 = AtomicU64::new(0);

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let seed = PROBE_SEED.fetch_add(1, Ordering::Relaxed);
        let token = xxhash_rust::xxh64::xxh64(&nanos.to_le_bytes(), seed);

        Action::new(&format!("{PROBE_TYPE_PREFIX}{token:016x}"), Value::Null)
    }
}
