use thiserror::Error;

fn action_label(action_type: &str) -> String {
    if action_type.is_empty() {
        "an action".to_string()
    } else {
        format!("action \"{action_type}\"")
    }
}

/// Errors surfaced by the store and the reducer combinator.
///
/// The two `Shape*` variants are configuration errors: they are detected once
/// when [`combine_reducers`](crate::combine_reducers) probes its reducer map,
/// then re-surfaced on every invocation of the combined reducer. `Clone` exists
/// so that one stored assertion failure can be returned to every caller.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum Error {
    /// A slice reducer returned `None` for the initialization probe.
    #[error(
        "reducer \"{key}\" returned no state during initialization. When the \
         incoming state is `None`, the reducer must explicitly return its \
         initial state, and the initial state may not be `None`. If the \
         reducer should hold no value, return a `Value::Null` slice instead."
    )]
    ShapeNoInitialState {
        /// Key of the offending reducer in the combined map.
        key: String,
    },

    /// A slice reducer returned `None` when probed with a freshly minted
    /// unknown action type.
    #[error(
        "reducer \"{key}\" returned no state when probed with a random action \
         type. Actions in the \"statefold/\" namespace are private; for any \
         unknown action a reducer must return the current state, or its \
         initial state when the current state is `None`."
    )]
    ShapeHandlesReserved {
        /// Key of the offending reducer in the combined map.
        key: String,
    },

    /// A slice reducer returned `None` for a real dispatched action.
    #[error(
        "given {}, reducer \"{key}\" returned no state. To ignore an action, \
         explicitly return the previous state. If the reducer should hold no \
         value, return a `Value::Null` slice instead of `None`.",
        action_label(.action_type)
    )]
    SliceNoState {
        /// Key of the offending reducer in the combined map.
        key: String,
        /// Type of the action being reduced; empty when the action carried
        /// no type.
        action_type: String,
    },

    /// `dispatch` was called while the store's reducer was executing.
    #[error("dispatch called while the reducer is executing; reducers may not dispatch actions")]
    DispatchInReducer,
}
