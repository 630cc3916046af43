#![allow(dead_code)]

use serde_json::{json, Value};
use statefold::{Action, Slice, SliceReducer};
use std::collections::BTreeMap;
use std::rc::Rc;

pub fn action(action_type: &str) -> Action {
    Action::new(action_type, Value::Null)
}

pub fn reducer_map(entries: &[(&str, SliceReducer)]) -> BTreeMap<String, SliceReducer> {
    entries
        .iter()
        .map(|(key, reducer)| (key.to_string(), *reducer))
        .collect()
}

pub fn counter_reducer(state: Option<Slice>, action: &Action) -> Option<Slice> {
    let state = state.unwrap_or_else(|| Rc::new(json!(0)));
    match action.action_type.as_str() {
        "counter/incremented" => Some(Rc::new(json!(state.as_i64().unwrap_or(0) + 1))),
        "counter/reset" => Some(Rc::new(json!(0))),
        _ => Some(state),
    }
}

pub fn todo_reducer(state: Option<Slice>, action: &Action) -> Option<Slice> {
    let state = state.unwrap_or_else(|| Rc::new(json!([])));
    match action.action_type.as_str() {
        "todos/added" => {
            let mut items = state.as_array().cloned().unwrap_or_default();
            items.push(action.payload["text"].clone());
            Some(Rc::new(Value::Array(items)))
        }
        _ => Some(state),
    }
}

// Violates the contract: hands back whatever it was given, so the
// initialization probe sees no state.
pub fn no_initial_state_reducer(state: Option<Slice>, _action: &Action) -> Option<Slice> {
    state
}

// Violates the contract: special-cases the store's private init action and
// refuses every other action it does not recognize.
pub fn reserved_peeking_reducer(state: Option<Slice>, action: &Action) -> Option<Slice> {
    match action.action_type.as_str() {
        "statefold/INIT" => Some(state.unwrap_or_else(|| Rc::new(json!(0)))),
        _ => state,
    }
}

// Well-formed at build time, but returns no state for one real action (and
// for the typeless action).
pub fn volatile_reducer(state: Option<Slice>, action: &Action) -> Option<Slice> {
    if action.action_type == "volatile/vanish" || action.action_type.is_empty() {
        return None;
    }
    Some(state.unwrap_or_else(|| Rc::new(json!("ok"))))
}
