use crate::action::{Action, INIT_TYPE};
use crate::error::Error;
use crate::store::Reducer;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// One named sub-state of a combined store.
///
/// Slices are shared, never mutated in place: a reducer that ignores an
/// action hands back the `Rc` it was given, and that pointer identity is what
/// the combined reducer uses to detect change.
pub type Slice = Rc<Value>;

/// The state produced by a combined reducer: a keyed map from reducer name to
/// that reducer's private slice.
///
/// The whole map is shared the same way its slices are. When no slice changes
/// during a dispatch, the combined reducer returns the incoming `Rc`
/// unchanged, so observers can detect "nothing happened" with
/// [`Rc::ptr_eq`].
pub type SliceMap = Rc<BTreeMap<String, Slice>>;

/// A pure function that folds an action into one state slice.
///
/// The incoming state is `None` only before the slice has been initialized;
/// the reducer must then return its initial state. For any action it does not
/// recognize — including every action in the store's private
/// `statefold/` namespace — it must return the incoming state unchanged.
/// Returning `None` for any action is a contract violation that
/// [`combine_reducers`] turns into an [`Error`].
///
/// # Examples
///
/// ```
/// use statefold::{Action, Slice, SliceReducer};
/// use serde_json::json;
/// use std::rc::Rc;
///
/// fn counter(state: Option<Slice>, action: &Action) -> Option<Slice> {
///     let state = state.unwrap_or_else(|| Rc::new(json!(0)));
///     match action.action_type.as_str() {
///         "counter/incremented" => Some(Rc::new(json!(state.as_i64().unwrap_or(0) + 1))),
///         _ => Some(state),
///     }
/// }
///
/// let reducer: SliceReducer = counter;
/// ```
pub type SliceReducer = fn(Option<Slice>, &Action) -> Option<Slice>;

/// Merge a map of named slice reducers into a single reducer over a keyed
/// state map.
///
/// Each slice reducer exclusively owns the slice stored under its key. The
/// combined reducer invokes every slice reducer for every action, in the
/// map's stable key order, and assembles the results into the next
/// [`SliceMap`]. If no slice changed (by `Rc` pointer identity), the incoming
/// map is returned unchanged.
///
/// The map is validated when `combine_reducers` is called: every reducer is
/// probed once with the initialization action and once with a freshly minted
/// unknown action type, and must produce a state for both. A failed probe
/// does not fail the build — the error is captured and returned from the
/// first and every subsequent invocation of the combined reducer, so
/// `combine_reducers` itself can run unconditionally at startup without
/// crashing code paths that never dispatch through it.
///
/// In debug builds, the combined reducer warns through the [`log`] facade
/// when the incoming state carries keys no reducer claims (once per distinct
/// key) or when the reducer map is empty. Warnings never affect the returned
/// state.
///
/// # Examples
///
/// ```
/// use statefold::{combine_reducers, Action, Slice, SliceReducer};
/// use serde_json::{json, Value};
/// use std::collections::BTreeMap;
/// use std::rc::Rc;
///
/// fn counter(state: Option<Slice>, action: &Action) -> Option<Slice> {
///     let state = state.unwrap_or_else(|| Rc::new(json!(0)));
///     match action.action_type.as_str() {
///         "counter/incremented" => Some(Rc::new(json!(state.as_i64().unwrap_or(0) + 1))),
///         _ => Some(state),
///     }
/// }
///
/// let mut reducers: BTreeMap<String, SliceReducer> = BTreeMap::new();
/// reducers.insert("counter".to_string(), counter);
/// let combined = combine_reducers(reducers);
///
/// let state = combined(None, &Action::new("counter/incremented", Value::Null)).unwrap();
/// assert_eq!(*state["counter"], json!(1));
///
/// // Unknown actions leave the map untouched, same `Rc` out as in.
/// let next = combined(Some(Rc::clone(&state)), &Action::new("noop", Value::Null)).unwrap();
/// assert!(Rc::ptr_eq(&state, &next));
/// ```
pub fn combine_reducers(reducers: BTreeMap<String, SliceReducer>) -> Reducer<SliceMap> {
    // A failed assertion is carried into the combination and re-surfaced on
    // every call; the outcome is fixed at build time.
    let shape_error = assert_reducer_shape(&reducers).err();
    let warned_keys: RefCell<BTreeSet<String>> = RefCell::new(BTreeSet::new());

    Rc::new(move |state: Option<SliceMap>, action: &Action| {
        if let Some(err) = &shape_error {
            return Err(err.clone());
        }

        let prev = state.unwrap_or_default();

        if cfg!(debug_assertions) {
            warn_on_unexpected_shape(&prev, &reducers, action, &warned_keys);
        }

        let mut next = BTreeMap::new();
        let mut has_changed = false;
        for (key, reducer) in &reducers {
            let prev_slice = prev.get(key).cloned();
            let next_slice =
                reducer(prev_slice.clone(), action).ok_or_else(|| Error::SliceNoState {
                    key: key.clone(),
                    action_type: action.action_type.clone(),
                })?;
            has_changed = has_changed
                || match &prev_slice {
                    Some(prev_slice) => !Rc::ptr_eq(prev_slice, &next_slice),
                    None => true,
                };
            next.insert(key.clone(), next_slice);
        }

        Ok(if has_changed { Rc::new(next) } else { prev })
    })
}

/// Probe every reducer's contract once, in key order.
///
/// Each reducer must produce a state for the initialization action and for a
/// random type it cannot have seen before. The probe type is minted fresh on
/// every call, so a reducer has no way to special-case it.
fn assert_reducer_shape(reducers: &BTreeMap<String, SliceReducer>) -> Result<(), Error> {
    for (key, reducer) in reducers {
        if reducer(None, &Action::init()).is_none() {
            return Err(Error::ShapeNoInitialState { key: key.clone() });
        }
        if reducer(None, &Action::probe_unknown()).is_none() {
            return Err(Error::ShapeHandlesReserved { key: key.clone() });
        }
    }
    Ok(())
}

/// Advisory shape diagnostics for the incoming state. Warnings only, and at
/// most once per distinct unexpected key per combined-reducer instance.
fn warn_on_unexpected_shape(
    state: &BTreeMap<String, Slice>,
    reducers: &BTreeMap<String, SliceReducer>,
    action: &Action,
    warned_keys: &RefCell<BTreeSet<String>>,
) {
    if reducers.is_empty() {
        log::warn!(
            "store does not have a valid reducer: the map passed to combine_reducers is empty"
        );
        return;
    }

    let source = if action.action_type == INIT_TYPE {
        "preloaded state supplied to the store"
    } else {
        "previous state received by the reducer"
    };

    let mut warned_keys = warned_keys.borrow_mut();
    let unexpected: Vec<&String> = state
        .keys()
        .filter(|key| !reducers.contains_key(*key) && !warned_keys.contains(*key))
        .collect();
    if unexpected.is_empty() {
        return;
    }

    let unexpected_list = quoted_list(unexpected.iter().copied());
    let known_list = quoted_list(reducers.keys());
    log::warn!(
        "unexpected {} {unexpected_list} found in the {source}. Expected one of the \
         known reducer keys: {known_list}. Unexpected keys will be ignored.",
        if unexpected.len() > 1 { "keys" } else { "key" },
    );

    for key in unexpected {
        warned_keys.insert(key.clone());
    }
}

fn quoted_list<'a>(keys: impl Iterator<Item = &'a String>) -> String {
    keys.map(|key| format!("\"{key}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
