use crate::action::Action;
use crate::compose::{compose, ComposeFn};
use crate::error::Error;
use crate::store::{Dispatch, Enhancer, StoreCreator};
use std::cell::RefCell;
use std::rc::Rc;

/// The function a middleware factory returns: wraps the next dispatch stage
/// and yields a new one.
///
/// Wrappers are [`ComposeFn`]s over [`Dispatch`], so the whole chain
/// collapses through [`compose`].
pub type DispatchWrapper = ComposeFn<Dispatch>;

/// A middleware factory: given the store API, produce a dispatch wrapper.
///
/// Factories run once per store construction, in the order they were passed
/// to [`apply_middleware`]; the wrappers they return run once per dispatch.
pub type Middleware<S> = Rc<dyn Fn(MiddlewareApi<S>) -> DispatchWrapper>;

/// The store's current dispatch function behind a single-reassignment
/// indirection.
///
/// The cell is seeded with the kernel's native dispatch when the middleware
/// pipeline starts building, and reassigned exactly once, to the fully
/// composed chain, after every factory has run. Reading happens at call
/// time, so a handler that dispatches mid-action re-enters the chain from
/// the top.
pub struct DispatchCell {
    current: Rc<RefCell<Dispatch>>,
}

impl Clone for DispatchCell {
    fn clone(&self) -> Self {
        DispatchCell {
            current: Rc::clone(&self.current),
        }
    }
}

impl DispatchCell {
    fn new(initial: Dispatch) -> Self {
        DispatchCell {
            current: Rc::new(RefCell::new(initial)),
        }
    }

    /// The single reassignment, performed once the chain is composed.
    fn replace(&self, dispatch: Dispatch) {
        *self.current.borrow_mut() = dispatch;
    }

    /// Dispatch through whatever the cell currently holds.
    pub fn call(&self, action: Action) -> Result<Action, Error> {
        // Clone the handle out before calling: a nested dispatch reads the
        // cell again while this call is still on the stack.
        let dispatch = {
            let current = self.current.borrow();
            Rc::clone(&current)
        };
        dispatch(action)
    }
}

/// The slice of the store exposed to middleware: the state accessor and a
/// late-bound dispatch.
///
/// `dispatch` goes through the [`DispatchCell`], not the kernel dispatch
/// captured at construction. A handler that calls it while handling an
/// action re-enters the whole chain from the first middleware, as an
/// independent, ordinary dispatch.
///
/// Sharp edge: a middleware *factory* that calls `dispatch` synchronously
/// while the pipeline is still being built sees the cell before its
/// reassignment, and the action goes straight to the unwrapped kernel
/// dispatch, bypassing all middleware. Factories must not dispatch during
/// construction.
pub struct MiddlewareApi<S> {
    get_state: Rc<dyn Fn() -> S>,
    dispatch: DispatchCell,
}

impl<S> Clone for MiddlewareApi<S> {
    fn clone(&self) -> Self {
        MiddlewareApi {
            get_state: Rc::clone(&self.get_state),
            dispatch: self.dispatch.clone(),
        }
    }
}

impl<S> MiddlewareApi<S> {
    /// Current store state.
    pub fn state(&self) -> S {
        (self.get_state)()
    }

    /// Dispatch through the store's current dispatch chain.
    pub fn dispatch(&self, action: Action) -> Result<Action, Error> {
        self.dispatch.call(action)
    }
}

/// Build an enhancer that threads every dispatch through the given
/// middleware chain.
///
/// The first-listed middleware becomes the outermost wrapper: it sees each
/// action first, and its handler's return value becomes the return value of
/// `dispatch`. The kernel's native dispatch is the innermost terminal stage.
/// A handler that never calls `next` stops the action from reaching the
/// stages to its right, and the reducer, entirely.
///
/// The pipeline raises no errors of its own; an `Err` from any handler
/// unwinds synchronously through the stages already entered to the caller of
/// `dispatch`.
///
/// # Examples
///
/// ```
/// use statefold::{
///     apply_middleware, combine_reducers, create_store, Action, Dispatch, DispatchWrapper,
///     Middleware, Slice, SliceMap, SliceReducer,
/// };
/// use serde_json::{json, Value};
/// use std::cell::Cell;
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
/// let seen = Rc::new(Cell::new(0u32));
/// let tally: Middleware<SliceMap> = {
///     let seen = Rc::clone(&seen);
///     Rc::new(move |_api| {
///         let seen = Rc::clone(&seen);
///         Rc::new(move |next: Dispatch| {
///             let seen = Rc::clone(&seen);
///             Rc::new(move |action: Action| {
///                 seen.set(seen.get() + 1);
///                 next(action)
///             }) as Dispatch
///         }) as DispatchWrapper
///     })
/// };
///
/// let mut reducers: BTreeMap<String, SliceReducer> = BTreeMap::new();
/// reducers.insert("counter".to_string(), counter);
/// let store = create_store(
///     combine_reducers(reducers),
///     None,
///     Some(apply_middleware(vec![tally])),
/// )
/// .unwrap();
///
/// store.dispatch(Action::new("counter/incremented", Value::Null)).unwrap();
/// assert_eq!(seen.get(), 1);
/// assert_eq!(*store.state()["counter"], json!(1));
/// ```
pub fn apply_middleware<S: Clone + 'static>(middlewares: Vec<Middleware<S>>) -> Enhancer<S> {
    Rc::new(move |create_store: StoreCreator<S>| {
        let middlewares = middlewares.clone();
        Rc::new(move |reducer, preloaded| {
            let store = create_store(reducer, preloaded)?;

            // The cell starts out holding the unwrapped kernel dispatch; any
            // factory dispatching below hits that, not the chain.
            let cell = DispatchCell::new(store.dispatch_fn());
            let api = MiddlewareApi {
                get_state: store.get_state_fn(),
                dispatch: cell.clone(),
            };

            let chain: Vec<DispatchWrapper> = middlewares
                .iter()
                .map(|middleware| middleware(api.clone()))
                .collect();
            let dispatch = compose(chain)(store.dispatch_fn());
            cell.replace(Rc::clone(&dispatch));

            Ok(store.with_dispatch(dispatch))
        })
    })
}
