use crate::action::Action;
use crate::compose::ComposeFn;
use crate::error::Error;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A pure function computing the next state from the previous state and an
/// action.
///
/// The incoming state is `None` exactly once, for the initialization action
/// dispatched while the store is being built (or earlier, if the reducer is
/// called directly). The result is fallible because a combined reducer
/// surfaces its configuration and data-flow errors here; a hand-written
/// top-level reducer will typically never return `Err`.
pub type Reducer<S> = Rc<dyn Fn(Option<S>, &Action) -> Result<S, Error>>;

/// The store's dispatch function: feeds an action through the middleware
/// chain and the reducer, returning the action once the chain completes.
pub type Dispatch = Rc<dyn Fn(Action) -> Result<Action, Error>>;

/// A callback notified after every dispatch that ran the reducer.
pub type Listener = Rc<dyn Fn()>;

/// Removes a previously registered [`Listener`]. Single-use by construction.
pub type Unsubscribe = Box<dyn FnOnce()>;

/// A store-construction function, as consumed and produced by enhancers.
pub type StoreCreator<S> = Rc<dyn Fn(Reducer<S>, Option<S>) -> Result<Store<S>, Error>>;

/// A higher-order function wrapping a [`StoreCreator`] to add capability.
///
/// Enhancers are [`ComposeFn`]s over store creators, so several of them
/// combine with [`compose`](crate::compose()) — the first-listed enhancer
/// becomes the outermost wrapper. [`apply_middleware`](crate::apply_middleware)
/// is the canonical enhancer.
pub type Enhancer<S> = ComposeFn<StoreCreator<S>>;

struct Kernel<S> {
    reducer: Reducer<S>,
    state: RefCell<S>,
    reducing: Cell<bool>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener_id: Cell<u64>,
}

impl<S: Clone + 'static> Kernel<S> {
    fn dispatch(&self, action: Action) -> Result<Action, Error> {
        if self.reducing.get() {
            return Err(Error::DispatchInReducer);
        }

        let prev = self.state.borrow().clone();
        self.reducing.set(true);
        let result = (self.reducer)(Some(prev), &action);
        self.reducing.set(false);
        *self.state.borrow_mut() = result?;

        // Notify a snapshot of the listener list: listeners may subscribe,
        // unsubscribe, or dispatch while being notified.
        let notify: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in notify {
            listener();
        }

        Ok(action)
    }

    fn subscribe(kernel: &Rc<Self>, listener: Listener) -> Unsubscribe {
        let id = kernel.next_listener_id.get();
        kernel.next_listener_id.set(id + 1);
        kernel.listeners.borrow_mut().push((id, listener));

        let kernel = Rc::clone(kernel);
        Box::new(move || {
            kernel
                .listeners
                .borrow_mut()
                .retain(|(listener_id, _)| *listener_id != id);
        })
    }
}

/// The object holding current state and exposing `dispatch` / `state` /
/// `subscribe`.
///
/// A store is a bundle of shared functions rather than a fixed method table:
/// an enhancer returns the same store with only its dispatch function
/// replaced ([`Store::with_dispatch`]), while `state` and `subscribe` keep
/// observing the same underlying kernel.
pub struct Store<S> {
    dispatch: Dispatch,
    get_state: Rc<dyn Fn() -> S>,
    subscribe: Rc<dyn Fn(Listener) -> Unsubscribe>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Store {
            dispatch: Rc::clone(&self.dispatch),
            get_state: Rc::clone(&self.get_state),
            subscribe: Rc::clone(&self.subscribe),
        }
    }
}

impl<S> Store<S> {
    /// Feed an action through the dispatch chain and the reducer.
    ///
    /// Returns the action itself once the chain completes. Listeners are
    /// notified after the reducer has replaced the state. Dispatching from
    /// inside a reducer is rejected with [`Error::DispatchInReducer`];
    /// dispatching from middleware or listeners re-enters the full chain on
    /// the same call stack.
    pub fn dispatch(&self, action: Action) -> Result<Action, Error> {
        (self.dispatch)(action)
    }

    /// Return the current state.
    ///
    /// The state is cloned out of the store; state types are typically `Rc`
    /// maps, so the clone is cheap and preserves identity.
    pub fn state(&self) -> S {
        (self.get_state)()
    }

    /// Register a listener called after every dispatch that ran the reducer.
    ///
    /// Returns a single-use function that removes the registration.
    /// Listeners registered during a notification round are first called on
    /// the next dispatch.
    pub fn subscribe(&self, listener: Listener) -> Unsubscribe {
        (self.subscribe)(listener)
    }

    /// A shared handle to this store's dispatch function.
    pub fn dispatch_fn(&self) -> Dispatch {
        Rc::clone(&self.dispatch)
    }

    /// A shared handle to this store's state accessor.
    pub fn get_state_fn(&self) -> Rc<dyn Fn() -> S> {
        Rc::clone(&self.get_state)
    }

    /// The same store with its dispatch function replaced.
    ///
    /// Everything else passes through unchanged and continues to observe the
    /// same underlying state. This is the primitive enhancers build on.
    pub fn with_dispatch(&self, dispatch: Dispatch) -> Store<S> {
        Store {
            dispatch,
            get_state: Rc::clone(&self.get_state),
            subscribe: Rc::clone(&self.subscribe),
        }
    }
}

/// Build a store around a reducer.
///
/// The reducer is run once with the private initialization action to produce
/// the initial state (folding over `preloaded` if supplied), so a reducer
/// that cannot produce an initial state fails construction. When an enhancer
/// is supplied, it wraps the base store constructor and its result is
/// returned instead; to apply several enhancers, combine them with
/// [`compose`](crate::compose()) first.
///
/// The store is single-threaded: a dispatch runs every middleware stage and
/// the reducer to completion on one call stack before returning.
///
/// # Examples
///
/// ```
/// use statefold::{combine_reducers, create_store, Action, Slice, SliceReducer};
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
///
/// let store = create_store(combine_reducers(reducers), None, None).unwrap();
/// assert_eq!(*store.state()["counter"], json!(0));
///
/// store.dispatch(Action::new("counter/incremented", Value::Null)).unwrap();
/// assert_eq!(*store.state()["counter"], json!(1));
/// ```
pub fn create_store<S: Clone + 'static>(
    reducer: Reducer<S>,
    preloaded: Option<S>,
    enhancer: Option<Enhancer<S>>,
) -> Result<Store<S>, Error> {
    if let Some(enhancer) = enhancer {
        let base: StoreCreator<S> =
            Rc::new(|reducer: Reducer<S>, preloaded: Option<S>| create_store(reducer, preloaded, None));
        return enhancer(base)(reducer, preloaded);
    }

    let initial = reducer(preloaded, &Action::init())?;
    let kernel = Rc::new(Kernel {
        reducer,
        state: RefCell::new(initial),
        reducing: Cell::new(false),
        listeners: RefCell::new(Vec::new()),
        next_listener_id: Cell::new(0),
    });

    let dispatch: Dispatch = {
        let kernel = Rc::clone(&kernel);
        Rc::new(move |action| kernel.dispatch(action))
    };
    let get_state: Rc<dyn Fn() -> S> = {
        let kernel = Rc::clone(&kernel);
        Rc::new(move || kernel.state.borrow().clone())
    };
    let subscribe: Rc<dyn Fn(Listener) -> Unsubscribe> =
        Rc::new(move |listener| Kernel::subscribe(&kernel, listener));

    Ok(Store {
        dispatch,
        get_state,
        subscribe,
    })
}
