mod action;
mod combine;
mod compose;
mod error;
mod middleware;
mod store;

pub use action::{is_reserved_type, Action, RESERVED_TYPE_PREFIX};
pub use combine::{combine_reducers, Slice, SliceMap, SliceReducer};
pub use compose::{compose, ComposeFn};
pub use error::Error;
pub use middleware::{apply_middleware, DispatchCell, DispatchWrapper, Middleware, MiddlewareApi};
pub use store::{
    create_store, Dispatch, Enhancer, Listener, Reducer, Store, StoreCreator, Unsubscribe,
};
