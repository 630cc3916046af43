use std::rc::Rc;

/// A shared unary function from `T` to `T`, the unit of composition.
///
/// Both middleware dispatch wrappers and store enhancers are `ComposeFn`s
/// over their respective `T`, so one composition primitive serves the whole
/// dispatch pipeline.
pub type ComposeFn<T> = Rc<dyn Fn(T) -> T>;

/// Compose unary functions from right to left.
///
/// `compose(vec![f, g, h])` returns a function that computes `f(g(h(x)))`.
/// Composition only builds closures: no constituent function runs until the
/// composite is called, and then each runs exactly once per invocation, in
/// right-to-left order.
///
/// An empty vector yields the identity function. A single function is
/// returned unchanged (the same `Rc`), so pipelines can add zero, one, or
/// many stages uniformly. A multi-argument innermost stage is expressed by
/// instantiating `T` as a tuple.
///
/// # Examples
///
/// ```
/// use statefold::{compose, ComposeFn};
/// use std::rc::Rc;
///
/// let double: ComposeFn<i64> = Rc::new(|x| x * 2);
/// let add_one: ComposeFn<i64> = Rc::new(|x| x + 1);
///
/// // Rightmost runs first: (5 * 2) + 1
/// let composite = compose(vec![add_one, double]);
/// assert_eq!(composite(5), 11);
///
/// let identity = compose::<i64>(vec![]);
/// assert_eq!(identity(7), 7);
/// ```
pub fn compose<T: 'static>(funcs: Vec<ComposeFn<T>>) -> ComposeFn<T> {
    let mut funcs = funcs.into_iter();
    let Some(first) = funcs.next() else {
        return Rc::new(|x| x);
    };
    funcs.fold(first, |outer, inner| Rc::new(move |x| outer(inner(x))))
}
