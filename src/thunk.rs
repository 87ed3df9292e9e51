//! Deferred producers.
//!
//! A thunk is a function that, given a dispatcher and a state accessor,
//! dispatches zero or more further actions or thunks. It may finish
//! synchronously or hand back a future that completes later.

use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};

use crate::engine::Dispatcher;
use crate::model::Message;

/// Completion handle of an asynchronous thunk. Its value is ignored.
pub type ThunkFuture = LocalBoxFuture<'static, anyhow::Result<()>>;

/// What invoking a thunk yields.
///
/// `Err` is a synchronous failure, `Ok(None)` synchronous completion and
/// `Ok(Some(_))` asynchronous completion.
pub type ThunkResult = anyhow::Result<Option<ThunkFuture>>;

type ThunkFn<A, S> = dyn Fn(Dispatcher<A, S>, GetState<S>) -> ThunkResult;

/// A deferred producer of actions.
///
/// Thunks are reference counted and can be invoked more than once; each
/// invocation dispatches afresh.
pub struct Thunk<A, S> {
    run: Rc<ThunkFn<A, S>>,
}

impl<A: 'static, S: 'static> Thunk<A, S> {
    /// Raw form: do synchronous work, then optionally hand back a future.
    pub fn new(f: impl Fn(Dispatcher<A, S>, GetState<S>) -> ThunkResult + 'static) -> Self {
        Self { run: Rc::new(f) }
    }

    /// A thunk that completes before returning.
    pub fn sync(
        f: impl Fn(Dispatcher<A, S>, GetState<S>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        Self::new(move |dispatch, get_state| f(dispatch, get_state).map(|()| None))
    }

    /// A thunk whose body is a future.
    ///
    /// The closure runs when the thunk is dispatched and the future it
    /// returns is polled right away, up to its first suspension point. The
    /// rest runs under the top-level capture, awaited or not.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(Dispatcher<A, S>, GetState<S>) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        Self::new(move |dispatch, get_state| Ok(Some(f(dispatch, get_state).boxed_local())))
    }

    pub(crate) fn invoke(&self, dispatch: Dispatcher<A, S>, get_state: GetState<S>) -> ThunkResult {
        (self.run)(dispatch, get_state)
    }
}

impl<A, S> Clone for Thunk<A, S> {
    fn clone(&self) -> Self {
        Self {
            run: Rc::clone(&self.run),
        }
    }
}

impl<A, S> std::fmt::Debug for Thunk<A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Thunk")
    }
}

// ---------------------------------------------------------------------------
// State accessor
// ---------------------------------------------------------------------------

/// Read access to the caller's state. Forwarded to thunks, never read by
/// the engine itself.
pub struct GetState<S> {
    read: Rc<dyn Fn() -> S>,
}

impl<S> GetState<S> {
    pub fn new(read: impl Fn() -> S + 'static) -> Self {
        Self {
            read: Rc::new(read),
        }
    }

    pub fn get(&self) -> S {
        (self.read)()
    }
}

impl<S> Clone for GetState<S> {
    fn clone(&self) -> Self {
        Self {
            read: Rc::clone(&self.read),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatchable
// ---------------------------------------------------------------------------

/// Anything that can be dispatched: a concrete action or a thunk.
#[derive(Debug)]
pub enum Dispatchable<A, S> {
    Action(A),
    Thunk(Thunk<A, S>),
}

impl<A, S> From<Thunk<A, S>> for Dispatchable<A, S> {
    fn from(thunk: Thunk<A, S>) -> Self {
        Dispatchable::Thunk(thunk)
    }
}

impl<P, S> From<Message<P>> for Dispatchable<Message<P>, S> {
    fn from(message: Message<P>) -> Self {
        Dispatchable::Action(message)
    }
}
