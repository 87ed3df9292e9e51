//! Core engine. The public API for capturing dispatched actions.
//!
//! A top-level call owns one [`ActionLog`]. Every nested dispatch, however
//! deep and whether synchronous or not, appends to that same log through a
//! shared [`Dispatcher`] handle.

use std::cell::RefCell;
use std::rc::Rc;

use std::future::IntoFuture as _;

use futures::future::FutureExt;
use tracing::{Instrument as _, debug, trace, warn};

use crate::branch::Branches;
use crate::error::{CaptureError, Error, Result};
use crate::model::Action;
use crate::resolution::Resolution;
use crate::telemetry::capture::{record_captured, start_capture_span};
use crate::thunk::{Dispatchable, GetState};

// ---------------------------------------------------------------------------
// Action log
// ---------------------------------------------------------------------------

/// Ordered, append-only record of the actions captured by one top-level call.
///
/// Cloning shares the underlying log.
pub struct ActionLog<A> {
    actions: Rc<RefCell<Vec<A>>>,
}

impl<A> ActionLog<A> {
    fn new() -> Self {
        Self {
            actions: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn push(&self, action: A) -> usize {
        let mut actions = self.actions.borrow_mut();
        actions.push(action);
        actions.len()
    }

    pub fn len(&self) -> usize {
        self.actions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.borrow().is_empty()
    }
}

impl<A: Clone> ActionLog<A> {
    pub fn last(&self) -> Option<A> {
        self.actions.borrow().last().cloned()
    }

    pub fn to_vec(&self) -> Vec<A> {
        self.actions.borrow().clone()
    }

    /// Take the actions out, copying only if a thunk still holds a handle.
    fn into_vec(self) -> Vec<A> {
        match Rc::try_unwrap(self.actions) {
            Ok(actions) => actions.into_inner(),
            Err(shared) => shared.borrow().clone(),
        }
    }
}

impl<A> Clone for ActionLog<A> {
    fn clone(&self) -> Self {
        Self {
            actions: Rc::clone(&self.actions),
        }
    }
}

impl<A: std::fmt::Debug> std::fmt::Debug for ActionLog<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.actions.borrow().iter()).finish()
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// The recursive dispatch handle given to thunks.
///
/// Dispatching through it resolves the item against the same sink, state
/// accessor and action log as the top-level call.
pub struct Dispatcher<A, S> {
    sink: Rc<dyn Fn(&A)>,
    get_state: GetState<S>,
    log: ActionLog<A>,
    branches: Branches,
}

impl<A: Action, S: 'static> Dispatcher<A, S> {
    fn new(sink: impl Fn(&A) + 'static, get_state: impl Fn() -> S + 'static) -> Self {
        Self {
            sink: Rc::new(sink),
            get_state: GetState::new(get_state),
            log: ActionLog::new(),
            branches: Branches::default(),
        }
    }

    /// Dispatch an action or a nested thunk.
    ///
    /// Returns the shared log, right away or once the thunk's future settles.
    /// An asynchronous thunk starts immediately and is driven to completion
    /// by the top-level capture even if this resolution is dropped.
    pub fn dispatch(
        &self,
        item: impl Into<Dispatchable<A, S>>,
    ) -> Result<Resolution<ActionLog<A>>> {
        collect(item.into(), self)
    }
}

impl<A, S> Clone for Dispatcher<A, S> {
    fn clone(&self) -> Self {
        Self {
            sink: Rc::clone(&self.sink),
            get_state: self.get_state.clone(),
            log: self.log.clone(),
            branches: self.branches.clone(),
        }
    }
}

fn collect<A: Action, S: 'static>(
    item: Dispatchable<A, S>,
    dispatcher: &Dispatcher<A, S>,
) -> Result<Resolution<ActionLog<A>>> {
    match item {
        Dispatchable::Thunk(thunk) => {
            trace!(captured = dispatcher.log.len(), "invoking thunk");
            let completion = thunk
                .invoke(dispatcher.clone(), dispatcher.get_state.clone())
                .map_err(|e| {
                    warn!(error = %e, "thunk failed");
                    Error::from_producer(e)
                })?;

            let Some(fut) = completion else {
                return Ok(Resolution::Ready(dispatcher.log.clone()));
            };

            let settled = dispatcher.branches.start(fut);
            let log = dispatcher.log.clone();
            Ok(Resolution::Pending(
                async move {
                    settled
                        .await
                        .map_err(|_| Error::Other("async thunk dropped before settling".into()))??;
                    debug!(captured = log.len(), "async thunk settled");
                    Ok(log)
                }
                .boxed_local(),
            ))
        }
        Dispatchable::Action(action) => {
            // The sink sees the action before it is recorded.
            (dispatcher.sink)(&action);
            let is_error = action.is_error();
            let captured = dispatcher.log.push(action);
            debug!(captured, is_error, "action captured");
            Ok(Resolution::Ready(dispatcher.log.clone()))
        }
    }
}

// ---------------------------------------------------------------------------
// Public operations
// ---------------------------------------------------------------------------

/// Dispatch `item` and return every concrete action it produced, in the
/// order each one finished resolving.
///
/// # Errors
///
/// Fails synchronously if a thunk fails while being invoked. A pending
/// resolution rejects if a thunk's future does.
pub fn capture_actions<A, S>(
    item: impl Into<Dispatchable<A, S>>,
    sink: impl Fn(&A) + 'static,
    get_state: impl Fn() -> S + 'static,
) -> Result<Resolution<Vec<A>>>
where
    A: Action,
    S: 'static,
{
    run_capture("capture_actions", item.into(), sink, get_state)
}

/// Dispatch `item` and return the last action it produced.
///
/// # Errors
///
/// As [`capture_actions`], plus [`Error::NoActions`] if nothing was
/// dispatched.
pub fn capture_last_action<A, S>(
    item: impl Into<Dispatchable<A, S>>,
    sink: impl Fn(&A) + 'static,
    get_state: impl Fn() -> S + 'static,
) -> Result<Resolution<A>>
where
    A: Action,
    S: 'static,
{
    run_capture_last("capture_last_action", item.into(), sink, get_state)
}

/// Dispatch `item` and return the payload of the last action it produced.
///
/// # Errors
///
/// [`CaptureError::Action`] carrying the payload if the last action is
/// flagged as an error, [`CaptureError::Capture`] for anything
/// [`capture_last_action`] fails with.
#[allow(clippy::type_complexity)]
pub fn capture<A, S>(
    item: impl Into<Dispatchable<A, S>>,
    sink: impl Fn(&A) + 'static,
    get_state: impl Fn() -> S + 'static,
) -> std::result::Result<
    Resolution<A::Payload, CaptureError<A::Payload>>,
    CaptureError<A::Payload>,
>
where
    A: Action,
    A::Payload: 'static,
    S: 'static,
{
    run_capture_last("capture", item.into(), sink, get_state)?
        .map_err(CaptureError::from)
        .try_map(unwrap_payload)
}

/// The only place a fresh log is created.
fn run_capture<A, S>(
    operation: &'static str,
    item: Dispatchable<A, S>,
    sink: impl Fn(&A) + 'static,
    get_state: impl Fn() -> S + 'static,
) -> Result<Resolution<Vec<A>>>
where
    A: Action,
    S: 'static,
{
    let span = start_capture_span(operation);
    let dispatcher = Dispatcher::new(sink, get_state);
    let resolution = span.in_scope(|| collect(item, &dispatcher))?;
    let branches = dispatcher.branches.clone();
    // Release our handle so a synchronous result can take the log without copying.
    drop(dispatcher);

    let resolution = match resolution {
        Resolution::Ready(log) if branches.is_idle() => Resolution::Ready(log),
        unsettled => Resolution::Pending(
            branches
                .drive(unsettled.into_future())
                .instrument(span.clone())
                .boxed_local(),
        ),
    };
    Ok(resolution.map(move |log| {
        record_captured(&span, log.len());
        log.into_vec()
    }))
}

fn run_capture_last<A, S>(
    operation: &'static str,
    item: Dispatchable<A, S>,
    sink: impl Fn(&A) + 'static,
    get_state: impl Fn() -> S + 'static,
) -> Result<Resolution<A>>
where
    A: Action,
    S: 'static,
{
    run_capture(operation, item, sink, get_state)?
        .try_map(|mut actions| actions.pop().ok_or(Error::NoActions))
}

fn unwrap_payload<A: Action>(
    action: A,
) -> std::result::Result<A::Payload, CaptureError<A::Payload>> {
    if action.is_error() {
        Err(CaptureError::Action(action.into_payload()))
    } else {
        Ok(action.into_payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Message;
    use crate::thunk::Thunk;

    #[test]
    fn dispatcher_clones_share_one_log() {
        let dispatcher: Dispatcher<Message<u32>, ()> = Dispatcher::new(|_| {}, || ());
        let other = dispatcher.clone();

        let _ = dispatcher.dispatch(Message::new("A", 1)).unwrap();
        let _ = other.dispatch(Message::new("B", 2)).unwrap();

        assert_eq!(dispatcher.log.len(), 2);
        assert_eq!(other.log.last().unwrap().kind, "B");
    }

    #[test]
    fn into_vec_copies_when_a_handle_outlives_the_call() {
        let log = ActionLog::new();
        log.push(Message::new("A", 1));
        let held = log.clone();
        assert_eq!(log.into_vec(), vec![Message::new("A", 1)]);
        assert_eq!(held.len(), 1);
    }

    #[test]
    fn thunk_receives_the_state_accessor() {
        let thunk = Thunk::<Message<u32>, u32>::sync(|dispatch, get_state| {
            let _ = dispatch.dispatch(Message::new("STATE", get_state.get()))?;
            Ok(())
        });
        let res = capture(thunk, |_| {}, || 42).unwrap();
        assert_eq!(res.into_ready().unwrap(), 42);
    }
}
