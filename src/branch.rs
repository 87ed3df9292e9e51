//! Asynchronous thunk bodies in flight.
//!
//! A future handed back by a thunk is started as soon as it is dispatched,
//! running up to its first suspension point, then parked here. The
//! top-level capture drives every parked branch to completion whether or
//! not the thunk that dispatched it ever awaits the result.

use std::cell::RefCell;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::warn;

use crate::error::{Error, Result};
use crate::thunk::ThunkFuture;

type Branch = LocalBoxFuture<'static, ()>;

/// Branches started during one top-level call. Cloning shares them.
#[derive(Clone, Default)]
pub(crate) struct Branches {
    queued: Rc<RefCell<Vec<Branch>>>,
    unobserved_failure: Rc<RefCell<Option<Error>>>,
}

impl Branches {
    /// Run `fut` up to its first suspension point and park the rest.
    ///
    /// The receiver settles with the thunk's outcome once the branch is done.
    pub(crate) fn start(&self, mut fut: ThunkFuture) -> oneshot::Receiver<Result<()>> {
        let waker = futures::task::noop_waker();
        let mut ctx = Context::from_waker(&waker);
        let fut = match fut.poll_unpin(&mut ctx) {
            Poll::Ready(result) => future::ready(result).boxed_local(),
            Poll::Pending => fut,
        };

        let (tx, rx) = oneshot::channel();
        let unobserved_failure = Rc::clone(&self.unobserved_failure);
        let branch = async move {
            let result = fut.await.map_err(|e| {
                warn!(error = %e, "async thunk rejected");
                Error::from_producer(e)
            });
            // Nobody holds the receiver, so the failure belongs to the whole call.
            if let Err(Err(err)) = tx.send(result) {
                let mut slot = unobserved_failure.borrow_mut();
                if slot.is_none() {
                    *slot = Some(err);
                }
            }
        };
        self.queued.borrow_mut().push(branch.boxed_local());
        rx
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.queued.borrow().is_empty()
    }

    /// Resolve `root` while driving every parked branch, including those
    /// started along the way. Completes once `root` has settled and no
    /// branch is left running.
    pub(crate) async fn drive<T: 'static>(
        self,
        mut root: LocalBoxFuture<'static, Result<T>>,
    ) -> Result<T> {
        let mut running = FuturesUnordered::new();
        let mut outcome = None;

        future::poll_fn(move |cx| loop {
            running.extend(self.queued.borrow_mut().drain(..));
            while let Poll::Ready(Some(())) = running.poll_next_unpin(cx) {}

            if outcome.is_none() {
                if let Poll::Ready(result) = root.poll_unpin(cx) {
                    outcome = Some(result);
                }
            }
            if let Some(err) = self.unobserved_failure.borrow_mut().take() {
                return Poll::Ready(Err(err));
            }
            // Polling may have started more branches.
            if !self.is_idle() {
                continue;
            }
            if running.is_empty() {
                if let Some(result) = outcome.take() {
                    return Poll::Ready(result);
                }
            }
            return Poll::Pending;
        })
        .await
    }
}
