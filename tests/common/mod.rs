//! Shared fixtures: a recording store standing in for a real dispatch
//! pipeline, and thunk builders.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use action_capture::{Message, Thunk};
use serde_json::json;

pub type TestThunk = Thunk<Message, ()>;

/// Records every action handed to its sink, in order.
#[derive(Clone, Default)]
pub struct RecordingStore {
    actions: Rc<RefCell<Vec<Message>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> impl Fn(&Message) + 'static {
        let actions = Rc::clone(&self.actions);
        move |action: &Message| actions.borrow_mut().push(action.clone())
    }

    pub fn actions(&self) -> Vec<Message> {
        self.actions.borrow().clone()
    }
}

pub fn action(kind: &str) -> Message {
    Message::new(kind, json!({ "from": kind }))
}

pub fn failure(kind: &str) -> Message {
    Message::failure(kind, json!(format!("{kind} failed")))
}

/// Dispatches `msg` synchronously.
pub fn dispatching(msg: Message) -> TestThunk {
    TestThunk::sync(move |dispatch, _| {
        let _ = dispatch.dispatch(msg.clone())?;
        Ok(())
    })
}

/// Dispatches `msg` from inside a future.
pub fn dispatching_async(msg: Message) -> TestThunk {
    TestThunk::future(move |dispatch, _| {
        let msg = msg.clone();
        async move {
            let _ = dispatch.dispatch(msg)?;
            anyhow::Ok(())
        }
    })
}

/// Dispatches `msg` after sleeping for `delay_ms`.
pub fn delayed(delay_ms: u64, msg: Message) -> TestThunk {
    TestThunk::future(move |dispatch, _| {
        let msg = msg.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            let _ = dispatch.dispatch(msg)?;
            anyhow::Ok(())
        }
    })
}

/// Launches the three thunks concurrently and waits for all of them.
pub fn joined(first: TestThunk, second: TestThunk, third: TestThunk) -> TestThunk {
    use std::future::IntoFuture as _;

    TestThunk::future(move |dispatch, _| {
        let (first, second, third) = (first.clone(), second.clone(), third.clone());
        async move {
            tokio::try_join!(
                dispatch.dispatch(first)?.into_future(),
                dispatch.dispatch(second)?.into_future(),
                dispatch.dispatch(third)?.into_future(),
            )?;
            anyhow::Ok(())
        }
    })
}

/// Dispatches and awaits each thunk in turn.
pub fn sequenced(thunks: Vec<TestThunk>) -> TestThunk {
    TestThunk::future(move |dispatch, _| {
        let thunks = thunks.clone();
        async move {
            for thunk in thunks {
                dispatch.dispatch(thunk)?.await?;
            }
            anyhow::Ok(())
        }
    })
}
