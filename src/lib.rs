//! # action-capture
//!
//! Dispatch an action or a thunk and see what came out of it.
//!
//! A thunk may dispatch further actions and thunks, nested to any depth,
//! synchronously or from inside a future. The capture operations collect
//! every concrete action in the order it finished resolving:
//!
//! - [`capture_actions`] returns all of them;
//! - [`capture_last_action`] returns the last one;
//! - [`capture`] returns the last one's payload, or fails with it if the
//!   action is flagged as an error.
//!
//! Each operation returns a [`Resolution`]: `Ready` when everything
//! finished synchronously, `Pending` when some thunk is still running.
//! Both can be awaited.

mod branch;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod resolution;
pub mod telemetry;
pub mod thunk;

pub use engine::{ActionLog, Dispatcher, capture, capture_actions, capture_last_action};
pub use error::{CaptureError, Error, Result};
pub use model::{Action, Message};
pub use resolution::Resolution;
pub use thunk::{Dispatchable, GetState, Thunk, ThunkFuture, ThunkResult};
