//! Core data model.
//!
//! An action is a concrete unit of state change. The engine only needs two
//! things from it: whether it represents a failure, and its payload. Every
//! other field belongs to the caller.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A concrete action that can be captured.
pub trait Action: Clone + 'static {
    /// What [`capture`](crate::engine::capture) hands back.
    type Payload;

    /// Does the payload represent a failure rather than a result?
    fn is_error(&self) -> bool;

    /// Consume the action, keeping only its payload.
    fn into_payload(self) -> Self::Payload;
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A standard action: a type tag, a payload, an error flag and optional
/// metadata.
///
/// Serializes as `{"type": ..., "payload": ..., "error": true, "meta": ...}`,
/// leaving out `error` when false and `meta` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message<P = serde_json::Value> {
    /// Discriminant (e.g., "FETCH_USER_SUCCEEDED"). Not interpreted.
    #[serde(rename = "type")]
    pub kind: String,

    pub payload: P,

    /// When set, `payload` is the failure value.
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl<P> Message<P> {
    pub fn new(kind: impl Into<String>, payload: P) -> Self {
        Self {
            kind: kind.into(),
            payload,
            error: false,
            meta: None,
        }
    }

    /// A message whose payload is a failure.
    pub fn failure(kind: impl Into<String>, payload: P) -> Self {
        Self {
            error: true,
            ..Self::new(kind, payload)
        }
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl<P: Clone + 'static> Action for Message<P> {
    type Payload = P;

    fn is_error(&self) -> bool {
        self.error
    }

    fn into_payload(self) -> P {
        self.payload
    }
}
