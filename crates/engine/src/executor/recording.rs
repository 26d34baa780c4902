use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use atladmin_api::RemoteClient;
use atladmin_types::{RemoteCall, StepResult};
use serde_json::Value;

type Responder = Box<dyn Fn(&RemoteCall) -> StepResult + Send + Sync>;

/// In-memory [`RemoteClient`] that records every call and answers from a
/// closure. This allows tests and dry runs without external side effects.
pub struct RecordingClient {
    calls: Mutex<Vec<RemoteCall>>,
    responder: Responder,
}

impl RecordingClient {
    pub fn new(responder: impl Fn(&RemoteCall) -> StepResult + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// A client that answers every call with the same payload.
    pub fn succeeding(payload: Value) -> Self {
        Self::new(move |_| StepResult::succeeded(payload.clone()))
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl RemoteClient for RecordingClient {
    async fn call(&self, call: &RemoteCall) -> StepResult {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call.clone());
        (self.responder)(call)
    }
}
