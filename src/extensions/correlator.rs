//! Matches host responses to the requests that caused them.
//!
//! Request ids increase monotonically and are never reused. Each pending
//! request owns its callback; the callback runs at most once, on the first
//! [`RequestCorrelator::resolve`] for its id. Duplicate or stale responses
//! are ignored.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, trace};

use super::registry::ContextId;

pub type RequestId = u64;

/// A response from the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub success: bool,
    pub payload: Value,
    pub error: String,
}

pub type ResponseCallback = Box<dyn FnOnce(Response)>;

struct PendingRequest {
    context_id: ContextId,
    function_name: String,
    callback: ResponseCallback,
}

/// Bookkeeping for a request that left the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedRequest {
    pub request_id: RequestId,
    pub context_id: ContextId,
    pub function_name: String,
}

pub struct RequestCorrelator {
    next_id: RequestId,
    pending: HashMap<RequestId, PendingRequest>,
}

impl Default for RequestCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestCorrelator {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: HashMap::new(),
        }
    }

    pub fn allocate(
        &mut self,
        context_id: ContextId,
        function_name: &str,
        callback: ResponseCallback,
    ) -> RequestId {
        let request_id = self.next_id;
        self.next_id += 1;
        let previous = self.pending.insert(
            request_id,
            PendingRequest {
                context_id,
                function_name: function_name.to_string(),
                callback,
            },
        );
        debug_assert!(previous.is_none(), "request id {} reused", request_id);
        trace!(request_id, %context_id, function_name, "request allocated");
        request_id
    }

    /// Deliver a response. Unknown ids are a no-op and return `None`.
    pub fn resolve(&mut self, request_id: RequestId, response: Response) -> Option<FinishedRequest> {
        let Some(pending) = self.pending.remove(&request_id) else {
            debug!(request_id, "response for unknown request ignored");
            return None;
        };
        (pending.callback)(response);
        Some(FinishedRequest {
            request_id,
            context_id: pending.context_id,
            function_name: pending.function_name,
        })
    }

    /// Drop every request owned by `context_id` without running callbacks.
    pub fn invalidate(&mut self, context_id: ContextId) -> Vec<FinishedRequest> {
        let ids: Vec<RequestId> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.context_id == context_id)
            .map(|(id, _)| *id)
            .collect();

        let mut orphaned: Vec<FinishedRequest> = ids
            .into_iter()
            .filter_map(|request_id| {
                self.pending.remove(&request_id).map(|pending| FinishedRequest {
                    request_id,
                    context_id,
                    function_name: pending.function_name,
                })
            })
            .collect();
        orphaned.sort_by_key(|request| request.request_id);

        if !orphaned.is_empty() {
            debug!(%context_id, count = orphaned.len(), "orphaned pending requests");
        }
        orphaned
    }

    /// Context that started `request_id`, while it is pending.
    pub fn owner(&self, request_id: RequestId) -> Option<ContextId> {
        self.pending.get(&request_id).map(|pending| pending.context_id)
    }

    pub fn is_pending(&self, request_id: RequestId) -> bool {
        self.pending.contains_key(&request_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
