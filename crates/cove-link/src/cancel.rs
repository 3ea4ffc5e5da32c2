use crate::request::{HostRequest, HostRequestId, RequestMethod};

/// Whether `cancellation` withdraws the request identified by `candidate`.
///
/// Correlation is same session plus same originating request id. Permission
/// requests may lack a stable dapp-chosen id, so that class also correlates
/// through the dapp origin. The origin fallback can withdraw a concurrent
/// permission request from the same dapp; a dapp re-prompts permission
/// idempotently, so the wrong-but-same-origin match is harmless, and signing
/// requests are never matched by origin.
pub fn can_cancel(candidate: &HostRequestId, cancellation: &HostRequestId) -> bool {
    if candidate.session_id != cancellation.session_id
        || candidate.server_url != cancellation.server_url
    {
        return false;
    }
    if !candidate.request_id.is_empty() && candidate.request_id == cancellation.request_id {
        return true;
    }
    candidate.method == RequestMethod::RequestEthereumAccounts
        && candidate.dapp_url == cancellation.dapp_url
}

/// Outcome of one cancellation sweep over a decoded batch.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Requests to surface, in original event order. Includes cancellations
    /// that matched nothing here, so callers can dismiss a request they
    /// surfaced on an earlier poll.
    pub pending: Vec<HostRequest>,
    /// Identities whose backing events are consumed by the sweep and must
    /// be acknowledged: every suppressed request and its matching
    /// cancellation.
    pub consumed: Vec<HostRequestId>,
}

/// Fold cancellations into a decoded batch.
///
/// Each cancellation suppresses the first request it correlates with, in
/// encounter order; a request already suppressed is skipped so two
/// cancellations never consume the same request.
pub fn resolve_cancellations(decoded: Vec<HostRequest>) -> Resolution {
    let mut suppressed = vec![false; decoded.len()];
    let mut matched = vec![false; decoded.len()];

    for cancel_idx in 0..decoded.len() {
        if !decoded[cancel_idx].is_cancellation() {
            continue;
        }
        let cancellation = decoded[cancel_idx].id().clone();
        for request_idx in 0..decoded.len() {
            if decoded[request_idx].is_cancellation() || suppressed[request_idx] {
                continue;
            }
            if can_cancel(decoded[request_idx].id(), &cancellation) {
                suppressed[request_idx] = true;
                matched[cancel_idx] = true;
                break;
            }
        }
    }

    let mut resolution = Resolution::default();
    for (idx, request) in decoded.into_iter().enumerate() {
        if suppressed[idx] || matched[idx] {
            resolution.consumed.push(request.id().clone());
        } else {
            resolution.pending.push(request);
        }
    }
    resolution
}
