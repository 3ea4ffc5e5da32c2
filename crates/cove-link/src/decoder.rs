use tracing::debug;

use crate::error::LinkError;
use crate::event::EventKind;
use crate::metadata::{DappMetadata, DappMetadataStore};
use crate::numeric::{parse_big_uint, parse_hex_bytes};
use crate::request::{HostRequest, HostRequestId, RequestMethod};
use crate::session::Session;
use crate::wire::{CancellationRecord, MethodCall, RequestEnvelope};

/// Decode one decrypted event payload into a typed host request.
///
/// Pure aside from the metadata read: identical (payload, kind, session)
/// inputs always produce the same result. Malformed or unrecognized input
/// decodes to `None`; the event is dropped upstream, never surfaced as an
/// error.
pub async fn decode_event(
    payload: &[u8],
    kind: EventKind,
    event_id: &str,
    session: &Session,
    metadata: &dyn DappMetadataStore,
) -> Option<HostRequest> {
    match kind {
        // Responses travel the same pipe but are never requests.
        EventKind::Response => None,
        EventKind::Request => decode_request(payload, event_id, session, metadata).await,
        EventKind::RequestCanceled => {
            decode_cancellation(payload, event_id, session, metadata).await
        }
    }
}

async fn decode_request(
    payload: &[u8],
    event_id: &str,
    session: &Session,
    metadata: &dyn DappMetadataStore,
) -> Option<HostRequest> {
    let envelope: RequestEnvelope = match serde_json::from_slice(payload) {
        Ok(envelope) => envelope,
        Err(err) => {
            debug!(event_id, error = %err, "dropping unparseable request payload");
            return None;
        }
    };
    let cached = metadata.lookup(&envelope.origin).await;
    // Permission requests may arrive without a dapp-chosen id; the event id
    // keeps the instance addressable.
    let request_id = envelope
        .id
        .clone()
        .unwrap_or_else(|| event_id.to_string());

    match envelope.request {
        MethodCall::RequestEthereumAccounts(params) => {
            let mut id = request_identity(
                request_id,
                event_id,
                session,
                envelope.origin,
                cached,
                RequestMethod::RequestEthereumAccounts,
            );
            // First-party hints in the payload win over the cached entry.
            if params.app_name.is_some() {
                id.dapp_name = params.app_name;
            }
            if params.app_logo_url.is_some() {
                id.dapp_image_url = params.app_logo_url;
            }
            Some(HostRequest::DappPermission { id })
        }
        MethodCall::SignEthereumMessage(params) => {
            let id = request_identity(
                request_id,
                event_id,
                session,
                envelope.origin,
                cached,
                RequestMethod::SignEthereumMessage,
            );
            Some(HostRequest::SignMessage {
                id,
                address: params.address,
                message: params.message,
                is_prefixed: params.add_prefix,
            })
        }
        MethodCall::SignEthereumTransaction(params) => {
            let wei_value = parsed_or_drop(parse_big_uint(&params.wei_value), event_id)?;
            let nonce = parsed_or_drop(parse_big_uint(&params.nonce), event_id)?;
            let chain_id = parsed_or_drop(parse_big_uint(&params.chain_id), event_id)?;
            let gas_price = match params.gas_price_in_wei {
                Some(raw) => Some(parsed_or_drop(parse_big_uint(&raw), event_id)?),
                None => None,
            };
            let gas_limit = match params.gas_limit_in_wei {
                Some(raw) => Some(parsed_or_drop(parse_big_uint(&raw), event_id)?),
                None => None,
            };
            let data = match params.data {
                Some(raw) => parsed_or_drop(parse_hex_bytes(&raw), event_id)?,
                None => Vec::new(),
            };
            let id = request_identity(
                request_id,
                event_id,
                session,
                envelope.origin,
                cached,
                RequestMethod::SignEthereumTransaction,
            );
            Some(HostRequest::SignAndSubmitTx {
                id,
                from_address: params.from_address,
                to_address: params.to_address,
                wei_value,
                data,
                nonce,
                gas_price,
                gas_limit,
                chain_id,
                should_submit: params.should_submit,
            })
        }
        MethodCall::SubmitEthereumTransaction(params) => {
            let signed_tx = parsed_or_drop(parse_hex_bytes(&params.signed_transaction), event_id)?;
            let chain_id = parsed_or_drop(parse_big_uint(&params.chain_id), event_id)?;
            let id = request_identity(
                request_id,
                event_id,
                session,
                envelope.origin,
                cached,
                RequestMethod::SubmitEthereumTransaction,
            );
            Some(HostRequest::SubmitSignedTx {
                id,
                signed_tx,
                chain_id,
            })
        }
    }
}

async fn decode_cancellation(
    payload: &[u8],
    event_id: &str,
    session: &Session,
    metadata: &dyn DappMetadataStore,
) -> Option<HostRequest> {
    let record: CancellationRecord = match serde_json::from_slice(payload) {
        Ok(record) => record,
        Err(err) => {
            debug!(event_id, error = %err, "dropping unparseable cancellation payload");
            return None;
        }
    };
    let cached = metadata.lookup(&record.origin).await;
    // The cancellation's own identity carries the id it refers to, so the
    // matching predicate works on a plain id pair.
    let id = request_identity(
        record.originating_request_id.clone(),
        event_id,
        session,
        record.origin,
        cached,
        RequestMethod::RequestCanceled,
    );
    Some(HostRequest::RequestCanceled {
        id,
        target_request_id: record.originating_request_id,
    })
}

fn request_identity(
    request_id: String,
    event_id: &str,
    session: &Session,
    dapp_url: String,
    cached: Option<DappMetadata>,
    method: RequestMethod,
) -> HostRequestId {
    HostRequestId {
        request_id,
        session_id: session.id.clone(),
        event_id: event_id.to_string(),
        server_url: session.server_url.clone(),
        dapp_url,
        dapp_image_url: cached.as_ref().and_then(|entry| entry.logo_url.clone()),
        dapp_name: cached.and_then(|entry| entry.name),
        method,
    }
}

fn parsed_or_drop<T>(parsed: Result<T, LinkError>, event_id: &str) -> Option<T> {
    match parsed {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(event_id, error = %err, "dropping request with malformed field");
            None
        }
    }
}
