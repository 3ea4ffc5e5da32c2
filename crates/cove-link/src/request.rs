use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Closed set of methods a dapp can ask of the wallet through the relay.
/// Adding a method is a compile-time-checked change: the decoder and every
/// consumer match exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestMethod {
    RequestEthereumAccounts,
    SignEthereumMessage,
    SignEthereumTransaction,
    SubmitEthereumTransaction,
    RequestCanceled,
}

/// Identity of one decoded request instance: enough to deduplicate, to
/// correlate a later cancellation, and to acknowledge the backing event.
///
/// For a cancellation, `request_id` carries the originating request id it
/// refers to, while `event_id` stays the cancellation event's own id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostRequestId {
    pub request_id: String,
    pub session_id: String,
    pub event_id: String,
    pub server_url: String,
    pub dapp_url: String,
    pub dapp_image_url: Option<String>,
    pub dapp_name: Option<String>,
    pub method: RequestMethod,
}

/// One action a dapp asks the wallet to perform, decoded and enriched,
/// ready to surface to the user.
#[derive(Clone, Debug, PartialEq)]
pub enum HostRequest {
    /// Dapp wants account addresses exposed to it.
    DappPermission { id: HostRequestId },
    /// Sign a message with the key behind `address`.
    SignMessage {
        id: HostRequestId,
        address: String,
        message: String,
        is_prefixed: bool,
    },
    /// Sign a transaction, and broadcast it when `should_submit` is set.
    SignAndSubmitTx {
        id: HostRequestId,
        from_address: String,
        to_address: String,
        wei_value: BigUint,
        data: Vec<u8>,
        nonce: BigUint,
        gas_price: Option<BigUint>,
        gas_limit: Option<BigUint>,
        chain_id: BigUint,
        should_submit: bool,
    },
    /// Broadcast an already-signed transaction.
    SubmitSignedTx {
        id: HostRequestId,
        signed_tx: Vec<u8>,
        chain_id: BigUint,
    },
    /// The dapp withdrew an earlier request.
    RequestCanceled {
        id: HostRequestId,
        target_request_id: String,
    },
}

impl HostRequest {
    pub fn id(&self) -> &HostRequestId {
        match self {
            HostRequest::DappPermission { id } => id,
            HostRequest::SignMessage { id, .. } => id,
            HostRequest::SignAndSubmitTx { id, .. } => id,
            HostRequest::SubmitSignedTx { id, .. } => id,
            HostRequest::RequestCanceled { id, .. } => id,
        }
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, HostRequest::RequestCanceled { .. })
    }
}
