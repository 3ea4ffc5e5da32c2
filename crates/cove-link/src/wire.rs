//! Decrypted payload schemas.
//!
//! These structs describe what sits inside an opened envelope, not the
//! relay's outer framing. Required fields are strict: a payload that fails
//! to deserialize drops its event.

use serde::Deserialize;

/// Decrypted payload of a `request` event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    /// Originating request id chosen by the dapp. Permission requests may
    /// omit it; the decoder then falls back to the event id.
    #[serde(default)]
    pub id: Option<String>,
    pub origin: String,
    pub request: MethodCall,
}

/// Nested request object, dispatched on its `method` tag. An unknown method
/// fails deserialization and the event is dropped.
#[derive(Debug, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum MethodCall {
    RequestEthereumAccounts(AccountsParams),
    SignEthereumMessage(SignMessageParams),
    SignEthereumTransaction(SignTransactionParams),
    SubmitEthereumTransaction(SubmitTransactionParams),
}

/// First-party hints a dapp may send with a permission request. Both fields
/// override the cached metadata when present.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsParams {
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub app_logo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignMessageParams {
    pub address: String,
    pub message: String,
    #[serde(default)]
    pub add_prefix: bool,
}

/// Numeric fields stay strings here; the decoder parses them as
/// arbitrary-precision integers and drops the event when one fails.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTransactionParams {
    pub from_address: String,
    pub to_address: String,
    pub wei_value: String,
    #[serde(default)]
    pub data: Option<String>,
    pub nonce: String,
    #[serde(default)]
    pub gas_price_in_wei: Option<String>,
    #[serde(default)]
    pub gas_limit_in_wei: Option<String>,
    pub chain_id: String,
    pub should_submit: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTransactionParams {
    pub signed_transaction: String,
    pub chain_id: String,
}

/// Decrypted payload of a `requestCanceled` event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRecord {
    pub originating_request_id: String,
    pub origin: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_tag_selects_the_schema() {
        let raw = r#"{
            "id": "r1",
            "origin": "https://dapp.example",
            "request": {
                "method": "signEthereumMessage",
                "params": { "address": "0xabc", "message": "hello", "addPrefix": true }
            }
        }"#;
        let envelope: RequestEnvelope = serde_json::from_str(raw).unwrap();
        match envelope.request {
            MethodCall::SignEthereumMessage(params) => {
                assert_eq!(params.address, "0xabc");
                assert!(params.add_prefix);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_method_fails_deserialization() {
        let raw = r#"{
            "origin": "https://dapp.example",
            "request": { "method": "mintUnicorns", "params": {} }
        }"#;
        assert!(serde_json::from_str::<RequestEnvelope>(raw).is_err());
    }

    #[test]
    fn missing_method_fails_deserialization() {
        let raw = r#"{
            "origin": "https://dapp.example",
            "request": { "params": {} }
        }"#;
        assert!(serde_json::from_str::<RequestEnvelope>(raw).is_err());
    }

    #[test]
    fn missing_required_field_fails_deserialization() {
        // no weiValue
        let raw = r#"{
            "id": "r1",
            "origin": "https://dapp.example",
            "request": {
                "method": "signEthereumTransaction",
                "params": {
                    "fromAddress": "0xa", "toAddress": "0xb",
                    "nonce": "1", "chainId": "1", "shouldSubmit": false
                }
            }
        }"#;
        assert!(serde_json::from_str::<RequestEnvelope>(raw).is_err());
    }

    #[test]
    fn accounts_params_may_be_empty() {
        let raw = r#"{
            "origin": "https://dapp.example",
            "request": { "method": "requestEthereumAccounts", "params": {} }
        }"#;
        let envelope: RequestEnvelope = serde_json::from_str(raw).unwrap();
        assert!(envelope.id.is_none());
        match envelope.request {
            MethodCall::RequestEthereumAccounts(params) => {
                assert!(params.app_name.is_none());
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }
}
