//! The EIP-1193 request seam.
//!
//! A wallet hands the application a request-capable provider handle; every
//! interaction with the wallet goes through [`WalletProvider::request`] with a
//! JSON-RPC-shaped method/params pair. The typed helpers on the trait cover
//! the four methods the connection flow uses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// A JSON-RPC-shaped request submitted to a wallet provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcCall {
    /// RPC method name, e.g. `eth_chainId`.
    pub method: String,
    /// Optional positional parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcCall {
    /// Create a call with no parameters.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: None,
        }
    }

    /// Create a call with positional parameters.
    pub fn with_params(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params: Some(params),
        }
    }
}

/// An error reported by a wallet provider.
///
/// Carries the EIP-1193 error code (e.g. `4001` for a user rejection) and the
/// wallet's message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("code {code}: {message}")]
pub struct ProviderError {
    /// Numeric error code as defined by EIP-1193/JSON-RPC.
    pub code: i64,
    /// Human-readable message from the wallet.
    pub message: String,
}

impl ProviderError {
    /// The user rejected the request (EIP-1193).
    pub const USER_REJECTED: i64 = 4001;
    /// The requested chain is not known to the wallet (EIP-3085/EIP-3326).
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// Internal JSON-RPC error, used for malformed provider responses.
    pub const INTERNAL: i64 = -32603;

    /// Create a provider error.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A provider response that did not have the expected shape.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL, msg)
    }
}

/// Result type for provider requests.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// A request-capable wallet provider handle (EIP-1193).
///
/// Implementations forward [`RpcCall`]s to the wallet they represent. The
/// provided methods wrap the calls the connection flow issues and decode the
/// untyped responses.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Submit a raw request to the wallet.
    async fn request(&self, call: RpcCall) -> ProviderResult<Value>;

    /// Query the chain id the wallet is currently on (`eth_chainId`).
    async fn chain_id(&self) -> ProviderResult<String> {
        let value = self.request(RpcCall::new("eth_chainId")).await?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::invalid_response("eth_chainId returned a non-string"))
    }

    /// Request account access (`eth_requestAccounts`).
    ///
    /// Returns the wallet's ordered account list; callers use the first entry.
    async fn request_accounts(&self) -> ProviderResult<Vec<String>> {
        let value = self.request(RpcCall::new("eth_requestAccounts")).await?;
        serde_json::from_value(value).map_err(|e| {
            ProviderError::invalid_response(format!("eth_requestAccounts returned a non-list: {e}"))
        })
    }

    /// Ask the wallet to switch to the given chain
    /// (`wallet_switchEthereumChain`).
    async fn switch_chain(&self, chain_id: &str) -> ProviderResult<()> {
        self.request(RpcCall::with_params(
            "wallet_switchEthereumChain",
            json!([{ "chainId": chain_id }]),
        ))
        .await
        .map(|_| ())
    }

    /// Ask the wallet to drop the account permission grant
    /// (`wallet_revokePermissions`).
    async fn revoke_permissions(&self) -> ProviderResult<()> {
        self.request(RpcCall::with_params(
            "wallet_revokePermissions",
            json!([{ "eth_accounts": {} }]),
        ))
        .await
        .map(|_| ())
    }
}

/// Type alias for a shared provider handle.
pub type SharedProvider = Arc<dyn WalletProvider>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Provider stub that answers from a fixed table and records every call.
    struct TableProvider {
        responses: Vec<(&'static str, ProviderResult<Value>)>,
        calls: Mutex<Vec<RpcCall>>,
    }

    impl TableProvider {
        fn new(responses: Vec<(&'static str, ProviderResult<Value>)>) -> Self {
            Self {
                responses,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl WalletProvider for TableProvider {
        async fn request(&self, call: RpcCall) -> ProviderResult<Value> {
            self.calls.lock().expect("calls lock").push(call.clone());
            self.responses
                .iter()
                .find(|(method, _)| *method == call.method)
                .map_or_else(
                    || Err(ProviderError::new(-32601, "method not found")),
                    |(_, response)| response.clone(),
                )
        }
    }

    #[tokio::test]
    async fn test_chain_id_decodes_string() {
        let provider = TableProvider::new(vec![("eth_chainId", Ok(json!("0xba93")))]);
        assert_eq!(provider.chain_id().await.unwrap(), "0xba93");
    }

    #[tokio::test]
    async fn test_chain_id_rejects_non_string() {
        let provider = TableProvider::new(vec![("eth_chainId", Ok(json!(47763)))]);
        let err = provider.chain_id().await.unwrap_err();
        assert_eq!(err.code, ProviderError::INTERNAL);
    }

    #[tokio::test]
    async fn test_request_accounts_decodes_list() {
        let provider =
            TableProvider::new(vec![("eth_requestAccounts", Ok(json!(["0xabc", "0xdef"])))]);
        let accounts = provider.request_accounts().await.unwrap();
        assert_eq!(accounts, vec!["0xabc".to_string(), "0xdef".to_string()]);
    }

    #[tokio::test]
    async fn test_switch_chain_sends_chain_id_param() {
        let provider = TableProvider::new(vec![("wallet_switchEthereumChain", Ok(Value::Null))]);
        provider.switch_chain("0xba93").await.unwrap();

        let calls = provider.calls.lock().expect("calls lock");
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].params,
            Some(json!([{ "chainId": "0xba93" }]))
        );
    }

    #[tokio::test]
    async fn test_revoke_permissions_sends_eth_accounts_param() {
        let provider = TableProvider::new(vec![("wallet_revokePermissions", Ok(Value::Null))]);
        provider.revoke_permissions().await.unwrap();

        let calls = provider.calls.lock().expect("calls lock");
        assert_eq!(
            calls[0].params,
            Some(json!([{ "eth_accounts": {} }]))
        );
    }

    #[tokio::test]
    async fn test_provider_error_passthrough() {
        let provider = TableProvider::new(vec![(
            "eth_requestAccounts",
            Err(ProviderError::new(
                ProviderError::USER_REJECTED,
                "User rejected the request.",
            )),
        )]);
        let err = provider.request_accounts().await.unwrap_err();
        assert_eq!(err.code, 4001);
    }
}
