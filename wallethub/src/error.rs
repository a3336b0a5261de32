//! Unified error types for wallethub.
//!
//! Module-specific errors can be converted into the main `HubError` type.

use crate::network::REQUIRED_NETWORK;
use crate::provider::ProviderError;

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for wallethub operations.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Wallet connection error.
    #[error("connect: {0}")]
    Connect(#[from] ConnectError),

    /// Persistence error.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for wallethub operations.
pub type Result<T> = std::result::Result<T, HubError>;

// ============================================================================
// Connect Errors
// ============================================================================

/// Error type for wallet connection attempts.
///
/// Each variant names the step of the connect flow that failed, carrying the
/// wallet-reported error where one exists.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectError {
    /// The requested wallet is not present in the discovery registry.
    #[error("wallet not found: {0}")]
    WalletNotFound(String),

    /// The chain-id query failed.
    #[error("chain query failed: {0}")]
    ChainQuery(#[source] ProviderError),

    /// The wallet refused to switch to the required network.
    #[error("network switch rejected: {0}")]
    SwitchRejected(#[source] ProviderError),

    /// The wallet refused the account access request.
    #[error("account request rejected: {0}")]
    AccountsRejected(#[source] ProviderError),
}

impl ConnectError {
    /// The user-facing message recorded in the manager's error slot.
    ///
    /// Wallet-reported failures surface the raw code/message pair; a refused
    /// network switch surfaces a fixed instruction naming the required
    /// network.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::WalletNotFound(rdns) => format!("Wallet not found: {rdns}"),
            Self::SwitchRejected(_) => format!(
                "Please manually switch to the {} network.",
                REQUIRED_NETWORK.name
            ),
            Self::ChainQuery(err) | Self::AccountsRejected(err) => {
                format!("Code: {} \nError Message: {}", err.code, err.message)
            }
        }
    }
}

/// Result type for connection attempts.
pub type ConnectResult<T> = std::result::Result<T, ConnectError>;

// ============================================================================
// Storage Errors
// ============================================================================

/// Error type for key-value storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ============================================================================
// Tests
// ============================================================================
