//! Wallethub - EIP-6963 wallet discovery and connection management.
//!
//! This crate lets an application discover EIP-6963-compliant wallet
//! providers, connect to one, ensure it is on the required network, and
//! persist the selection across restarts. It wraps externally supplied
//! wallet provider handles; it implements no wallet, blockchain client, or
//! cryptography of its own.
//!
//! # Architecture
//!
//! - **Discovery** ([`discovery`]) - Announce/request event bus with
//!   cancellable listener registration
//! - **Provider** ([`provider`]) - The EIP-1193 request seam wallets plug
//!   into
//! - **Manager** ([`manager`]) - Registry, selection, account mapping, and
//!   the connect/disconnect lifecycle
//! - **Storage** ([`storage`]) - Durable key-value persistence of the
//!   selection state
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wallethub::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let bus = DiscoveryBus::new();
//!     let manager = ConnectionManager::new(Arc::new(FileStore::default_path()));
//!     let _listener = manager.start(&bus).await?;
//!
//!     manager.connect_wallet("com.example.wallet").await?;
//!     Ok(())
//! }
//! ```

pub mod discovery;
pub mod error;
pub mod manager;
pub mod network;
pub mod provider;
pub mod storage;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error types (centralized)
    pub use crate::error::{
        ConnectError, ConnectResult, HubError, Result, StorageError, StorageResult,
    };

    // Discovery
    pub use crate::discovery::{
        DiscoveryBus, ListenerHandle, ResponderHandle, WalletDetail, WalletInfo,
    };

    // Manager
    pub use crate::manager::{
        ConnectionManager, SELECTED_ACCOUNTS_KEY, SELECTED_WALLET_KEY,
    };

    // Network
    pub use crate::network::{REQUIRED_NETWORK, RequiredNetwork};

    // Provider
    pub use crate::provider::{
        ProviderError, ProviderResult, RpcCall, SharedProvider, WalletProvider,
    };

    // Storage
    pub use crate::storage::{FileStore, KeyValueStore, MemoryStore};
}
