//! The wallet connection manager.
//!
//! Owns the set of discovered wallets, the current selection, and the
//! account-by-wallet mapping; exposes the connect/disconnect operations and
//! persists selection state so it survives restarts.
//!
//! All state lives behind a single lock inside a cheaply clonable handle.
//! Lock guards are never held across awaits, so discovery callbacks (which
//! run synchronously) and the async connect/disconnect operations can share
//! the manager freely. Concurrent connect attempts are not serialized; the
//! last one to settle wins.

use crate::discovery::{DiscoveryBus, ListenerHandle, WalletDetail};
use crate::error::{ConnectError, ConnectResult, StorageResult};
use crate::network::REQUIRED_NETWORK;
use crate::provider::SharedProvider;
use crate::storage::KeyValueStore;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Storage key holding the selected wallet's rdns.
pub const SELECTED_WALLET_KEY: &str = "selectedWalletRdns";

/// Storage key holding the JSON-encoded account-by-wallet mapping.
pub const SELECTED_ACCOUNTS_KEY: &str = "selectedAccountByWalletRdns";

/// Mapping from wallet rdns to the account connected through it, `None` once
/// disconnected. Entries accumulate across wallets.
type AccountMap = HashMap<String, Option<String>>;

#[derive(Default)]
struct ManagerState {
    /// Discovered wallets keyed by rdns. Announcements add or overwrite,
    /// never remove.
    wallets: HashMap<String, WalletDetail>,
    /// Currently selected wallet, if any.
    selected_rdns: Option<String>,
    accounts: AccountMap,
    /// Single user-visible error slot; a new error overwrites the prior one.
    error: Option<String>,
    /// Selection loaded from storage, applied when that wallet announces.
    restored_rdns: Option<String>,
}

/// Manages wallet discovery state, selection, and connection lifecycle.
///
/// Cheaply clonable; all clones share the same state and storage backend.
///
/// # Examples
///
/// ```rust,ignore
/// let storage = Arc::new(FileStore::default_path());
/// let manager = ConnectionManager::new(storage);
/// let bus = DiscoveryBus::new();
///
/// // Loads persisted selection, listens for announcements, requests
/// // providers. Keep the handle alive for the lifetime of the UI.
/// let _listener = manager.start(&bus).await?;
///
/// manager.connect_wallet("com.example.wallet").await?;
/// ```
#[derive(Clone)]
pub struct ConnectionManager {
    state: Arc<RwLock<ManagerState>>,
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager").finish_non_exhaustive()
    }
}

impl ConnectionManager {
    /// Create a manager backed by the given storage.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ManagerState::default())),
            storage,
        }
    }

    /// Start discovery: load persisted selection state, register an
    /// announcement listener on the bus, then broadcast a
    /// request-for-providers.
    ///
    /// The returned handle keeps the listener registered; cancelling or
    /// dropping it deregisters.
    ///
    /// # Errors
    ///
    /// Fails when the persisted state cannot be read or parsed.
    pub async fn start(&self, bus: &DiscoveryBus) -> StorageResult<ListenerHandle> {
        self.restore().await?;

        let manager = self.clone();
        let handle = bus.subscribe(move |detail| manager.handle_announcement(detail.clone()));
        bus.request_providers();
        Ok(handle)
    }

    /// Load the persisted selection and account mapping into memory.
    async fn restore(&self) -> StorageResult<()> {
        let saved_accounts = self.storage.get(SELECTED_ACCOUNTS_KEY).await?;
        let saved_rdns = self.storage.get(SELECTED_WALLET_KEY).await?;

        let accounts: Option<AccountMap> = saved_accounts
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        let mut state = self.state.write().expect("manager state poisoned");
        if let Some(map) = accounts {
            state.accounts = map;
        }
        state.restored_rdns = saved_rdns;
        debug!(
            restored = state.restored_rdns.is_some(),
            "persisted selection state loaded"
        );
        Ok(())
    }

    /// Record a wallet announcement.
    ///
    /// Adds or overwrites the registry entry for the announced rdns (last
    /// write wins). If the rdns matches the persisted selection, that wallet
    /// becomes selected without a connect call.
    pub fn handle_announcement(&self, detail: WalletDetail) {
        let rdns = detail.rdns().to_string();
        let mut state = self.state.write().expect("manager state poisoned");

        let replaced = state.wallets.insert(rdns.clone(), detail).is_some();
        debug!(rdns = %rdns, replaced, "wallet announcement recorded");

        if state.restored_rdns.as_deref() == Some(rdns.as_str())
            && state.selected_rdns.as_deref() != Some(rdns.as_str())
        {
            state.selected_rdns = Some(rdns.clone());
            info!(rdns = %rdns, "restored previous wallet selection");
        }
    }

    /// Connect to a discovered wallet.
    ///
    /// Ensures the wallet is on the required network (switching if needed),
    /// requests account access, then records and persists the selection. Any
    /// failure is also written to the user-visible error slot; there are no
    /// retries.
    ///
    /// A wallet that returns an empty account list leaves all state
    /// untouched.
    ///
    /// # Errors
    ///
    /// - [`ConnectError::WalletNotFound`] when the rdns was never announced.
    /// - [`ConnectError::ChainQuery`] when `eth_chainId` fails.
    /// - [`ConnectError::SwitchRejected`] when the wallet refuses to switch
    ///   networks; the connect aborts with no further side effects.
    /// - [`ConnectError::AccountsRejected`] when the wallet refuses account
    ///   access.
    pub async fn connect_wallet(&self, rdns: &str) -> ConnectResult<()> {
        let wallet = {
            let state = self.state.read().expect("manager state poisoned");
            state.wallets.get(rdns).cloned()
        };
        let Some(wallet) = wallet else {
            let err = ConnectError::WalletNotFound(rdns.to_string());
            self.set_error(err.user_message());
            return Err(err);
        };

        match self.try_connect(&wallet).await {
            Ok(Some(account)) => {
                self.commit_connection(wallet.rdns(), &account).await;
                Ok(())
            }
            Ok(None) => {
                debug!(rdns = %rdns, "wallet returned no accounts");
                Ok(())
            }
            Err(err) => {
                warn!(rdns = %rdns, error = %err, "wallet connect failed");
                self.set_error(err.user_message());
                Err(err)
            }
        }
    }

    /// The provider round-trips of a connect attempt: chain check, optional
    /// switch, account request. Returns the first account, if any.
    async fn try_connect(&self, wallet: &WalletDetail) -> ConnectResult<Option<String>> {
        let chain_id = wallet
            .provider
            .chain_id()
            .await
            .map_err(ConnectError::ChainQuery)?;

        if chain_id != REQUIRED_NETWORK.chain_id {
            debug!(
                rdns = %wallet.rdns(),
                chain_id = %chain_id,
                required = %REQUIRED_NETWORK.chain_id,
                "wallet on wrong network, requesting switch"
            );
            wallet
                .provider
                .switch_chain(REQUIRED_NETWORK.chain_id)
                .await
                .map_err(ConnectError::SwitchRejected)?;
        }

        let accounts = wallet
            .provider
            .request_accounts()
            .await
            .map_err(ConnectError::AccountsRejected)?;
        Ok(accounts.into_iter().next())
    }

    /// Record a successful connection and persist both storage keys.
    async fn commit_connection(&self, rdns: &str, account: &str) {
        let mapping_json = {
            let mut state = self.state.write().expect("manager state poisoned");
            state.selected_rdns = Some(rdns.to_string());
            state
                .accounts
                .insert(rdns.to_string(), Some(account.to_string()));
            // The selection is now explicit; a late announcement of the
            // previously persisted wallet must not steal it.
            state.restored_rdns = None;
            serde_json::to_string(&state.accounts)
        };

        info!(rdns = %rdns, account = %account, "wallet connected");

        if let Err(e) = self.storage.set(SELECTED_WALLET_KEY, rdns).await {
            warn!(error = %e, "failed to persist selected wallet");
        }
        self.persist_accounts(mapping_json).await;
    }

    /// Disconnect the selected wallet.
    ///
    /// No-op when nothing is selected. Clears the mapping entry and the
    /// selection, removes the persisted selection, re-persists the mapping,
    /// then asks the wallet to revoke permissions best-effort; a revocation
    /// failure is logged and never surfaced.
    pub async fn disconnect_wallet(&self) {
        let disconnected = {
            let mut state = self.state.write().expect("manager state poisoned");
            state.selected_rdns.take().map(|rdns| {
                state.accounts.insert(rdns.clone(), None);
                state.restored_rdns = None;
                let provider: Option<SharedProvider> = state
                    .wallets
                    .get(&rdns)
                    .map(|w| Arc::clone(&w.provider));
                (rdns, provider, serde_json::to_string(&state.accounts))
            })
        };
        let Some((rdns, provider, mapping_json)) = disconnected else {
            return;
        };

        info!(rdns = %rdns, "wallet disconnected");

        if let Err(e) = self.storage.remove(SELECTED_WALLET_KEY).await {
            warn!(error = %e, "failed to remove persisted selection");
        }
        self.persist_accounts(mapping_json).await;

        if let Some(provider) = provider {
            if let Err(e) = provider.revoke_permissions().await {
                warn!(rdns = %rdns, error = %e, "permission revocation failed");
            }
        }
    }

    /// Clear the user-visible error message. No other state changes.
    pub fn clear_error(&self) {
        self.state.write().expect("manager state poisoned").error = None;
    }

    /// The current user-visible error message, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.state
            .read()
            .expect("manager state poisoned")
            .error
            .clone()
    }

    /// Snapshot of all discovered wallets, ordered by rdns.
    #[must_use]
    pub fn wallets(&self) -> Vec<WalletDetail> {
        let state = self.state.read().expect("manager state poisoned");
        let mut wallets: Vec<WalletDetail> = state.wallets.values().cloned().collect();
        wallets.sort_by(|a, b| a.info.rdns.cmp(&b.info.rdns));
        wallets
    }

    /// Look up a discovered wallet by rdns.
    #[must_use]
    pub fn wallet(&self, rdns: &str) -> Option<WalletDetail> {
        self.state
            .read()
            .expect("manager state poisoned")
            .wallets
            .get(rdns)
            .cloned()
    }

    /// The currently selected wallet, if any.
    #[must_use]
    pub fn selected_wallet(&self) -> Option<WalletDetail> {
        let state = self.state.read().expect("manager state poisoned");
        state
            .selected_rdns
            .as_ref()
            .and_then(|rdns| state.wallets.get(rdns))
            .cloned()
    }

    /// The account connected through the selected wallet.
    ///
    /// Always derived from the account mapping keyed by the selection, never
    /// stored independently.
    #[must_use]
    pub fn selected_account(&self) -> Option<String> {
        let state = self.state.read().expect("manager state poisoned");
        state
            .selected_rdns
            .as_ref()
            .and_then(|rdns| state.accounts.get(rdns))
            .cloned()
            .flatten()
    }

    fn set_error(&self, message: String) {
        self.state.write().expect("manager state poisoned").error = Some(message);
    }

    async fn persist_accounts(&self, mapping_json: serde_json::Result<String>) {
        match mapping_json {
            Ok(json) => {
                if let Err(e) = self.storage.set(SELECTED_ACCOUNTS_KEY, &json).await {
                    warn!(error = %e, "failed to persist account mapping");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode account mapping"),
        }
    }
}
