//! EIP-6963 announce/request plumbing.
//!
//! Wallets announce themselves with an info block and a provider handle;
//! applications listen for those announcements and broadcast a single
//! request-for-providers at startup so already-injected wallets re-announce.
//! [`DiscoveryBus`] carries both directions in-process: listeners are invoked
//! synchronously in announcement arrival order, and registration returns a
//! handle that deregisters on cancel or drop.

use crate::provider::SharedProvider;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, trace};

/// Display-info block announced by a wallet (EIP-6963 provider info).
///
/// Only `rdns` is load-bearing (it keys the discovery registry); the full
/// block is carried for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    /// Globally unique id for this announcement session.
    pub uuid: String,
    /// Human-readable wallet name.
    pub name: String,
    /// Icon as a data URI.
    pub icon: String,
    /// Reverse-domain name, the wallet's stable identifier.
    pub rdns: String,
}

/// A discovered wallet: the announced info block plus its provider handle.
#[derive(Clone)]
pub struct WalletDetail {
    /// Display info announced by the wallet.
    pub info: WalletInfo,
    /// Request-capable provider handle.
    pub provider: SharedProvider,
}

impl WalletDetail {
    /// Create a wallet detail from an info block and provider handle.
    pub fn new(info: WalletInfo, provider: SharedProvider) -> Self {
        Self { info, provider }
    }

    /// The wallet's reverse-domain name identifier.
    #[must_use]
    pub fn rdns(&self) -> &str {
        &self.info.rdns
    }
}

impl std::fmt::Debug for WalletDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletDetail")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

type Listener = Box<dyn FnMut(&WalletDetail) + Send>;
type Responder = Box<dyn Fn(&DiscoveryBus) + Send>;

/// In-process broadcast bus for wallet announcements.
///
/// Cheaply clonable; all clones share the same listener and responder
/// registries. Callbacks run synchronously on the announcing thread and must
/// not register or deregister on the bus from inside the callback.
#[derive(Clone, Default)]
pub struct DiscoveryBus {
    inner: Arc<BusInner>,
}

impl std::fmt::Debug for DiscoveryBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryBus").finish_non_exhaustive()
    }
}

#[derive(Default)]
struct BusInner {
    /// Application-side announcement listeners, in registration order.
    listeners: Mutex<Vec<(u64, Listener)>>,
    /// Wallet-side responders invoked by `request_providers`.
    responders: Mutex<Vec<(u64, Responder)>>,
    next_id: AtomicU64,
}

impl DiscoveryBus {
    /// Create a new discovery bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for wallet announcements.
    ///
    /// The listener is invoked synchronously for every announcement, in
    /// arrival order, until the returned handle is cancelled or dropped.
    pub fn subscribe(&self, listener: impl FnMut(&WalletDetail) + Send + 'static) -> ListenerHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .expect("listener registry poisoned")
            .push((id, Box::new(listener)));
        debug!(id, "discovery listener registered");
        ListenerHandle {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Register a responder invoked on every [`request_providers`] broadcast.
    ///
    /// This is the wallet side of the protocol: a responder typically calls
    /// [`announce`] with its own detail, the way a browser wallet answers the
    /// request event.
    ///
    /// [`announce`]: Self::announce
    /// [`request_providers`]: Self::request_providers
    pub fn on_request(&self, responder: impl Fn(&Self) + Send + 'static) -> ResponderHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .responders
            .lock()
            .expect("responder registry poisoned")
            .push((id, Box::new(responder)));
        debug!(id, "discovery responder registered");
        ResponderHandle {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Broadcast a wallet announcement to all listeners.
    pub fn announce(&self, detail: WalletDetail) {
        trace!(rdns = %detail.info.rdns, "wallet announced");
        let mut listeners = self
            .inner
            .listeners
            .lock()
            .expect("listener registry poisoned");
        for (_, listener) in listeners.iter_mut() {
            listener(&detail);
        }
    }

    /// Broadcast a request-for-providers to all registered responders.
    ///
    /// Responders may announce from inside the callback; they must not call
    /// `request_providers` recursively.
    pub fn request_providers(&self) {
        debug!("requesting wallet providers");
        let responders = self
            .inner
            .responders
            .lock()
            .expect("responder registry poisoned");
        for (_, responder) in responders.iter() {
            responder(self);
        }
    }

    /// Number of registered announcement listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .expect("listener registry poisoned")
            .len()
    }
}

/// Cancellation handle for a registered announcement listener.
///
/// The listener stays registered for the lifetime of the handle and is
/// removed on [`cancel`](Self::cancel) or drop.
#[derive(Debug)]
#[must_use = "dropping the handle deregisters the listener"]
pub struct ListenerHandle {
    id: u64,
    inner: Weak<BusInner>,
}

impl ListenerHandle {
    /// Deregister the listener.
    pub fn cancel(self) {}
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .listeners
                .lock()
                .expect("listener registry poisoned")
                .retain(|(id, _)| *id != self.id);
            debug!(id = self.id, "discovery listener removed");
        }
    }
}

/// Cancellation handle for a registered responder.
#[derive(Debug)]
#[must_use = "dropping the handle deregisters the responder"]
pub struct ResponderHandle {
    id: u64,
    inner: Weak<BusInner>,
}

impl ResponderHandle {
    /// Deregister the responder.
    pub fn cancel(self) {}
}

impl Drop for ResponderHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .responders
                .lock()
                .expect("responder registry poisoned")
                .retain(|(id, _)| *id != self.id);
            debug!(id = self.id, "discovery responder removed");
        }
    }
}
