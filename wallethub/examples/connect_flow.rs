//! Discover an in-process demo wallet, connect to it, and disconnect.
//!
//! Real integrations register a responder that bridges actual EIP-6963
//! announcements onto the bus; here a scripted wallet plays that part.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use wallethub::prelude::*;

struct DemoWallet {
    chain_id: Mutex<String>,
}

#[async_trait]
impl WalletProvider for DemoWallet {
    async fn request(&self, call: RpcCall) -> ProviderResult<Value> {
        match call.method.as_str() {
            "eth_chainId" => Ok(json!(self.chain_id.lock().expect("chain lock").clone())),
            "eth_requestAccounts" => Ok(json!(["0x1234567890abcdef1234567890abcdef12345678"])),
            "wallet_switchEthereumChain" => {
                *self.chain_id.lock().expect("chain lock") =
                    REQUIRED_NETWORK.chain_id.to_string();
                Ok(Value::Null)
            }
            "wallet_revokePermissions" => Ok(Value::Null),
            other => Err(ProviderError::new(-32601, format!("unknown method {other}"))),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("wallethub=debug")
        .init();

    let bus = DiscoveryBus::new();

    // Wallet side: announce on every provider request.
    let provider: SharedProvider = Arc::new(DemoWallet {
        chain_id: Mutex::new("0x1".to_string()),
    });
    let detail = WalletDetail::new(
        WalletInfo {
            uuid: "b5a9f2c1-demo".to_string(),
            name: "Demo Wallet".to_string(),
            icon: "data:image/svg+xml,".to_string(),
            rdns: "com.example.demo".to_string(),
        },
        provider,
    );
    let _responder = bus.on_request(move |bus| bus.announce(detail.clone()));

    // Application side: discover, connect, inspect, disconnect.
    let manager = ConnectionManager::new(Arc::new(MemoryStore::new()));
    let _listener = manager.start(&bus).await?;

    for wallet in manager.wallets() {
        println!("discovered: {} ({})", wallet.info.name, wallet.info.rdns);
    }

    manager.connect_wallet("com.example.demo").await?;
    if let Some(account) = manager.selected_account() {
        println!("connected account: {account}");
    }

    manager.disconnect_wallet().await;
    println!("disconnected");

    Ok(())
}
