//! The network a wallet must be on before it can be connected.

/// A blockchain network identified by its hex chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredNetwork {
    /// Hex-encoded chain id as reported by `eth_chainId`.
    pub chain_id: &'static str,
    /// Display name used in user-facing messages.
    pub name: &'static str,
}

/// The single network connections are validated against. Hardcoded, not
/// configurable.
pub const REQUIRED_NETWORK: RequiredNetwork = RequiredNetwork {
    chain_id: "0xba93",
    name: "Neo X MainNet",
};
