//! Configuration types for Weir

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::{Error, Network};

/// Balancer contract addresses for one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// Multi-hop swap entry point
    pub exchange_proxy: Address,
    /// DSProxy registry (`proxies`, `build`)
    pub proxy_registry: Address,
    /// Delegate-call target holding pool creation logic
    pub bactions: Address,
    /// BPool factory
    pub bfactory: Address,
    /// Wrapped native asset
    pub weth: Address,
}

impl ContractAddresses {
    pub fn mainnet() -> Self {
        Self {
            exchange_proxy: address!("0x3E66B66Fd1d0b02fDa6C811Da9E0547970DB2f21"),
            proxy_registry: address!("0x4678f0a6958e4D2Bc4F1BAF7Bc52E8F3564f3fE4"),
            bactions: address!("0xde4A25A0b9589689945d842c5ba0CF4f0D4eB3ac"),
            bfactory: address!("0x9424B1412450D0f8Fc2255FAf6046b98213B76Bd"),
            weth: address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
        }
    }

    pub fn kovan() -> Self {
        Self {
            exchange_proxy: address!("0x4e67bf5bD28Dd4b570FBAFe11D0633eCbA2754Ec"),
            proxy_registry: address!("0x130767E0cf05469CF11Fa3fcf270dfC1f52b9072"),
            bactions: address!("0xeACBe91fE3F8eF6086027AEC0127De982205b1Aa"),
            bfactory: address!("0x8f7F78080219d4066A8036ccD30D588B416a40DB"),
            weth: address!("0xd0A1E359811322d97991E03f863a0C30C2cF029C"),
        }
    }
}

/// Defaults applied to trades when the caller does not override them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDefaults {
    /// Maximum price slippage as a decimal fraction string (e.g. "0.005")
    #[serde(default = "default_max_slippage")]
    pub max_slippage: String,

    /// Gas price hint forwarded to the routing oracle, in wei
    #[serde(default = "default_gas_price_wei")]
    pub gas_price_wei: u64,

    /// Maximum number of pools the routing oracle may split a trade over
    #[serde(default = "default_max_pools")]
    pub max_pools: u32,
}

fn default_max_slippage() -> String {
    "0.005".to_string()
}

fn default_gas_price_wei() -> u64 {
    100_000_000_000
}

fn default_max_pools() -> u32 {
    4
}

impl Default for TradeDefaults {
    fn default() -> Self {
        Self {
            max_slippage: default_max_slippage(),
            gas_price_wei: default_gas_price_wei(),
            max_pools: default_max_pools(),
        }
    }
}

/// Chain connection and protocol configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub network: Network,

    /// JSON-RPC endpoint of the node / wallet bridge (e.g., "http://127.0.0.1:8545")
    pub rpc_url: String,

    /// Routing oracle endpoint
    pub sor_url: String,

    /// Pool indexer (subgraph) endpoint
    pub subgraph_url: String,

    pub contracts: ContractAddresses,

    #[serde(default)]
    pub defaults: TradeDefaults,

    /// Timeout applied to each node request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long a submitted transaction may stay unmined before it counts as dropped
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_receipt_timeout_secs() -> u64 {
    600
}

impl ChainConfig {
    /// Preset for a known network
    pub fn for_network(network: Network) -> Self {
        let (contracts, subgraph_url) = match network {
            Network::Mainnet => (
                ContractAddresses::mainnet(),
                "https://api.thegraph.com/subgraphs/name/balancer-labs/balancer",
            ),
            Network::Kovan => (
                ContractAddresses::kovan(),
                "https://api.thegraph.com/subgraphs/name/balancer-labs/balancer-kovan",
            ),
        };

        Self {
            network,
            rpc_url: "http://127.0.0.1:8545".to_string(),
            sor_url: "http://127.0.0.1:3030/swaps".to_string(),
            subgraph_url: subgraph_url.to_string(),
            contracts,
            defaults: TradeDefaults::default(),
            request_timeout_secs: default_request_timeout_secs(),
            receipt_timeout_secs: default_receipt_timeout_secs(),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.network.chain_id()
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::for_network(Network::Mainnet)
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chain connection settings
    pub chain: ChainConfig,

    /// Interface the API server binds to
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    18545
}

impl AppConfig {
    /// Parse a configuration document
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            api_host: default_api_host(),
            api_port: default_api_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.chain.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.chain.network, Network::Mainnet);
        assert_eq!(config.chain.defaults.max_slippage, "0.005");
        assert_eq!(config.api_host, "127.0.0.1");
        assert_eq!(config.api_port, 18545);
    }

    #[test]
    fn test_network_presets() {
        let kovan = ChainConfig::for_network(Network::Kovan);
        assert_eq!(kovan.chain_id(), 42);
        assert_eq!(
            kovan.contracts.proxy_registry,
            address!("0x130767E0cf05469CF11Fa3fcf270dfC1f52b9072")
        );
        assert!(kovan.subgraph_url.ends_with("balancer-kovan"));
        assert_ne!(kovan.contracts, ContractAddresses::mainnet());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = AppConfig::from_json(&json).unwrap();
        assert_eq!(parsed.chain.rpc_url, config.chain.rpc_url);
        assert_eq!(parsed.chain.contracts, config.chain.contracts);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut value = serde_json::to_value(ChainConfig::for_network(Network::Kovan)).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("defaults");
        obj.remove("request_timeout_secs");
        let json = serde_json::json!({ "chain": value }).to_string();

        let parsed = AppConfig::from_json(&json).unwrap();
        assert_eq!(parsed.api_host, "127.0.0.1");
        assert_eq!(parsed.api_port, 18545);
        assert_eq!(parsed.chain.request_timeout_secs, 30);
        assert_eq!(parsed.chain.defaults, TradeDefaults::default());
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let err = AppConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
