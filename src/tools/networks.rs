use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::networks::{ChainFamily, ChainId, NetworkRegistry};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CivicSupport {
    pub chain: ChainFamily,
    pub chain_network: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub network_key: &'static str,
    pub name: &'static str,
    pub chain_id: ChainId,
    pub rpc: &'static str,
    pub explorer: &'static str,
    pub civic_support: CivicSupport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworksResponse {
    pub supported_networks: Vec<NetworkInfo>,
    pub total_networks: usize,
    pub supported_chains: Vec<ChainFamily>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct NetworksTool {
    registry: NetworkRegistry,
}

impl NetworksTool {
    pub fn new() -> Self {
        NetworksTool {
            registry: NetworkRegistry::new(),
        }
    }

    pub fn list(&self) -> NetworksResponse {
        let supported_networks: Vec<NetworkInfo> = self
            .registry
            .list_all()
            .into_iter()
            .map(|(key, descriptor)| NetworkInfo {
                network_key: key.as_str(),
                name: descriptor.name,
                chain_id: descriptor.chain_id,
                rpc: descriptor.rpc,
                explorer: descriptor.explorer,
                civic_support: CivicSupport {
                    chain: descriptor.civic_chain,
                    chain_network: descriptor.civic_chain_network,
                },
            })
            .collect();

        NetworksResponse {
            total_networks: supported_networks.len(),
            supported_networks,
            supported_chains: self.registry.chain_families(),
            last_updated: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_all_networks() {
        let response = NetworksTool::new().list();
        assert_eq!(response.total_networks, 5);
        assert_eq!(response.supported_networks[0].network_key, "xdc-apothem");
        assert_eq!(
            response.supported_chains,
            vec![ChainFamily::Ethereum, ChainFamily::Solana]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(NetworksTool::new().list()).unwrap();
        let solana = &value["supportedNetworks"][4];

        assert_eq!(solana["networkKey"], "solana-devnet");
        assert_eq!(solana["chainId"], "devnet");
        assert_eq!(solana["civicSupport"]["chain"], "solana");
        assert_eq!(solana["civicSupport"]["chainNetwork"], "devnet");
        assert_eq!(value["supportedChains"], serde_json::json!(["ethereum", "solana"]));
        assert_eq!(value["totalNetworks"], 5);
    }
}
