use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CivicError;

/// Address-encoding convention of a chain, as named by the Civic API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Ethereum,
    Solana,
}

impl ChainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainFamily::Ethereum => "ethereum",
            ChainFamily::Solana => "solana",
        }
    }
}

/// Numeric EVM chain id, or a cluster name for Solana.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChainId {
    Numeric(u64),
    Named(&'static str),
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainId::Numeric(id) => write!(f, "{}", id),
            ChainId::Named(name) => f.write_str(name),
        }
    }
}

/// Static chain metadata for one supported network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub name: &'static str,
    pub chain_id: ChainId,
    pub rpc: &'static str,
    pub explorer: &'static str,
    pub civic_chain: ChainFamily,
    pub civic_chain_network: &'static str,
}

impl NetworkDescriptor {
    pub fn explorer_address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer, address)
    }
}

/// Networks the Civic Pass API can be queried on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkKey {
    #[serde(rename = "xdc-apothem")]
    XdcApothem,
    #[serde(rename = "xdc-mainnet")]
    XdcMainnet,
    #[serde(rename = "ethereum-sepolia")]
    EthereumSepolia,
    #[serde(rename = "polygon-amoy")]
    PolygonAmoy,
    #[serde(rename = "solana-devnet")]
    SolanaDevnet,
}

impl NetworkKey {
    /// Registry order, used for enumeration.
    pub const ALL: [NetworkKey; 5] = [
        NetworkKey::XdcApothem,
        NetworkKey::XdcMainnet,
        NetworkKey::EthereumSepolia,
        NetworkKey::PolygonAmoy,
        NetworkKey::SolanaDevnet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkKey::XdcApothem => "xdc-apothem",
            NetworkKey::XdcMainnet => "xdc-mainnet",
            NetworkKey::EthereumSepolia => "ethereum-sepolia",
            NetworkKey::PolygonAmoy => "polygon-amoy",
            NetworkKey::SolanaDevnet => "solana-devnet",
        }
    }

    pub fn descriptor(&self) -> &'static NetworkDescriptor {
        match self {
            NetworkKey::XdcApothem => &XDC_APOTHEM,
            NetworkKey::XdcMainnet => &XDC_MAINNET,
            NetworkKey::EthereumSepolia => &ETHEREUM_SEPOLIA,
            NetworkKey::PolygonAmoy => &POLYGON_AMOY,
            NetworkKey::SolanaDevnet => &SOLANA_DEVNET,
        }
    }
}

impl fmt::Display for NetworkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkKey {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NetworkKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| CivicError::UnsupportedNetwork(s.to_string()))
    }
}

static XDC_APOTHEM: NetworkDescriptor = NetworkDescriptor {
    name: "XDC Apothem Testnet",
    chain_id: ChainId::Numeric(51),
    rpc: "https://erpc.apothem.network",
    explorer: "https://explorer.apothem.network",
    civic_chain: ChainFamily::Ethereum,
    civic_chain_network: "xdcApothem",
};

static XDC_MAINNET: NetworkDescriptor = NetworkDescriptor {
    name: "XDC Mainnet",
    chain_id: ChainId::Numeric(50),
    rpc: "https://erpc.xinfin.network",
    explorer: "https://explorer.xinfin.network",
    civic_chain: ChainFamily::Ethereum,
    civic_chain_network: "xdcMainnet",
};

static ETHEREUM_SEPOLIA: NetworkDescriptor = NetworkDescriptor {
    name: "Ethereum Sepolia",
    chain_id: ChainId::Numeric(11_155_111),
    rpc: "https://sepolia.infura.io/v3/",
    explorer: "https://sepolia.etherscan.io",
    civic_chain: ChainFamily::Ethereum,
    civic_chain_network: "sepolia",
};

static POLYGON_AMOY: NetworkDescriptor = NetworkDescriptor {
    name: "Polygon Amoy",
    chain_id: ChainId::Numeric(80_002),
    rpc: "https://rpc-amoy.polygon.technology",
    explorer: "https://amoy.polygonscan.com",
    civic_chain: ChainFamily::Ethereum,
    civic_chain_network: "polygonAmoy",
};

static SOLANA_DEVNET: NetworkDescriptor = NetworkDescriptor {
    name: "Solana Devnet",
    chain_id: ChainId::Named("devnet"),
    rpc: "https://api.devnet.solana.com",
    explorer: "https://explorer.solana.com",
    civic_chain: ChainFamily::Solana,
    civic_chain_network: "devnet",
};

/// Read-only view over the supported networks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkRegistry;

impl NetworkRegistry {
    pub fn new() -> Self {
        NetworkRegistry
    }

    /// Look up a network by its string key. Unknown keys never fall back to a default.
    pub fn resolve(&self, key: &str) -> crate::Result<(NetworkKey, &'static NetworkDescriptor)> {
        let network = key.parse::<NetworkKey>()?;
        Ok((network, network.descriptor()))
    }

    pub fn list_all(&self) -> Vec<(NetworkKey, &'static NetworkDescriptor)> {
        NetworkKey::ALL
            .into_iter()
            .map(|key| (key, key.descriptor()))
            .collect()
    }

    /// Distinct chain families, in registry order.
    pub fn chain_families(&self) -> Vec<ChainFamily> {
        let mut families = Vec::new();
        for (_, descriptor) in self.list_all() {
            if !families.contains(&descriptor.civic_chain) {
                families.push(descriptor.civic_chain);
            }
        }
        families
    }
}
