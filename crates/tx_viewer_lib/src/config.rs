use serde::Deserialize;

use std::fs;
use std::path::Path;

use crate::error::ViewerError;
use crate::err_from;

pub const DEFAULT_CHAIN_ID: u64 = 123456;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub chain: Chain,
    pub api: Api,
    #[serde(default)]
    pub wallet: Wallet,
    #[serde(default)]
    pub server: Server,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Chain {
    pub network_id: u64,
    pub label: Option<String>,
    pub currency_symbol: Option<String>,
    pub rpc_endpoint: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Api {
    pub graphql_endpoint: String,
    /// Seconds, applied to every GraphQL request.
    pub request_timeout: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SignerKind {
    /// Accounts are managed and unlocked by the RPC provider.
    Node,
    /// Key is read from `ETH_PRIVATE_KEY` and transactions are signed locally.
    LocalKey,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Wallet {
    pub signer: SignerKind,
    pub poll_interval: u64,
    pub confirmation_blocks: u64,
}

impl Default for Wallet {
    fn default() -> Self {
        Wallet {
            signer: SignerKind::Node,
            poll_interval: 1,
            confirmation_blocks: 0,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Server {
    pub listen: String,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            listen: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ViewerError> {
        Self::from_toml(&fs::read_to_string(path).map_err(err_from!())?)
    }

    pub fn from_toml(content: &str) -> Result<Self, ViewerError> {
        toml::from_str(content).map_err(err_from!())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chain: Chain {
                network_id: DEFAULT_CHAIN_ID,
                label: Some("Local Ganache".to_string()),
                currency_symbol: Some("ETH".to_string()),
                rpc_endpoint: "http://localhost:8545".to_string(),
            },
            api: Api {
                graphql_endpoint: "http://localhost:4000/graphql".to_string(),
                request_timeout: None,
            },
            wallet: Wallet::default(),
            server: Server::default(),
        }
    }
}
