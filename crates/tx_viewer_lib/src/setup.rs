use secp256k1::SecretKey;
use std::time::Duration;
use web3::transports::Http;
use web3::Web3;

use crate::config::{Config, SignerKind};
use crate::err_custom_create;
use crate::error::ViewerError;
use crate::wallet::{Signer, Web3Wallet};

#[derive(Clone, Debug)]
pub struct ChainSetup {
    pub provider: Web3<Http>,
    pub chain_id: u64,
    pub label: String,
    pub currency_symbol: String,
}

/// Client handles created once at start-up and passed to the components that use them.
#[derive(Clone, Debug)]
pub struct AppSetup {
    pub chain_setup: ChainSetup,
    pub graphql_endpoint: String,
    pub request_timeout: Option<Duration>,
    pub signer: SignerKind,
    pub poll_interval: Duration,
    pub confirmation_blocks: u64,
    pub listen: String,
}

impl AppSetup {
    pub fn new(config: &Config) -> Result<Self, ViewerError> {
        let endp = &config.chain.rpc_endpoint;
        let Ok(transport) = Http::new(endp) else {
            return Err(err_custom_create!("Failed to create transport for endpoint: {}", endp));
        };
        Ok(AppSetup {
            chain_setup: ChainSetup {
                provider: Web3::new(transport),
                chain_id: config.chain.network_id,
                label: config
                    .chain
                    .label
                    .clone()
                    .unwrap_or_else(|| format!("Chain {}", config.chain.network_id)),
                currency_symbol: config
                    .chain
                    .currency_symbol
                    .clone()
                    .unwrap_or_else(|| "ETH".to_string()),
            },
            graphql_endpoint: config.api.graphql_endpoint.clone(),
            request_timeout: config.api.request_timeout.map(Duration::from_secs),
            signer: config.wallet.signer,
            poll_interval: Duration::from_secs(config.wallet.poll_interval.max(1)),
            confirmation_blocks: config.wallet.confirmation_blocks,
            listen: config.server.listen.clone(),
        })
    }

    /// Wallet over the configured provider. `local-key` requires `secret_key`.
    pub fn create_wallet(&self, secret_key: Option<SecretKey>) -> Result<Web3Wallet, ViewerError> {
        let signer = match (self.signer, secret_key) {
            (SignerKind::Node, _) => Signer::Node,
            (SignerKind::LocalKey, Some(sk)) => Signer::LocalKey(sk),
            (SignerKind::LocalKey, None) => {
                return Err(err_custom_create!(
                    "Signer local-key requires ETH_PRIVATE_KEY to be set"
                ))
            }
        };
        Ok(Web3Wallet::new(
            self.chain_setup.provider.clone(),
            &self.chain_setup.label,
            signer,
            self.chain_setup.chain_id,
            self.poll_interval,
            self.confirmation_blocks,
        ))
    }
}
