use async_trait::async_trait;
use secp256k1::SecretKey;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use web3::transports::Http;
use web3::types::{Address, H256};
use web3::Web3;

use crate::err_from;
use crate::error::ViewerError;
use crate::eth::get_eth_addr_from_secret;
use crate::model::{ConfirmedTransaction, TransferRequest};
use crate::transaction::{
    create_local_transaction, fetch_confirmed, send_signed_transaction, sign_transaction,
    transfer_to_request, wait_for_receipt,
};

/// Account source and signing capability behind a connected wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn label(&self) -> &str;

    async fn accounts(&self) -> Result<Vec<Address>, ViewerError>;

    /// Signs and broadcasts the transfer, returning the pending transaction hash.
    async fn send_transfer(
        &self,
        from: Address,
        transfer: &TransferRequest,
    ) -> Result<H256, ViewerError>;

    /// Resolves once the transaction is mined.
    async fn wait_for_confirmation(
        &self,
        tx_hash: H256,
    ) -> Result<ConfirmedTransaction, ViewerError>;
}

pub enum Signer {
    Node,
    LocalKey(SecretKey),
}

pub struct Web3Wallet {
    web3: Web3<Http>,
    label: String,
    signer: Signer,
    chain_id: u64,
    poll_interval: Duration,
    confirmation_blocks: u64,
}

impl Web3Wallet {
    pub fn new(
        web3: Web3<Http>,
        label: &str,
        signer: Signer,
        chain_id: u64,
        poll_interval: Duration,
        confirmation_blocks: u64,
    ) -> Self {
        Self {
            web3,
            label: label.to_string(),
            signer,
            chain_id,
            poll_interval,
            confirmation_blocks,
        }
    }
}

#[async_trait]
impl WalletProvider for Web3Wallet {
    fn label(&self) -> &str {
        &self.label
    }

    async fn accounts(&self) -> Result<Vec<Address>, ViewerError> {
        match &self.signer {
            Signer::Node => self.web3.eth().accounts().await.map_err(err_from!()),
            Signer::LocalKey(secret_key) => Ok(vec![get_eth_addr_from_secret(secret_key)]),
        }
    }

    async fn send_transfer(
        &self,
        from: Address,
        transfer: &TransferRequest,
    ) -> Result<H256, ViewerError> {
        match &self.signer {
            Signer::Node => self
                .web3
                .eth()
                .send_transaction(transfer_to_request(from, transfer))
                .await
                .map_err(err_from!()),
            Signer::LocalKey(secret_key) => {
                let tx_object =
                    create_local_transaction(&self.web3, from, transfer, self.chain_id).await?;
                let signed = sign_transaction(&self.web3, from, tx_object, secret_key).await?;
                send_signed_transaction(&self.web3, signed).await
            }
        }
    }

    async fn wait_for_confirmation(
        &self,
        tx_hash: H256,
    ) -> Result<ConfirmedTransaction, ViewerError> {
        let receipt = wait_for_receipt(
            &self.web3,
            tx_hash,
            self.poll_interval,
            self.confirmation_blocks,
        )
        .await?;
        fetch_confirmed(&self.web3, &receipt, self.chain_id).await
    }
}

/// Active identity plus the provider able to sign for it.
#[derive(Clone)]
pub struct ConnectedWallet {
    pub address: Address,
    pub provider: Arc<dyn WalletProvider>,
}

impl fmt::Debug for ConnectedWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectedWallet")
            .field("address", &self.address)
            .field("provider", &self.provider.label())
            .finish()
    }
}

#[derive(Clone)]
pub struct WalletConnector {
    provider: Arc<dyn WalletProvider>,
}

impl WalletConnector {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self { provider }
    }

    /// Only the first account becomes the active identity. `None` when the provider
    /// exposes no account.
    pub async fn connect(&self) -> Result<Option<ConnectedWallet>, ViewerError> {
        let accounts = self.provider.accounts().await?;
        match accounts.first() {
            Some(address) => {
                log::info!(
                    "Connected {} wallet, active account {:#x}",
                    self.provider.label(),
                    address
                );
                Ok(Some(ConnectedWallet {
                    address: *address,
                    provider: self.provider.clone(),
                }))
            }
            None => {
                log::warn!("No account exposed by {} wallet", self.provider.label());
                Ok(None)
            }
        }
    }
}
