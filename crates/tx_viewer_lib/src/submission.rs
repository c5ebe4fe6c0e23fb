use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use web3::types::H256;

use crate::error::ViewerError;
use crate::eth::parse_address;
use crate::model::{TransactionPayload, TransactionRecord};
use crate::repository::TransactionRepository;
use crate::router::{transaction_path, Router};
use crate::transaction::{create_eth_transfer, normalize_transaction};
use crate::wallet::ConnectedWallet;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SubmissionState {
    Idle,
    Signing,
    Broadcasting,
    #[serde(rename_all = "camelCase")]
    Confirming { tx_hash: String },
    #[serde(rename_all = "camelCase")]
    Persisting { tx_hash: String },
    #[serde(rename_all = "camelCase")]
    Complete { tx_hash: String, location: String },
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Signing,
    Broadcasting,
    Confirming,
    Persisting,
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionStage::Signing => "signing",
            SubmissionStage::Broadcasting => "broadcasting",
            SubmissionStage::Confirming => "confirming",
            SubmissionStage::Persisting => "persisting",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("no wallet connected")]
    NotConnected,
    #[error("{stage} failed: {source}")]
    Failed {
        stage: SubmissionStage,
        #[source]
        source: ViewerError,
    },
    /// Mined on chain, but the record was not stored. No retry is attempted.
    #[error("transaction {tx_hash} is on chain but was not recorded: {source}")]
    Unrecorded {
        tx_hash: String,
        #[source]
        source: ViewerError,
    },
}

impl SubmissionError {
    pub fn stage(&self) -> SubmissionStage {
        match self {
            SubmissionError::NotConnected => SubmissionStage::Signing,
            SubmissionError::Failed { stage, .. } => *stage,
            SubmissionError::Unrecorded { .. } => SubmissionStage::Persisting,
        }
    }
}

fn failed(stage: SubmissionStage) -> impl FnOnce(ViewerError) -> SubmissionError {
    move |source| SubmissionError::Failed { stage, source }
}

/// Observable submission state shared with every front end.
#[derive(Clone)]
pub struct SubmissionStatus {
    sender: Arc<watch::Sender<SubmissionState>>,
}

impl SubmissionStatus {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(SubmissionState::Idle);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn get(&self) -> SubmissionState {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.sender.subscribe()
    }

    fn set(&self, state: SubmissionState) {
        log::debug!("Submission state: {:?}", state);
        self.sender.send_replace(state);
    }
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SubmissionFlow {
    repository: Arc<dyn TransactionRepository>,
    router: Arc<Router>,
    status: SubmissionStatus,
}

impl SubmissionFlow {
    pub fn new(
        repository: Arc<dyn TransactionRepository>,
        router: Arc<Router>,
        status: SubmissionStatus,
    ) -> Self {
        Self {
            repository,
            router,
            status,
        }
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    /// Sends `payload` from the connected wallet, waits until it is mined, stores the
    /// record and navigates to its detail route.
    ///
    /// Every failure ends the attempt and puts the state back to `Idle`.
    pub async fn submit(
        &self,
        wallet: Option<&ConnectedWallet>,
        payload: &TransactionPayload,
    ) -> Result<TransactionRecord, SubmissionError> {
        let started = chrono::Utc::now();
        match self.run(wallet, payload).await {
            Ok(record) => {
                log::info!(
                    "Transaction {} recorded in {} ms",
                    record.hash,
                    (chrono::Utc::now() - started).num_milliseconds()
                );
                Ok(record)
            }
            Err(err) => {
                log::error!("Send transaction failed at {}: {}", err.stage(), err);
                self.status.set(SubmissionState::Idle);
                Err(err)
            }
        }
    }

    /// Same as [`submit`](Self::submit), calling `on_state` for every state change up to
    /// and including the final one.
    pub async fn submit_reporting<F>(
        &self,
        wallet: Option<&ConnectedWallet>,
        payload: &TransactionPayload,
        mut on_state: F,
    ) -> Result<TransactionRecord, SubmissionError>
    where
        F: FnMut(&SubmissionState),
    {
        let mut status = self.status.subscribe();
        let submit = self.submit(wallet, payload);
        tokio::pin!(submit);
        let result = loop {
            tokio::select! {
                result = &mut submit => break result,
                Ok(()) = status.changed() => on_state(&*status.borrow_and_update()),
            }
        };
        if status.has_changed().unwrap_or(false) {
            on_state(&*status.borrow_and_update());
        }
        result
    }

    async fn run(
        &self,
        wallet: Option<&ConnectedWallet>,
        payload: &TransactionPayload,
    ) -> Result<TransactionRecord, SubmissionError> {
        self.status.set(SubmissionState::Signing);
        let wallet = wallet.ok_or(SubmissionError::NotConnected)?;
        let recipient =
            parse_address(&payload.recipient).map_err(failed(SubmissionStage::Signing))?;
        let transfer = create_eth_transfer(recipient, &payload.amount)
            .map_err(failed(SubmissionStage::Signing))?;
        log::info!(
            "Sending {} wei from {:#x} to {:#x}",
            transfer.value,
            wallet.address,
            transfer.to
        );

        self.status.set(SubmissionState::Broadcasting);
        let tx_hash: H256 = wallet
            .provider
            .send_transfer(wallet.address, &transfer)
            .await
            .map_err(failed(SubmissionStage::Broadcasting))?;
        let tx_hash_str = format!("{:#x}", tx_hash);
        log::info!("Transaction sent, tx hash: {}", tx_hash_str);

        self.status.set(SubmissionState::Confirming {
            tx_hash: tx_hash_str.clone(),
        });
        let confirmed = wallet
            .provider
            .wait_for_confirmation(tx_hash)
            .await
            .map_err(failed(SubmissionStage::Confirming))?;

        self.status.set(SubmissionState::Persisting {
            tx_hash: tx_hash_str.clone(),
        });
        let unrecorded = |source| SubmissionError::Unrecorded {
            tx_hash: tx_hash_str.clone(),
            source,
        };
        let record = normalize_transaction(&confirmed).map_err(unrecorded)?;
        self.repository.save(&record).await.map_err(unrecorded)?;

        let location = transaction_path(&record.hash);
        self.router.navigate(&location);
        self.status.set(SubmissionState::Complete {
            tx_hash: record.hash.clone(),
            location,
        });
        Ok(record)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::err_custom_create;
    use crate::model::{ConfirmedTransaction, TransferRequest};
    use crate::router::Route;
    use crate::wallet::WalletProvider;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use web3::types::{Address, U256};

    pub const SENDER: &str = "0x00000000000000000000000000000000000000aa";
    pub const RECIPIENT: &str = "0x00000000000000000000000000000000000000bb";

    /// Wallet that "mines" every transfer instantly and records what it saw.
    pub struct FakeWallet {
        pub status: Option<watch::Receiver<SubmissionState>>,
        pub transfers: Mutex<Vec<TransferRequest>>,
        pub observed: Mutex<Vec<SubmissionState>>,
        pub fail_broadcast: bool,
        pub fail_accounts: bool,
    }

    impl FakeWallet {
        pub fn new(status: Option<watch::Receiver<SubmissionState>>) -> Self {
            Self {
                status,
                transfers: Mutex::new(vec![]),
                observed: Mutex::new(vec![]),
                fail_broadcast: false,
                fail_accounts: false,
            }
        }

        fn observe(&self) {
            if let Some(status) = &self.status {
                self.observed.lock().unwrap().push(status.borrow().clone());
            }
        }
    }

    pub fn hash_of(transfer: &TransferRequest) -> H256 {
        H256::from_low_u64_be(transfer.value.low_u64() ^ 0x5eed)
    }

    #[async_trait]
    impl WalletProvider for FakeWallet {
        fn label(&self) -> &str {
            "fake"
        }

        async fn accounts(&self) -> Result<Vec<Address>, ViewerError> {
            if self.fail_accounts {
                return Err(err_custom_create!("User rejected the request."));
            }
            Ok(vec![parse_address(SENDER)?])
        }

        async fn send_transfer(
            &self,
            _from: Address,
            transfer: &TransferRequest,
        ) -> Result<H256, ViewerError> {
            self.observe();
            if self.fail_broadcast {
                return Err(err_custom_create!("User denied transaction signature"));
            }
            self.transfers.lock().unwrap().push(transfer.clone());
            Ok(hash_of(transfer))
        }

        async fn wait_for_confirmation(
            &self,
            tx_hash: H256,
        ) -> Result<ConfirmedTransaction, ViewerError> {
            self.observe();
            let transfers = self.transfers.lock().unwrap();
            let transfer = transfers
                .iter()
                .find(|t| hash_of(t) == tx_hash)
                .ok_or_else(|| err_custom_create!("unknown tx"))?;
            Ok(ConfirmedTransaction {
                hash: tx_hash,
                from: Some(parse_address(SENDER)?),
                to: Some(transfer.to),
                value: Some(transfer.value),
                gas_limit: Some(U256::from(21000)),
                gas_price: Some(U256::from(2_000_000_000u64)),
                data: None,
                chain_id: None,
                block_number: Some(1),
            })
        }
    }

    /// In-memory repository keeping insertion order.
    pub struct FakeRepository {
        pub records: Mutex<Vec<TransactionRecord>>,
        pub status: Option<watch::Receiver<SubmissionState>>,
        pub observed: Mutex<Vec<SubmissionState>>,
        pub fail: Option<String>,
    }

    impl FakeRepository {
        pub fn new(records: Vec<TransactionRecord>) -> Self {
            Self {
                records: Mutex::new(records),
                status: None,
                observed: Mutex::new(vec![]),
                fail: None,
            }
        }
    }

    #[async_trait]
    impl TransactionRepository for FakeRepository {
        async fn fetch_all(&self) -> Result<Vec<TransactionRecord>, ViewerError> {
            if let Some(msg) = &self.fail {
                return Err(err_custom_create!("{}", msg));
            }
            Ok(self.records.lock().unwrap().clone())
        }

        async fn fetch_by_hash(
            &self,
            hash: &str,
        ) -> Result<Option<TransactionRecord>, ViewerError> {
            if let Some(msg) = &self.fail {
                return Err(err_custom_create!("{}", msg));
            }
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.hash == hash)
                .cloned())
        }

        async fn save(&self, transaction: &TransactionRecord) -> Result<String, ViewerError> {
            if let Some(status) = &self.status {
                self.observed.lock().unwrap().push(status.borrow().clone());
            }
            if let Some(msg) = &self.fail {
                return Err(err_custom_create!("{}", msg));
            }
            self.records.lock().unwrap().push(transaction.clone());
            Ok(transaction.hash.clone())
        }
    }

    fn payload(amount: &str) -> TransactionPayload {
        TransactionPayload {
            recipient: RECIPIENT.to_string(),
            amount: amount.to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_persists_and_navigates() {
        let status = SubmissionStatus::new();
        let wallet_provider = Arc::new(FakeWallet::new(Some(status.subscribe())));
        let mut repository = FakeRepository::new(vec![]);
        repository.status = Some(status.subscribe());
        let repository = Arc::new(repository);
        let router = Arc::new(Router::default());
        let flow = SubmissionFlow::new(repository.clone(), router.clone(), status.clone());

        let wallet = ConnectedWallet {
            address: parse_address(SENDER).unwrap(),
            provider: wallet_provider.clone(),
        };
        let record = flow.submit(Some(&wallet), &payload("2")).await.unwrap();

        let transfers = wallet_provider.transfers.lock().unwrap().clone();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].value.to_string(), "2000000000000000000");
        assert_eq!(format!("{:#x}", transfers[0].to), RECIPIENT);

        assert_eq!(record.value, "2000000000000000000");
        assert_eq!(record.from, SENDER);
        assert_eq!(record.to, RECIPIENT);
        assert_eq!(record.chain_id, "123456");
        assert_eq!(record.gas_limit, "21000");
        assert_eq!(*repository.records.lock().unwrap(), vec![record.clone()]);

        let location = format!("/transaction/{}", record.hash);
        assert_eq!(router.location(), location);
        assert_eq!(router.current(), Route::Transaction(record.hash.clone()));
        assert_eq!(
            status.get(),
            SubmissionState::Complete {
                tx_hash: record.hash.clone(),
                location,
            }
        );

        assert_eq!(
            *wallet_provider.observed.lock().unwrap(),
            vec![
                SubmissionState::Broadcasting,
                SubmissionState::Confirming {
                    tx_hash: record.hash.clone()
                },
            ]
        );
        assert_eq!(
            *repository.observed.lock().unwrap(),
            vec![SubmissionState::Persisting {
                tx_hash: record.hash.clone()
            }]
        );
    }

    #[tokio::test]
    async fn test_submit_without_wallet() {
        let status = SubmissionStatus::new();
        let repository = Arc::new(FakeRepository::new(vec![]));
        let flow = SubmissionFlow::new(repository.clone(), Arc::new(Router::default()), status);

        let err = flow.submit(None, &payload("1")).await.unwrap_err();
        assert!(matches!(err, SubmissionError::NotConnected));
        assert_eq!(flow.status().get(), SubmissionState::Idle);
        assert!(repository.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_reporting_ends_with_final_state() {
        let flow = SubmissionFlow::new(
            Arc::new(FakeRepository::new(vec![])),
            Arc::new(Router::default()),
            SubmissionStatus::new(),
        );
        let wallet = ConnectedWallet {
            address: parse_address(SENDER).unwrap(),
            provider: Arc::new(FakeWallet::new(None)),
        };

        let mut reported = vec![];
        let record = flow
            .submit_reporting(Some(&wallet), &payload("1"), |state| {
                reported.push(state.clone())
            })
            .await
            .unwrap();
        assert_eq!(
            reported.last(),
            Some(&SubmissionState::Complete {
                tx_hash: record.hash.clone(),
                location: format!("/transaction/{}", record.hash),
            })
        );

        let mut reported = vec![];
        let err = flow
            .submit_reporting(None, &payload("1"), |state| reported.push(state.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::NotConnected));
        assert_eq!(reported.last(), Some(&SubmissionState::Idle));
    }

    #[tokio::test]
    async fn test_invalid_amount_fails_at_signing() {
        let flow = SubmissionFlow::new(
            Arc::new(FakeRepository::new(vec![])),
            Arc::new(Router::default()),
            SubmissionStatus::new(),
        );
        let provider = Arc::new(FakeWallet::new(None));
        let wallet = ConnectedWallet {
            address: parse_address(SENDER).unwrap(),
            provider: provider.clone(),
        };
        let err = flow.submit(Some(&wallet), &payload("-3")).await.unwrap_err();
        assert_eq!(err.stage(), SubmissionStage::Signing);
        assert!(provider.transfers.lock().unwrap().is_empty());
        assert_eq!(flow.status().get(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_rejected_signature_resets_to_idle() {
        let router = Arc::new(Router::default());
        let flow = SubmissionFlow::new(
            Arc::new(FakeRepository::new(vec![])),
            router.clone(),
            SubmissionStatus::new(),
        );
        let mut provider = FakeWallet::new(None);
        provider.fail_broadcast = true;
        let wallet = ConnectedWallet {
            address: parse_address(SENDER).unwrap(),
            provider: Arc::new(provider),
        };
        let err = flow.submit(Some(&wallet), &payload("1")).await.unwrap_err();
        assert_eq!(err.stage(), SubmissionStage::Broadcasting);
        assert!(err.to_string().contains("User denied"));
        assert_eq!(flow.status().get(), SubmissionState::Idle);
        assert_eq!(router.current(), Route::List);
    }

    #[tokio::test]
    async fn test_persist_failure_reports_unrecorded_hash() {
        let mut repository = FakeRepository::new(vec![]);
        repository.fail = Some("Response not successful: Received status code 400".to_string());
        let router = Arc::new(Router::default());
        let flow = SubmissionFlow::new(
            Arc::new(repository),
            router.clone(),
            SubmissionStatus::new(),
        );
        let provider = Arc::new(FakeWallet::new(None));
        let wallet = ConnectedWallet {
            address: parse_address(SENDER).unwrap(),
            provider: provider.clone(),
        };

        let err = flow.submit(Some(&wallet), &payload("1")).await.unwrap_err();
        let transfers = provider.transfers.lock().unwrap().clone();
        match err {
            SubmissionError::Unrecorded { tx_hash, .. } => {
                assert_eq!(tx_hash, format!("{:#x}", hash_of(&transfers[0])));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(flow.status().get(), SubmissionState::Idle);
        assert_eq!(router.current(), Route::List);
    }

    #[test]
    fn test_state_serialization() {
        let state = SubmissionState::Confirming {
            tx_hash: "0x01".to_string(),
        };
        assert_eq!(
            serde_json::to_value(state).unwrap(),
            serde_json::json!({ "state": "confirming", "txHash": "0x01" })
        );
        assert_eq!(
            serde_json::to_value(SubmissionState::Idle).unwrap(),
            serde_json::json!({ "state": "idle" })
        );
    }
}
