use secp256k1::SecretKey;
use std::sync::Arc;

use crate::config::Config;
use crate::error::ViewerError;
use crate::repository::{GraphQlRepository, TransactionRepository};
use crate::router::Router;
use crate::setup::AppSetup;
use crate::submission::{SubmissionFlow, SubmissionStatus};
use crate::wallet::{WalletConnector, WalletProvider};

pub struct AppRuntime {
    pub setup: AppSetup,
    pub repository: Arc<dyn TransactionRepository>,
    pub connector: WalletConnector,
    pub router: Arc<Router>,
    pub flow: Arc<SubmissionFlow>,
}

impl AppRuntime {
    pub fn new(
        setup: AppSetup,
        repository: Arc<dyn TransactionRepository>,
        wallet: Arc<dyn WalletProvider>,
    ) -> Self {
        let router = Arc::new(Router::default());
        let flow = Arc::new(SubmissionFlow::new(
            repository.clone(),
            router.clone(),
            SubmissionStatus::new(),
        ));
        AppRuntime {
            setup,
            repository,
            connector: WalletConnector::new(wallet),
            router,
            flow,
        }
    }

    pub fn currency_symbol(&self) -> &str {
        &self.setup.chain_setup.currency_symbol
    }
}

pub fn start_app(config: &Config, secret_key: Option<SecretKey>) -> Result<AppRuntime, ViewerError> {
    let setup = AppSetup::new(config)?;
    log::debug!("Starting transaction viewer: {:#?}", setup);
    log::info!(
        "Using chain {} ({}) at {}, GraphQL API at {}",
        setup.chain_setup.label,
        setup.chain_setup.chain_id,
        config.chain.rpc_endpoint,
        setup.graphql_endpoint
    );
    let repository = Arc::new(GraphQlRepository::new(
        &setup.graphql_endpoint,
        setup.request_timeout,
    )?);
    let wallet = Arc::new(setup.create_wallet(secret_key)?);
    Ok(AppRuntime::new(setup, repository, wallet))
}
