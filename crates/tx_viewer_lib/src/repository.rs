use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::ViewerError;
use crate::model::{AddTransactionData, SingleTransactionData, TransactionRecord, TransactionsData};
use crate::queries::*;
use crate::{err_custom_create, err_from};

/// Remote store of confirmed transactions.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// All records, in the order the server returns them.
    async fn fetch_all(&self) -> Result<Vec<TransactionRecord>, ViewerError>;

    async fn fetch_by_hash(&self, hash: &str) -> Result<Option<TransactionRecord>, ViewerError>;

    /// Persists the record and returns the hash the server stored it under.
    async fn save(&self, transaction: &TransactionRecord) -> Result<String, ViewerError>;
}

#[derive(Deserialize, Debug)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

fn join_errors(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub struct GraphQlRepository {
    client: Client,
    endpoint: String,
}

impl GraphQlRepository {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, ViewerError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build().map_err(err_from!())?,
            endpoint: endpoint.to_string(),
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation_name: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, ViewerError> {
        log::debug!("GraphQL {} variables: {}", operation_name, variables);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({
                "operationName": operation_name,
                "query": query,
                "variables": variables,
            }))
            .send()
            .await
            .map_err(err_from!())?;

        let status = response.status();
        let body = response.text().await.map_err(err_from!())?;
        let parsed = serde_json::from_str::<GraphQlResponse<T>>(&body);

        if !status.is_success() {
            let detail = match &parsed {
                Ok(GraphQlResponse {
                    errors: Some(errors),
                    ..
                }) if !errors.is_empty() => join_errors(errors),
                _ => body.clone(),
            };
            log::warn!("GraphQL {} failed with {}: {}", operation_name, status, detail);
            return Err(err_custom_create!(
                "Response not successful: Received status code {}: {}",
                status.as_u16(),
                detail
            ));
        }

        let parsed = parsed.map_err(err_from!())?;
        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            log::warn!("GraphQL {} returned errors: {:?}", operation_name, errors);
            return Err(err_custom_create!("{}", join_errors(&errors)));
        }
        parsed
            .data
            .ok_or_else(|| err_custom_create!("GraphQL {} returned no data", operation_name))
    }
}

#[async_trait]
impl TransactionRepository for GraphQlRepository {
    async fn fetch_all(&self) -> Result<Vec<TransactionRecord>, ViewerError> {
        let data: TransactionsData = self
            .execute(GET_ALL_TRANSACTIONS_NAME, GET_ALL_TRANSACTIONS, json!({}))
            .await?;
        Ok(data.get_all_transactions)
    }

    async fn fetch_by_hash(&self, hash: &str) -> Result<Option<TransactionRecord>, ViewerError> {
        let data: SingleTransactionData = self
            .execute(
                GET_SINGLE_TRANSACTION_NAME,
                GET_SINGLE_TRANSACTION,
                json!({ "hash": hash }),
            )
            .await?;
        Ok(data.get_transaction)
    }

    async fn save(&self, transaction: &TransactionRecord) -> Result<String, ViewerError> {
        let data: AddTransactionData = self
            .execute(
                SAVE_TRANSACTION_NAME,
                SAVE_TRANSACTION,
                json!({ "transaction": transaction }),
            )
            .await?;
        log::info!("Saved transaction {}", data.add_transaction.hash);
        Ok(data.add_transaction.hash)
    }
}
