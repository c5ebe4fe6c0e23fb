use serde::{Deserialize, Deserializer, Serialize};
use web3::types::{Address, H256, U256};

use crate::config::DEFAULT_CHAIN_ID;

fn zero() -> String {
    "0".to_string()
}

fn default_chain_id() -> String {
    DEFAULT_CHAIN_ID.to_string()
}

fn zero_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(zero))
}

fn empty_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn chain_id_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_chain_id))
}

/// A confirmed transfer as stored by the GraphQL API.
///
/// Numeric fields stay decimal strings end to end; values of 10^18 and above do not
/// survive a round trip through floating point. Numeric fields the server leaves out
/// or returns as `null` read as their defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(default = "zero", deserialize_with = "zero_if_null")]
    pub gas_limit: String,
    #[serde(default = "zero", deserialize_with = "zero_if_null")]
    pub gas_price: String,
    pub to: String,
    pub from: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub value: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default = "default_chain_id", deserialize_with = "chain_id_if_null")]
    pub chain_id: String,
    pub hash: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsData {
    pub get_all_transactions: Vec<TransactionRecord>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SingleTransactionData {
    pub get_transaction: Option<TransactionRecord>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SavedHash {
    pub hash: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddTransactionData {
    pub add_transaction: SavedHash,
}

/// User input of the send form. `amount` is in whole native units.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TransactionPayload {
    pub recipient: String,
    pub amount: String,
}

/// Native currency transfer handed to the signer, `value` in smallest units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub to: Address,
    pub value: U256,
}

/// On-chain fields of a mined transaction.
#[derive(Debug, Clone, Default)]
pub struct ConfirmedTransaction {
    pub hash: H256,
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub value: Option<U256>,
    pub gas_limit: Option<U256>,
    pub gas_price: Option<U256>,
    pub data: Option<Vec<u8>>,
    pub chain_id: Option<u64>,
    pub block_number: Option<u64>,
}
