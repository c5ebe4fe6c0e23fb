use secp256k1::SecretKey;
use std::time::Duration;
use web3::transports::Http;
use web3::types::{
    Address, Bytes, CallRequest, SignedTransaction, TransactionId, TransactionParameters,
    TransactionReceipt, TransactionRequest, H256, U256,
};
use web3::Web3;

use crate::config::DEFAULT_CHAIN_ID;
use crate::error::{TransactionFailedError, ViewerError};
use crate::eth::{get_eth_addr_from_secret, get_transaction_count};
use crate::model::{ConfirmedTransaction, TransactionRecord, TransferRequest};
use crate::utils::to_smallest_units;
use crate::{err_create, err_custom_create, err_from};

/// Builds a native currency transfer of `amount` whole units.
pub fn create_eth_transfer(to: Address, amount: &str) -> Result<TransferRequest, ViewerError> {
    Ok(TransferRequest {
        to,
        value: to_smallest_units(amount).map_err(err_from!())?,
    })
}

/// Request for `eth_sendTransaction`, signed by an account the provider manages.
pub fn transfer_to_request(from: Address, transfer: &TransferRequest) -> TransactionRequest {
    TransactionRequest {
        from,
        to: Some(transfer.to),
        gas: None,
        gas_price: None,
        value: Some(transfer.value),
        data: None,
        nonce: None,
        condition: None,
        transaction_type: None,
        access_list: None,
        max_fee_per_gas: None,
        max_priority_fee_per_gas: None,
    }
}

pub async fn create_local_transaction(
    web3: &Web3<Http>,
    from: Address,
    transfer: &TransferRequest,
    chain_id: u64,
) -> Result<TransactionParameters, ViewerError> {
    let nonce = get_transaction_count(from, web3, true)
        .await
        .map_err(err_from!())?;
    let call_request = CallRequest {
        from: Some(from),
        to: Some(transfer.to),
        gas: None,
        gas_price: None,
        value: Some(transfer.value),
        data: None,
        transaction_type: None,
        access_list: None,
        max_fee_per_gas: None,
        max_priority_fee_per_gas: None,
    };
    let gas = web3
        .eth()
        .estimate_gas(call_request, None)
        .await
        .map_err(err_from!())?;
    let gas_price = web3.eth().gas_price().await.map_err(err_from!())?;
    log::debug!("Estimated gas {} at price {} for nonce {}", gas, gas_price, nonce);
    Ok(TransactionParameters {
        nonce: Some(nonce),
        to: Some(transfer.to),
        gas,
        gas_price: Some(gas_price),
        value: transfer.value,
        data: Bytes::default(),
        chain_id: Some(chain_id),
        transaction_type: None,
        access_list: None,
        max_fee_per_gas: None,
        max_priority_fee_per_gas: None,
    })
}

pub async fn sign_transaction(
    web3: &Web3<Http>,
    from: Address,
    tx_object: TransactionParameters,
    secret_key: &SecretKey,
) -> Result<SignedTransaction, ViewerError> {
    let public_addr = get_eth_addr_from_secret(secret_key);
    if from != public_addr {
        return Err(err_custom_create!(
            "From addr not match with secret key {:#x} != {:#x}",
            from,
            public_addr
        ));
    }
    log::debug!("Signing transaction: {:#?}", tx_object);
    let signed = web3
        .accounts()
        .sign_transaction(tx_object, secret_key)
        .await
        .map_err(err_from!())?;
    log::debug!(
        "Transaction signed successfully: {:#x}",
        signed.transaction_hash
    );
    Ok(signed)
}

pub async fn send_signed_transaction(
    web3: &Web3<Http>,
    signed: SignedTransaction,
) -> Result<H256, ViewerError> {
    let expected = signed.transaction_hash;
    let tx_hash = web3
        .eth()
        .send_raw_transaction(signed.raw_transaction)
        .await
        .map_err(err_from!())?;
    if tx_hash != expected {
        log::warn!(
            "Node returned hash {:#x}, locally computed {:#x}",
            tx_hash,
            expected
        );
    }
    Ok(tx_hash)
}

pub async fn find_receipt(
    web3: &Web3<Http>,
    tx_hash: H256,
) -> Result<Option<TransactionReceipt>, ViewerError> {
    web3.eth()
        .transaction_receipt(tx_hash)
        .await
        .map_err(err_from!())
}

/// Polls until the transaction is mined with `confirmation_blocks` blocks on top.
///
/// There is no timeout, the wait ends only when the node reports the receipt or an
/// RPC call fails.
pub async fn wait_for_receipt(
    web3: &Web3<Http>,
    tx_hash: H256,
    poll_interval: Duration,
    confirmation_blocks: u64,
) -> Result<TransactionReceipt, ViewerError> {
    loop {
        if let Some(receipt) = find_receipt(web3, tx_hash).await? {
            let block_number = receipt
                .block_number
                .ok_or_else(|| err_custom_create!("Block number not found on receipt"))?
                .as_u64();
            let current_block_number = if confirmation_blocks == 0 {
                block_number
            } else {
                web3.eth()
                    .block_number()
                    .await
                    .map_err(err_from!())?
                    .as_u64()
            };
            if block_number + confirmation_blocks <= current_block_number {
                log::info!(
                    "Transaction confirmed: tx_hash: {:#x} block: {}",
                    tx_hash,
                    block_number
                );
                if receipt.status.map(|s| s.as_u64()) == Some(0) {
                    return Err(err_create!(TransactionFailedError::new(&format!(
                        "{:#x} reverted in block {}",
                        tx_hash, block_number
                    ))));
                }
                return Ok(receipt);
            }
            log::info!(
                "Waiting for confirmations: tx: {:#x}. Current block {}, expected at least: {}",
                tx_hash,
                current_block_number,
                block_number + confirmation_blocks
            );
        } else {
            log::debug!("Receipt not found: {:#x}", tx_hash);
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Reads the finalized transaction after its receipt is available.
pub async fn fetch_confirmed(
    web3: &Web3<Http>,
    receipt: &TransactionReceipt,
    chain_id: u64,
) -> Result<ConfirmedTransaction, ViewerError> {
    let tx_hash = receipt.transaction_hash;
    let tx = web3
        .eth()
        .transaction(TransactionId::Hash(tx_hash))
        .await
        .map_err(err_from!())?
        .ok_or_else(|| err_custom_create!("Mined transaction {:#x} not found", tx_hash))?;
    Ok(ConfirmedTransaction {
        hash: tx.hash,
        from: tx.from,
        to: tx.to,
        value: Some(tx.value),
        gas_limit: Some(tx.gas),
        gas_price: tx.gas_price.or(receipt.effective_gas_price),
        data: Some(tx.input.0),
        chain_id: Some(chain_id),
        block_number: tx.block_number.map(|n| n.as_u64()),
    })
}

fn non_zero(value: Option<U256>) -> Option<U256> {
    value.filter(|v| !v.is_zero())
}

/// Converts on-chain fields into the stored record, every number as a decimal string.
pub fn normalize_transaction(
    confirmed: &ConfirmedTransaction,
) -> Result<TransactionRecord, ViewerError> {
    let to = confirmed
        .to
        .ok_or_else(|| err_custom_create!("Transaction {:#x} has no recipient", confirmed.hash))?;
    let from = confirmed
        .from
        .ok_or_else(|| err_custom_create!("Transaction {:#x} has no sender", confirmed.hash))?;
    Ok(TransactionRecord {
        gas_limit: non_zero(confirmed.gas_limit)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "0".to_string()),
        gas_price: non_zero(confirmed.gas_price)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "0".to_string()),
        to: format!("{:#x}", to),
        from: format!("{:#x}", from),
        value: non_zero(confirmed.value)
            .map(|v| v.to_string())
            .unwrap_or_default(),
        data: confirmed
            .data
            .as_ref()
            .filter(|d| !d.is_empty())
            .map(|d| format!("0x{}", hex::encode(d))),
        chain_id: confirmed
            .chain_id
            .filter(|id| *id != 0)
            .unwrap_or(DEFAULT_CHAIN_ID)
            .to_string(),
        hash: format!("{:#x}", confirmed.hash),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eth::parse_address;

    fn confirmed() -> ConfirmedTransaction {
        ConfirmedTransaction {
            hash: H256::from_low_u64_be(0xabcdef),
            from: Some(Address::from_low_u64_be(0xa)),
            to: Some(Address::from_low_u64_be(0xb)),
            value: Some(U256::exp10(18) * U256::from(2)),
            gas_limit: Some(U256::from(21000)),
            gas_price: Some(U256::from(20_000_000_000u64)),
            data: Some(vec![]),
            chain_id: Some(1337),
            block_number: Some(7),
        }
    }

    #[test]
    fn test_create_eth_transfer_uses_fixed_multiplier() {
        let to = parse_address("0x00000000000000000000000000000000000000bb").unwrap();
        let transfer = create_eth_transfer(to, "2").unwrap();
        assert_eq!(transfer.to, to);
        assert_eq!(transfer.value.to_string(), "2000000000000000000");
        assert!(create_eth_transfer(to, "-2").is_err());
    }

    #[test]
    fn test_transfer_to_request() {
        let from = Address::from_low_u64_be(0xa);
        let transfer = TransferRequest {
            to: Address::from_low_u64_be(0xb),
            value: U256::exp10(18),
        };
        let request = transfer_to_request(from, &transfer);
        assert_eq!(request.from, from);
        assert_eq!(request.to, Some(transfer.to));
        assert_eq!(request.value, Some(U256::exp10(18)));
        assert!(request.data.is_none());
    }

    #[test]
    fn test_normalize_transaction() {
        let record = normalize_transaction(&confirmed()).unwrap();
        assert_eq!(record.gas_limit, "21000");
        assert_eq!(record.gas_price, "20000000000");
        assert_eq!(record.value, "2000000000000000000");
        assert_eq!(record.to, "0x000000000000000000000000000000000000000b");
        assert_eq!(record.from, "0x000000000000000000000000000000000000000a");
        assert_eq!(record.data, None);
        assert_eq!(record.chain_id, "1337");
        assert_eq!(
            record.hash,
            "0x0000000000000000000000000000000000000000000000000000000000abcdef"
        );
    }

    #[test]
    fn test_normalize_transaction_defaults() {
        let confirmed = ConfirmedTransaction {
            value: Some(U256::zero()),
            gas_limit: None,
            gas_price: Some(U256::zero()),
            data: Some(vec![0xde, 0xad]),
            chain_id: None,
            ..confirmed()
        };
        let record = normalize_transaction(&confirmed).unwrap();
        assert_eq!(record.gas_limit, "0");
        assert_eq!(record.gas_price, "0");
        assert_eq!(record.value, "");
        assert_eq!(record.data.as_deref(), Some("0xdead"));
        assert_eq!(record.chain_id, "123456");
    }

    #[test]
    fn test_normalize_requires_recipient() {
        let confirmed = ConfirmedTransaction {
            to: None,
            ..confirmed()
        };
        assert!(normalize_transaction(&confirmed).is_err());
    }
}
