use secp256k1::{PublicKey, SecretKey};
use sha3::Digest;
use sha3::Keccak256;
use std::str::FromStr;
use web3::transports::Http;
use web3::types::{Address, BlockNumber, U256};
use web3::Web3;

use crate::err_from;
use crate::error::ViewerError;

pub async fn get_transaction_count(
    address: Address,
    web3: &Web3<Http>,
    pending: bool,
) -> Result<U256, web3::Error> {
    let nonce_type = match pending {
        true => BlockNumber::Pending,
        false => BlockNumber::Latest,
    };
    web3.eth().transaction_count(address, Some(nonce_type)).await
}

pub fn get_eth_addr_from_secret(secret_key: &SecretKey) -> Address {
    Address::from_slice(
        &Keccak256::digest(
            &PublicKey::from_secret_key(&secp256k1::Secp256k1::new(), secret_key)
                .serialize_uncompressed()[1..65],
        )
        .as_slice()[12..],
    )
}

/// Parses a hex private key, with or without the `0x` prefix.
pub fn parse_secret_key(key: &str) -> Result<SecretKey, ViewerError> {
    SecretKey::from_str(key.trim().trim_start_matches("0x")).map_err(err_from!())
}

pub fn parse_address(addr: &str) -> Result<Address, ViewerError> {
    Address::from_str(addr.trim().trim_start_matches("0x")).map_err(err_from!())
}
