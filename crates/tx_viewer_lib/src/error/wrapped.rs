use thiserror::Error;

#[derive(Error, Debug)]
pub enum WrappedError {
    #[error("Address parsing error: {0}")]
    AddressError(#[from] rustc_hex::FromHexError),
    #[error("conversion error: {0}")]
    ConversionError(#[from] crate::utils::ConversionError),
    #[error("web3 error: {0}")]
    Web3Error(#[from] web3::Error),
    #[error("secp256k1 error: {0}")]
    KeyError(#[from] secp256k1::Error),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}
