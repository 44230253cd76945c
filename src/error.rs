//! Failure taxonomy for wallet, transaction and deployment errors.
//!
//! Everything else travels as a plain `anyhow::Error`; these variants exist
//! so callers can `downcast_ref` the cases they react to.

use thiserror::Error;

use crate::types::{TxHash, U256};

#[derive(Debug, Error)]
pub enum IcoError {
    #[error("Please connect your wallet using {network} testnet! (wallet is on chain {actual}, expected {expected})")]
    WrongNetwork {
        network: String,
        expected: u64,
        actual: u64,
    },

    #[error("You dont have enough balance to deploy. (balance {balance} wei, required {required} wei)")]
    InsufficientBalance { balance: U256, required: U256 },

    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    #[error("timed out waiting for transaction {0} to be mined")]
    ReceiptTimeout(TxHash),

    #[error("wallet exposes no accounts to sign with")]
    NoAccounts,

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid mint amount: {0:?}")]
    InvalidMintAmount(String),
}
