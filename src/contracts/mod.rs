//! Typed handles for the two external contracts.
//!
//! A handle is bound to a [`Session`]: bound to a plain provider it can only
//! read, bound to a signer it can also submit transactions.

pub mod nft;
pub mod token;

use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::abi::{encode_call, Token};
use crate::rpc::iface::{Provider, TransactionRequest};
use crate::types::{Address, TxHash, U256};
use crate::wallet::{Session, Signer};

pub use nft::NftContract;
pub use token::TokenContract;

/// Plumbing shared by both handles.
#[derive(Clone)]
pub(crate) struct ContractHandle {
    address: Address,
    provider: Arc<dyn Provider>,
    signer: Option<Signer>,
}

impl ContractHandle {
    pub(crate) fn new(address: Address, session: &Session) -> Self {
        Self {
            address,
            provider: session.provider(),
            signer: session.signer().cloned(),
        }
    }

    pub(crate) async fn call(&self, signature: &str, args: &[Token]) -> Result<Vec<u8>> {
        let data = encode_call(signature, args)?;
        self.provider
            .call(&TransactionRequest::call(self.address, data))
            .await
    }

    pub(crate) async fn send(
        &self,
        signature: &str,
        args: &[Token],
        value: Option<U256>,
    ) -> Result<TxHash> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            anyhow!("{signature} needs a signer but the contract handle is read-only")
        })?;
        let mut tx = TransactionRequest::call(self.address, encode_call(signature, args)?);
        if let Some(value) = value {
            tx = tx.value(value);
        }
        signer.send_transaction(tx).await
    }
}
