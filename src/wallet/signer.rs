use std::sync::Arc;

use anyhow::Result;

use crate::rpc::iface::{Provider, TransactionRequest};
use crate::types::{Address, TxHash};

/// A wallet-backed identity that can authorize transactions. Signing itself
/// happens inside the wallet behind the provider.
#[derive(Clone)]
pub struct Signer {
    provider: Arc<dyn Provider>,
    address: Address,
}

impl Signer {
    pub fn new(provider: Arc<dyn Provider>, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn provider(&self) -> Arc<dyn Provider> {
        self.provider.clone()
    }

    /// Submit `tx` with this signer as sender.
    pub async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        self.provider
            .send_transaction(&tx.from_address(self.address))
            .await
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
