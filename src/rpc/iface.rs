use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::types::{to_quantity, Address, TxHash, U256};

/// Transaction or call request. `to == None` is a contract creation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub value: Option<U256>,
    pub data: Vec<u8>,
}

impl TransactionRequest {
    pub fn call(to: Address, data: Vec<u8>) -> Self {
        Self {
            to: Some(to),
            data,
            ..Default::default()
        }
    }

    pub fn deploy(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn from_address(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    /// JSON-RPC transaction object.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        if let Some(from) = &self.from {
            obj.insert("from".into(), json!(from.to_string()));
        }
        if let Some(to) = &self.to {
            obj.insert("to".into(), json!(to.to_string()));
        }
        if let Some(value) = &self.value {
            obj.insert("value".into(), json!(to_quantity(value)));
        }
        obj.insert("data".into(), json!(format!("0x{}", hex::encode(&self.data))));
        Value::Object(obj)
    }
}

/// The subset of a mined transaction's receipt this crate cares about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    /// `true` when the transaction executed successfully.
    pub status: bool,
    pub contract_address: Option<Address>,
    pub gas_used: U256,
}

/// Wallet provider interface. A provider can always read chain state; it can
/// send transactions for any address it holds keys for (`accounts`).
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    async fn chain_id(&self) -> anyhow::Result<u64>;

    async fn accounts(&self) -> anyhow::Result<Vec<Address>>;

    async fn get_balance(&self, address: &Address) -> anyhow::Result<U256>;

    async fn gas_price(&self) -> anyhow::Result<U256>;

    async fn estimate_gas(&self, tx: &TransactionRequest) -> anyhow::Result<U256>;

    /// Read-only execution against the latest block; returns raw return data.
    async fn call(&self, tx: &TransactionRequest) -> anyhow::Result<Vec<u8>>;

    async fn send_transaction(&self, tx: &TransactionRequest) -> anyhow::Result<TxHash>;

    /// `None` while the transaction is still pending.
    async fn transaction_receipt(
        &self,
        hash: &TxHash,
    ) -> anyhow::Result<Option<TransactionReceipt>>;
}
