//! Ethereum JSON-RPC provider over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::{json, Value};

use crate::error::IcoError;
use crate::rpc::iface::{Provider, TransactionReceipt, TransactionRequest};
use crate::types::{parse_quantity, quantity_to_u64, Address, TxHash, U256};

pub struct HttpProvider {
    url: String,
    client: Client,
    next_id: AtomicU64,
}

impl HttpProvider {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        info!("🔌 [RPC] Provider initialized: {}", url);
        Ok(Self {
            url: url.to_string(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let start_time = Instant::now();
        let res = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("sending {method} to {}", self.url))?;

        let status = res.status();
        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            return Err(anyhow!("{method} HTTP {}: {}", status, err_text));
        }

        let resp: Value = res.json().await.with_context(|| format!("decoding {method} response"))?;
        debug!(
            "[RPC] {} answered in {:.2}ms",
            method,
            start_time.elapsed().as_millis()
        );
        extract_result(resp)
    }
}

/// Pull `result` out of a JSON-RPC response, turning an `error` member into
/// [`IcoError::Rpc`].
pub(crate) fn extract_result(mut resp: Value) -> Result<Value> {
    if let Some(err) = resp.get("error") {
        let code = err["code"].as_i64().unwrap_or_default();
        let message = err["message"].as_str().unwrap_or("unknown error").to_string();
        return Err(IcoError::Rpc { code, message }.into());
    }
    if resp.get("result").is_none() {
        return Err(anyhow!("Missing 'result' in response: {:?}", resp));
    }
    Ok(resp["result"].take())
}

fn as_str<'a>(value: &'a Value, what: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| anyhow!("expected string for {what}, got {value}"))
}

fn parse_bytes(value: &Value, what: &str) -> Result<Vec<u8>> {
    let s = as_str(value, what)?;
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).with_context(|| format!("decoding {what}"))
}

pub(crate) fn parse_receipt(value: &Value) -> Result<Option<TransactionReceipt>> {
    if value.is_null() {
        return Ok(None);
    }
    let transaction_hash: TxHash = as_str(&value["transactionHash"], "transactionHash")?.parse()?;
    let block_number = quantity_to_u64(&parse_quantity(as_str(
        &value["blockNumber"],
        "blockNumber",
    )?)?)?;
    // Pre-Byzantium receipts carry no status; treat them as successful.
    let status = match value["status"].as_str() {
        Some(s) => parse_quantity(s)? == U256::from(1u32),
        None => true,
    };
    let contract_address = match value["contractAddress"].as_str() {
        Some(s) => Some(s.parse::<Address>()?),
        None => None,
    };
    let gas_used = match value["gasUsed"].as_str() {
        Some(s) => parse_quantity(s)?,
        None => U256::default(),
    };
    Ok(Some(TransactionReceipt {
        transaction_hash,
        block_number,
        status,
        contract_address,
        gas_used,
    }))
}

#[async_trait]
impl Provider for HttpProvider {
    async fn chain_id(&self) -> Result<u64> {
        let v = self.request("eth_chainId", json!([])).await?;
        quantity_to_u64(&parse_quantity(as_str(&v, "chain id")?)?)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        let v = self.request("eth_accounts", json!([])).await?;
        v.as_array()
            .ok_or_else(|| anyhow!("eth_accounts returned {v}"))?
            .iter()
            .map(|a| as_str(a, "account")?.parse())
            .collect()
    }

    async fn get_balance(&self, address: &Address) -> Result<U256> {
        let v = self
            .request("eth_getBalance", json!([address.to_string(), "latest"]))
            .await?;
        parse_quantity(as_str(&v, "balance")?)
    }

    async fn gas_price(&self) -> Result<U256> {
        let v = self.request("eth_gasPrice", json!([])).await?;
        parse_quantity(as_str(&v, "gas price")?)
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<U256> {
        let v = self.request("eth_estimateGas", json!([tx.to_json()])).await?;
        parse_quantity(as_str(&v, "gas estimate")?)
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Vec<u8>> {
        let v = self.request("eth_call", json!([tx.to_json(), "latest"])).await?;
        parse_bytes(&v, "call result")
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash> {
        let v = self
            .request("eth_sendTransaction", json!([tx.to_json()]))
            .await?;
        let hash: TxHash = as_str(&v, "transaction hash")?.parse()?;
        info!("📤 [RPC] Transaction submitted: {}", hash);
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<TransactionReceipt>> {
        let v = self
            .request("eth_getTransactionReceipt", json!([hash.to_string()]))
            .await?;
        parse_receipt(&v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_result_error_member() {
        let resp = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "insufficient funds for gas * price + value" }
        });
        let err = extract_result(resp).unwrap_err();
        match err.downcast_ref::<IcoError>() {
            Some(IcoError::Rpc { code, message }) => {
                assert_eq!(*code, -32000);
                assert!(message.contains("insufficient funds"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extract_result_missing() {
        assert!(extract_result(json!({ "jsonrpc": "2.0", "id": 1 })).is_err());
        assert_eq!(
            extract_result(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x5" })).unwrap(),
            json!("0x5")
        );
    }

    #[test]
    fn test_parse_pending_receipt() {
        assert_eq!(parse_receipt(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_parse_deploy_receipt() {
        let raw = json!({
            "transactionHash": format!("0x{}", "ab".repeat(32)),
            "blockNumber": "0x10",
            "status": "0x1",
            "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "gasUsed": "0x5208"
        });
        let receipt = parse_receipt(&raw).unwrap().unwrap();
        assert_eq!(receipt.block_number, 16);
        assert!(receipt.status);
        assert_eq!(
            receipt.contract_address.unwrap().to_string(),
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        );
        assert_eq!(receipt.gas_used, U256::from(21_000u32));
    }

    #[test]
    fn test_parse_reverted_receipt() {
        let raw = json!({
            "transactionHash": format!("0x{}", "cd".repeat(32)),
            "blockNumber": "0x1",
            "status": "0x0",
            "contractAddress": null
        });
        let receipt = parse_receipt(&raw).unwrap().unwrap();
        assert!(!receipt.status);
        assert_eq!(receipt.contract_address, None);
    }

    #[test]
    fn test_request_json_shape() {
        let to: Address = "0x2222222222222222222222222222222222222222".parse().unwrap();
        let tx = TransactionRequest::call(to, vec![0xde, 0xad]).value(U256::from(16u32));
        let v = tx.to_json();
        assert_eq!(v["to"], json!(to.to_string()));
        assert_eq!(v["value"], json!("0x10"));
        assert_eq!(v["data"], json!("0xdead"));
        assert!(v.get("from").is_none());
    }
}
