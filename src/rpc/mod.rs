pub mod http;
pub mod iface;

use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, info};

use crate::error::IcoError;
use crate::types::TxHash;
use iface::{Provider, TransactionReceipt};

pub use http::HttpProvider;
pub use iface::TransactionRequest;

/// Block until `hash` is mined. Fails with [`IcoError::Reverted`] when the
/// receipt reports failure and [`IcoError::ReceiptTimeout`] once `timeout`
/// elapses without a receipt.
pub async fn wait_for_receipt(
    provider: &dyn Provider,
    hash: &TxHash,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<TransactionReceipt> {
    let start = Instant::now();
    loop {
        if let Some(receipt) = provider.transaction_receipt(hash).await? {
            if !receipt.status {
                return Err(IcoError::Reverted(*hash).into());
            }
            info!(
                "⛏️ [RPC] {} mined in block {} after {:.2}s",
                hash,
                receipt.block_number,
                start.elapsed().as_secs_f64()
            );
            return Ok(receipt);
        }
        if start.elapsed() >= timeout {
            return Err(IcoError::ReceiptTimeout(*hash).into());
        }
        debug!("[RPC] {} still pending", hash);
        tokio::time::sleep(poll_interval).await;
    }
}
