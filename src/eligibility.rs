//! Claim eligibility: how many of a holder's NFTs have not been used for a
//! claim yet.

use anyhow::{Context, Result};
use futures::{stream, StreamExt, TryStreamExt};
use log::debug;
use num::Zero;

use crate::contracts::{NftContract, TokenContract};
use crate::types::{quantity_to_u64, Address};

/// Count the unclaimed NFTs owned by `holder`.
///
/// Each owned NFT costs two round trips (index lookup, claimed flag); at most
/// `concurrency` of those pairs are in flight at once. Any failed lookup fails
/// the whole count. The result never exceeds the holder's NFT balance.
pub async fn tokens_to_be_claimed(
    nft: &NftContract,
    token: &TokenContract,
    holder: &Address,
    concurrency: usize,
) -> Result<u64> {
    let nft_balance = nft.balance_of(holder).await?;
    if nft_balance.is_zero() {
        return Ok(0);
    }
    let owned = quantity_to_u64(&nft_balance).context("NFT balance out of range")?;

    let unclaimed = stream::iter(0..owned)
        .map(|index| async move {
            let token_id = nft.token_of_owner_by_index(holder, index).await?;
            let claimed = token.claimed_token_ids(&token_id).await?;
            debug!("[ELIGIBILITY] NFT #{} claimed={}", token_id, claimed);
            Ok::<bool, anyhow::Error>(!claimed)
        })
        .buffer_unordered(concurrency.max(1))
        .try_fold(0u64, |acc, unclaimed| async move {
            Ok(acc + u64::from(unclaimed))
        })
        .await?;

    debug!(
        "[ELIGIBILITY] {} owns {} NFTs, {} unclaimed",
        holder, owned, unclaimed
    );
    Ok(unclaimed)
}
