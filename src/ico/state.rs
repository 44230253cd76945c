use anyhow::Result;
use num::Zero;

use crate::error::IcoError;
use crate::types::U256;

/// Everything the page displays, in one place. Counters are snapshots of the
/// last successful chain read and are never adjusted locally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IcoState {
    pub wallet_connected: bool,
    pub loading: bool,
    pub is_owner: bool,
    /// Number of held NFTs not yet used for a claim.
    pub tokens_to_be_claimed: u64,
    /// Base units (18 decimals).
    pub minted_tokens_by_user: U256,
    /// Base units (18 decimals).
    pub total_minted_tokens: U256,
    /// Whole tokens the user typed into the mint field.
    pub tokens_amount_to_mint: U256,
}

/// The control shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    ConnectWallet,
    Processing,
    Withdraw,
    Claim { claimable_tokens: u64 },
    Mint,
}

impl IcoState {
    /// Page-level selection: nothing but the connect button until a wallet
    /// is connected, then the action selector.
    pub fn view(&self, tokens_per_nft: u64) -> View {
        if !self.wallet_connected {
            return View::ConnectWallet;
        }
        self.action_view(tokens_per_nft)
    }

    /// Loading beats ownership, ownership beats claiming, claiming beats
    /// minting.
    pub fn action_view(&self, tokens_per_nft: u64) -> View {
        if self.loading {
            View::Processing
        } else if self.is_owner {
            View::Withdraw
        } else if self.tokens_to_be_claimed > 0 {
            View::Claim {
                claimable_tokens: self.tokens_to_be_claimed.saturating_mul(tokens_per_nft),
            }
        } else {
            View::Mint
        }
    }

    /// Update the mint field from raw user input: ASCII digits only, blank
    /// means zero. A rejected input leaves the field unchanged.
    pub fn set_mint_amount(&mut self, input: &str) -> Result<()> {
        let trimmed = input.trim();
        self.tokens_amount_to_mint = if trimmed.is_empty() {
            U256::zero()
        } else if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(IcoError::InvalidMintAmount(input.to_string()).into());
        } else {
            trimmed
                .parse::<U256>()
                .map_err(|_| IcoError::InvalidMintAmount(input.to_string()))?
        };
        Ok(())
    }
}
