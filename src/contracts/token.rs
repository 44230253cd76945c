//! Token sale contract: ERC-20 balances plus NFT-holder claims, paid mints
//! and owner withdrawal.

use anyhow::{Context, Result};

use super::ContractHandle;
use crate::abi::{decode_address, decode_bool, decode_uint, Token};
use crate::types::{Address, TxHash, U256};
use crate::wallet::Session;

const OWNER: &str = "owner()";
const BALANCE_OF: &str = "balanceOf(address)";
const TOTAL_SUPPLY: &str = "totalSupply()";
const CLAIMED_TOKEN_IDS: &str = "claimedTokenIDs(uint256)";
const CLAIM: &str = "claim()";
const MINT: &str = "mint(uint256)";
const WITHDRAW: &str = "withdraw()";

#[derive(Clone)]
pub struct TokenContract {
    inner: ContractHandle,
}

impl TokenContract {
    pub fn new(address: Address, session: &Session) -> Self {
        Self {
            inner: ContractHandle::new(address, session),
        }
    }

    pub async fn owner(&self) -> Result<Address> {
        let data = self.inner.call(OWNER, &[]).await.context("owner()")?;
        decode_address(&data)
    }

    /// Token balance in base units (18 decimals).
    pub async fn balance_of(&self, holder: &Address) -> Result<U256> {
        let data = self
            .inner
            .call(BALANCE_OF, &[Token::Address(*holder)])
            .await
            .context("balanceOf()")?;
        decode_uint(&data)
    }

    pub async fn total_supply(&self) -> Result<U256> {
        let data = self.inner.call(TOTAL_SUPPLY, &[]).await.context("totalSupply()")?;
        decode_uint(&data)
    }

    /// Whether the NFT with `token_id` has already been used for a claim.
    pub async fn claimed_token_ids(&self, token_id: &U256) -> Result<bool> {
        let data = self
            .inner
            .call(CLAIMED_TOKEN_IDS, &[Token::Uint(token_id.clone())])
            .await
            .context("claimedTokenIDs()")?;
        decode_bool(&data)
    }

    pub async fn claim(&self) -> Result<TxHash> {
        self.inner.send(CLAIM, &[], None).await
    }

    /// Buy `count` whole tokens, paying `value` wei.
    pub async fn mint(&self, count: &U256, value: U256) -> Result<TxHash> {
        self.inner
            .send(MINT, &[Token::Uint(count.clone())], Some(value))
            .await
    }

    pub async fn withdraw(&self) -> Result<TxHash> {
        self.inner.send(WITHDRAW, &[], None).await
    }
}
