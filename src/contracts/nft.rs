use anyhow::{Context, Result};

use super::ContractHandle;
use crate::abi::{decode_uint, Token};
use crate::types::{Address, U256};
use crate::wallet::Session;

const BALANCE_OF: &str = "balanceOf(address)";
const TOKEN_OF_OWNER_BY_INDEX: &str = "tokenOfOwnerByIndex(address,uint256)";

/// Enumerable NFT collection whose holders are entitled to claim tokens.
#[derive(Clone)]
pub struct NftContract {
    inner: ContractHandle,
}

impl NftContract {
    pub fn new(address: Address, session: &Session) -> Self {
        Self {
            inner: ContractHandle::new(address, session),
        }
    }

    pub async fn balance_of(&self, holder: &Address) -> Result<U256> {
        let data = self
            .inner
            .call(BALANCE_OF, &[Token::Address(*holder)])
            .await
            .context("NFT balanceOf()")?;
        decode_uint(&data)
    }

    pub async fn token_of_owner_by_index(&self, holder: &Address, index: u64) -> Result<U256> {
        let data = self
            .inner
            .call(
                TOKEN_OF_OWNER_BY_INDEX,
                &[Token::Address(*holder), Token::Uint(U256::from(index))],
            )
            .await
            .with_context(|| format!("tokenOfOwnerByIndex({holder}, {index})"))?;
        decode_uint(&data)
    }
}
