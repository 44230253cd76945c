//! Minimal contract ABI codec: selectors, static argument encoding and
//! single-word return decoding. The contracts this crate talks to only use
//! `address`, `uint256` and `bool`, all of which occupy one 32-byte word.

use anyhow::{bail, Result};
use num::Zero;
use sha3::{Digest, Keccak256};

use crate::types::{Address, U256};

const WORD: usize = 32;

/// Argument value for a contract call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(U256),
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// First four bytes of keccak-256 over the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode a single static argument into one 32-byte word.
pub fn encode_token(token: &Token) -> Result<[u8; WORD]> {
    let mut word = [0u8; WORD];
    match token {
        Token::Address(addr) => word[12..].copy_from_slice(addr.as_bytes()),
        Token::Uint(value) => {
            if value.is_zero() {
                return Ok(word);
            }
            let bytes = value.to_bytes_be();
            if bytes.len() > WORD {
                bail!("uint256 overflow: {value} needs {} bytes", bytes.len());
            }
            word[WORD - bytes.len()..].copy_from_slice(&bytes);
        }
    }
    Ok(word)
}

/// ABI-encode a list of static arguments (constructor args, call args).
pub fn encode_args(args: &[Token]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(args.len() * WORD);
    for arg in args {
        out.extend_from_slice(&encode_token(arg)?);
    }
    Ok(out)
}

/// Selector followed by encoded arguments.
pub fn encode_call(signature: &str, args: &[Token]) -> Result<Vec<u8>> {
    let mut data = selector(signature).to_vec();
    data.extend(encode_args(args)?);
    Ok(data)
}

fn first_word(data: &[u8]) -> Result<&[u8]> {
    if data.len() < WORD {
        bail!(
            "return data too short: expected at least {WORD} bytes, got {}",
            data.len()
        );
    }
    Ok(&data[..WORD])
}

pub fn decode_uint(data: &[u8]) -> Result<U256> {
    Ok(U256::from_bytes_be(first_word(data)?))
}

pub fn decode_bool(data: &[u8]) -> Result<bool> {
    let word = first_word(data)?;
    if word[..WORD - 1].iter().any(|b| *b != 0) || word[WORD - 1] > 1 {
        bail!("return word is not a valid bool: 0x{}", hex::encode(word));
    }
    Ok(word[WORD - 1] == 1)
}

pub fn decode_address(data: &[u8]) -> Result<Address> {
    let word = first_word(data)?;
    if word[..12].iter().any(|b| *b != 0) {
        bail!("return word is not a valid address: 0x{}", hex::encode(word));
    }
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&word[12..]);
    Ok(Address(addr))
}

/// Split calldata into selector and argument words. Used by test doubles
/// that have to interpret incoming calls.
pub fn split_call(data: &[u8]) -> Result<([u8; 4], Vec<[u8; WORD]>)> {
    if data.len() < 4 || (data.len() - 4) % WORD != 0 {
        bail!("malformed calldata of {} bytes", data.len());
    }
    let sel = [data[0], data[1], data[2], data[3]];
    let words = data[4..]
        .chunks(WORD)
        .map(|chunk| {
            let mut word = [0u8; WORD];
            word.copy_from_slice(chunk);
            word
        })
        .collect();
    Ok((sel, words))
}
