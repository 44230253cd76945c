//! In-memory chain used by unit tests. Models just enough of the token sale
//! contract and the NFT holder contract to exercise reads, claims, mints,
//! withdrawals and deployments end to end.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use num::{ToPrimitive, Zero};

use crate::abi::{keccak256, selector, split_call};
use crate::config::Settings;
use crate::rpc::iface::{Provider, TransactionReceipt, TransactionRequest};
use crate::types::{Address, TxHash, U256, WEI_PER_ETHER};

pub const TOKEN: Address = Address([0x11; 20]);
pub const NFT: Address = Address([0x22; 20]);
pub const OWNER: Address = Address([0xaa; 20]);
pub const USER: Address = Address([0xbb; 20]);
pub const DEPLOYED: Address = Address([0xcc; 20]);

const TOKENS_PER_NFT: u64 = 10;
const MAX_SUPPLY_TOKENS: u64 = 10_000;

fn word_to_address(word: &[u8; 32]) -> Address {
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&word[12..]);
    Address(addr)
}

fn uint_word(value: &U256) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    let mut word = vec![0u8; 32 - bytes.len()];
    word.extend(bytes);
    word
}

fn address_word(addr: &Address) -> Vec<u8> {
    let mut word = vec![0u8; 12];
    word.extend_from_slice(addr.as_bytes());
    word
}

fn one_token() -> U256 {
    WEI_PER_ETHER.clone()
}

struct ChainState {
    accounts: Vec<Address>,
    eth_balances: HashMap<Address, U256>,
    token_owner: Address,
    token_balances: HashMap<Address, U256>,
    total_supply: U256,
    claimed: HashSet<U256>,
    nfts: HashMap<Address, Vec<U256>>,
    price_wei: U256,
    gas_price: U256,
    gas_estimate: U256,
    receipts: HashMap<TxHash, TransactionReceipt>,
    sent: Vec<TransactionRequest>,
    block: u64,
    nonce: u64,
    pending_polls: u32,
    fail_calls: bool,
    fail_sends: bool,
    calls: u64,
    in_flight: usize,
    max_in_flight: usize,
}

pub struct MockChain {
    chain_id: Mutex<u64>,
    state: Mutex<ChainState>,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        let mut eth_balances = HashMap::new();
        eth_balances.insert(USER, U256::from(10u32) * one_token());
        eth_balances.insert(OWNER, U256::from(10u32) * one_token());
        Self {
            chain_id: Mutex::new(chain_id),
            state: Mutex::new(ChainState {
                accounts: vec![USER],
                eth_balances,
                token_owner: OWNER,
                token_balances: HashMap::new(),
                total_supply: U256::zero(),
                claimed: HashSet::new(),
                nfts: HashMap::new(),
                price_wei: U256::from(10_000_000_000_000u64),
                gas_price: U256::from(2_000_000_000u64),
                gas_estimate: U256::from(1_500_000u64),
                receipts: HashMap::new(),
                sent: Vec::new(),
                block: 0,
                nonce: 0,
                pending_polls: 0,
                fail_calls: false,
                fail_sends: false,
                calls: 0,
                in_flight: 0,
                max_in_flight: 0,
            }),
        }
    }

    /// Settings pointing at this chain's contracts.
    pub fn settings(chain_id: u64) -> Settings {
        let raw = format!(
            r#"{{
                "chain_id": {chain_id},
                "wallets": [{{ "label": "Mock", "rpc_url": "http://127.0.0.1:8545" }}],
                "token_contract_address": "{TOKEN}",
                "nft_contract_address": "{NFT}",
                "receipt_poll_interval_ms": 1,
                "receipt_timeout_secs": 5,
                "eligibility_concurrency": 4
            }}"#
        );
        Settings::from_json_str(&raw).expect("mock settings are valid")
    }

    pub fn default_account(&self) -> Address {
        self.state.lock().unwrap().accounts[0]
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        *self.chain_id.lock().unwrap() = chain_id;
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state.lock().unwrap().accounts = accounts;
    }

    pub fn give_nfts(&self, holder: Address, ids: &[u64]) {
        let mut st = self.state.lock().unwrap();
        st.nfts
            .entry(holder)
            .or_default()
            .extend(ids.iter().map(|id| U256::from(*id)));
    }

    pub fn mark_claimed(&self, id: u64) {
        self.state.lock().unwrap().claimed.insert(U256::from(id));
    }

    pub fn set_eth_balance(&self, addr: Address, wei: U256) {
        self.state.lock().unwrap().eth_balances.insert(addr, wei);
    }

    pub fn eth_balance(&self, addr: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .eth_balances
            .get(&addr)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_gas(&self, price: U256, estimate: U256) {
        let mut st = self.state.lock().unwrap();
        st.gas_price = price;
        st.gas_estimate = estimate;
    }

    pub fn set_pending_polls(&self, polls: u32) {
        self.state.lock().unwrap().pending_polls = polls;
    }

    pub fn set_fail_calls(&self, fail: bool) {
        self.state.lock().unwrap().fail_calls = fail;
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.state.lock().unwrap().fail_sends = fail;
    }

    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn token_balance(&self, addr: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .token_balances
            .get(&addr)
            .cloned()
            .unwrap_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.state.lock().unwrap().total_supply.clone()
    }

    pub fn call_count(&self) -> u64 {
        self.state.lock().unwrap().calls
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    fn read(&self, tx: &TransactionRequest) -> Result<Vec<u8>> {
        let st = self.state.lock().unwrap();
        if st.fail_calls {
            bail!("execution reverted: node unavailable");
        }
        let to = tx.to.ok_or_else(|| anyhow!("eth_call without `to`"))?;
        let (sel, words) = split_call(&tx.data)?;

        if to == TOKEN {
            if sel == selector("owner()") {
                return Ok(address_word(&st.token_owner));
            }
            if sel == selector("balanceOf(address)") {
                let who = word_to_address(&words[0]);
                return Ok(uint_word(
                    &st.token_balances.get(&who).cloned().unwrap_or_default(),
                ));
            }
            if sel == selector("totalSupply()") {
                return Ok(uint_word(&st.total_supply));
            }
            if sel == selector("claimedTokenIDs(uint256)") {
                let id = U256::from_bytes_be(&words[0]);
                let claimed = st.claimed.contains(&id) as u8;
                return Ok(uint_word(&U256::from(claimed)));
            }
        } else if to == NFT {
            if sel == selector("balanceOf(address)") {
                let who = word_to_address(&words[0]);
                let count = st.nfts.get(&who).map(|v| v.len()).unwrap_or(0);
                return Ok(uint_word(&U256::from(count)));
            }
            if sel == selector("tokenOfOwnerByIndex(address,uint256)") {
                let who = word_to_address(&words[0]);
                let index = U256::from_bytes_be(&words[1]);
                let id = st
                    .nfts
                    .get(&who)
                    .and_then(|ids| ids.get(index.to_usize().unwrap_or(usize::MAX)))
                    .ok_or_else(|| anyhow!("execution reverted: owner index out of bounds"))?;
                return Ok(uint_word(id));
            }
        }
        bail!("execution reverted: unknown call 0x{} on {to}", hex::encode(sel))
    }

    /// Apply a transaction to the contract state; `false` means reverted.
    fn execute(st: &mut ChainState, tx: &TransactionRequest, from: Address) -> (bool, Option<Address>) {
        let value = tx.value.clone().unwrap_or_default();
        let Some(to) = tx.to else {
            return (true, Some(DEPLOYED));
        };

        if to != TOKEN {
            let bal = st.eth_balances.entry(from).or_default();
            if *bal < value {
                return (false, None);
            }
            *bal -= &value;
            *st.eth_balances.entry(to).or_default() += value;
            return (true, None);
        }

        let Ok((sel, words)) = split_call(&tx.data) else {
            return (false, None);
        };
        let max_supply = U256::from(MAX_SUPPLY_TOKENS) * one_token();

        if sel == selector("claim()") {
            let owned = st.nfts.get(&from).cloned().unwrap_or_default();
            let unclaimed: Vec<U256> = owned
                .into_iter()
                .filter(|id| !st.claimed.contains(id))
                .collect();
            if unclaimed.is_empty() {
                return (false, None);
            }
            let amount = U256::from(unclaimed.len() as u64 * TOKENS_PER_NFT) * one_token();
            if &st.total_supply + &amount > max_supply {
                return (false, None);
            }
            st.claimed.extend(unclaimed);
            *st.token_balances.entry(from).or_default() += &amount;
            st.total_supply += amount;
            return (true, None);
        }

        if sel == selector("mint(uint256)") {
            let count = U256::from_bytes_be(&words[0]);
            let required = &st.price_wei * &count;
            let amount = count * one_token();
            if value < required || &st.total_supply + &amount > max_supply {
                return (false, None);
            }
            let bal = st.eth_balances.entry(from).or_default();
            if *bal < value {
                return (false, None);
            }
            *bal -= &value;
            *st.eth_balances.entry(TOKEN).or_default() += value;
            *st.token_balances.entry(from).or_default() += &amount;
            st.total_supply += amount;
            return (true, None);
        }

        if sel == selector("withdraw()") {
            if from != st.token_owner {
                return (false, None);
            }
            let balance = st.eth_balances.insert(TOKEN, U256::zero()).unwrap_or_default();
            *st.eth_balances.entry(from).or_default() += balance;
            return (true, None);
        }

        (false, None)
    }
}

#[async_trait]
impl Provider for MockChain {
    async fn chain_id(&self) -> Result<u64> {
        Ok(*self.chain_id.lock().unwrap())
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.state.lock().unwrap().accounts.clone())
    }

    async fn get_balance(&self, address: &Address) -> Result<U256> {
        Ok(self.eth_balance(*address))
    }

    async fn gas_price(&self) -> Result<U256> {
        Ok(self.state.lock().unwrap().gas_price.clone())
    }

    async fn estimate_gas(&self, _tx: &TransactionRequest) -> Result<U256> {
        Ok(self.state.lock().unwrap().gas_estimate.clone())
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Vec<u8>> {
        {
            let mut st = self.state.lock().unwrap();
            st.calls += 1;
            st.in_flight += 1;
            st.max_in_flight = st.max_in_flight.max(st.in_flight);
        }
        tokio::task::yield_now().await;
        let result = self.read(tx);
        self.state.lock().unwrap().in_flight -= 1;
        result
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash> {
        let mut st = self.state.lock().unwrap();
        if st.fail_sends {
            bail!("user rejected transaction");
        }
        let from = tx.from.ok_or_else(|| anyhow!("eth_sendTransaction without `from`"))?;
        st.sent.push(tx.clone());
        st.nonce += 1;
        st.block += 1;
        let hash = TxHash(keccak256(&st.nonce.to_be_bytes()));

        let (status, contract_address) = Self::execute(&mut st, tx, from);
        let receipt = TransactionReceipt {
            transaction_hash: hash,
            block_number: st.block,
            status,
            contract_address,
            gas_used: U256::from(21_000u32),
        };
        st.receipts.insert(hash, receipt);
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<TransactionReceipt>> {
        let mut st = self.state.lock().unwrap();
        if st.pending_polls > 0 {
            st.pending_polls -= 1;
            return Ok(None);
        }
        Ok(st.receipts.get(hash).cloned())
    }
}
