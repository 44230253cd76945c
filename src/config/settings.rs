//! Runtime configuration loader and common helpers.

use std::{fmt, fs, path::Path, path::PathBuf, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::{parse_ether, Address, U256};

pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.json";

/// ------------------------------------------------------------------
/// Wallet endpoints the connector can choose from
/// ------------------------------------------------------------------
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WalletConfig {
    pub label: String,
    pub rpc_url: String,
    /// Account to sign with. When absent the first of `eth_accounts` is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// ------------------------------------------------------------------
/// Main Settings object
/// ------------------------------------------------------------------
#[derive(Clone)]
pub struct Settings {
    /* -------- network ------------------------------- */
    pub network: String,
    pub chain_id: u64,

    /* -------- wallets ------------------------------- */
    pub wallets: Vec<WalletConfig>,
    pub active_wallet: String,

    /* -------- contracts ----------------------------- */
    pub token_contract_address: Address,
    pub nft_contract_address: Address,
    pub token_price_wei: U256,
    pub max_total_supply: u64,
    pub tokens_per_nft: u64,

    /* -------- tuning -------------------------------- */
    pub eligibility_concurrency: usize,
    pub receipt_poll_interval_ms: u64,
    pub receipt_timeout_secs: u64,
    pub rpc_timeout_secs: u64,

    /* -------- deployment ---------------------------- */
    pub artifact_path: PathBuf,
}

impl Settings {
    /// --------------------------------------------------------------
    /// Read `settings.json` from disk.
    /// --------------------------------------------------------------
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading settings file {:?}", path.as_ref()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("parsing settings file {:?}", path.as_ref()))
    }

    /// --------------------------------------------------------------
    /// Load settings from default config/settings.json file.
    /// --------------------------------------------------------------
    pub fn load() -> Result<Self> {
        Self::load_from_file(DEFAULT_SETTINGS_PATH)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(raw)?;

        /* -------- network ---------------------------------------- */
        let network = json["network"].as_str().unwrap_or("goerli").to_string();
        let chain_id = json["chain_id"].as_u64().unwrap_or(5);

        /* -------- wallets ---------------------------------------- */
        let wallets: Vec<WalletConfig> = match json.get("wallets") {
            Some(v) => serde_json::from_value(v.clone()).context("parsing wallets")?,
            None => Vec::new(),
        };
        for wallet in &wallets {
            Url::parse(&wallet.rpc_url)
                .with_context(|| format!("wallet `{}` has invalid rpc_url", wallet.label))?;
            if let Some(account) = &wallet.account {
                account
                    .parse::<Address>()
                    .with_context(|| format!("wallet `{}` has invalid account", wallet.label))?;
            }
        }
        let active_wallet = json["active_wallet"]
            .as_str()
            .map(|s| s.to_string())
            .or_else(|| wallets.first().map(|w| w.label.clone()))
            .unwrap_or_default();

        /* -------- contracts -------------------------------------- */
        let token_contract_address = required_address(&json, "token_contract_address")?;
        let nft_contract_address = required_address(&json, "nft_contract_address")?;
        let token_price_wei = parse_ether(json["token_price_eth"].as_str().unwrap_or("0.00001"))
            .context("parsing token_price_eth")?;
        let max_total_supply = json["max_total_supply"].as_u64().unwrap_or(10_000);
        let tokens_per_nft = json["tokens_per_nft"].as_u64().unwrap_or(10);

        /* -------- tuning ----------------------------------------- */
        let eligibility_concurrency =
            json["eligibility_concurrency"].as_u64().unwrap_or(8).max(1) as usize;
        let receipt_poll_interval_ms = json["receipt_poll_interval_ms"].as_u64().unwrap_or(1000);
        let receipt_timeout_secs = json["receipt_timeout_secs"].as_u64().unwrap_or(300);
        let rpc_timeout_secs = json["rpc_timeout_secs"].as_u64().unwrap_or(10);

        let artifact_path = json["artifact_path"]
            .as_str()
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                PathBuf::from("artifacts/contracts/CryptoDevToken.sol/CryptoDevToken.json")
            });

        Ok(Self {
            network,
            chain_id,
            wallets,
            active_wallet,
            token_contract_address,
            nft_contract_address,
            token_price_wei,
            max_total_supply,
            tokens_per_nft,
            eligibility_concurrency,
            receipt_poll_interval_ms,
            receipt_timeout_secs,
            rpc_timeout_secs,
            artifact_path,
        })
    }

    /// --------------------------------------------------------------
    /// Helper: the wallet entry named by `active_wallet`.
    /// --------------------------------------------------------------
    pub fn active_wallet_config(&self) -> Result<&WalletConfig> {
        self.wallets
            .iter()
            .find(|w| w.label == self.active_wallet)
            .ok_or_else(|| anyhow!("active wallet `{}` not found", self.active_wallet))
    }

    /// "goerli" -> "Goerli", as shown in the wrong-network alert.
    pub fn network_display_name(&self) -> String {
        let mut chars = self.network.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

fn required_address(json: &serde_json::Value, key: &str) -> Result<Address> {
    let address: Address = match json[key].as_str() {
        Some(s) => s.parse().with_context(|| format!("parsing {key}"))?,
        None => bail!("missing required setting `{key}`"),
    };
    if address.is_zero() {
        bail!("`{key}` is the zero address");
    }
    Ok(address)
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("network", &self.network)
            .field("chain_id", &self.chain_id)
            .field("active_wallet", &self.active_wallet)
            .field("token_contract_address", &self.token_contract_address)
            .field("nft_contract_address", &self.nft_contract_address)
            .finish_non_exhaustive()
    }
}
