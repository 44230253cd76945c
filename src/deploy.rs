//! One-shot deployment of the token sale contract.
//!
//! Flow: load the compiled artifact, append the constructor argument (the NFT
//! collection address), price the deployment, make sure the deployer can pay
//! for it, submit and wait for the contract address.

use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use serde::Deserialize;

use crate::abi::{encode_args, Token};
use crate::config::Settings;
use crate::error::IcoError;
use crate::rpc::{iface::Provider, wait_for_receipt, TransactionRequest};
use crate::types::{format_ether, Address, TxHash, U256};
use crate::wallet::{ConfiguredWallet, WalletModal};

/// Compiler output as written by Hardhat (`artifacts/.../Name.json`).
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    pub bytecode: String,
}

impl ContractArtifact {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading artifact {:?}", path.as_ref()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing artifact {:?}", path.as_ref()))
    }

    pub fn creation_code(&self) -> Result<Vec<u8>> {
        let digits = self.bytecode.strip_prefix("0x").unwrap_or(&self.bytecode);
        if digits.is_empty() {
            bail!(
                "artifact for {} has no bytecode (abstract contract or interface?)",
                self.contract_name
            );
        }
        hex::decode(digits).with_context(|| format!("decoding {} bytecode", self.contract_name))
    }

    /// Creation code followed by the ABI-encoded constructor arguments.
    pub fn deploy_data(&self, constructor_args: &[Token]) -> Result<Vec<u8>> {
        let mut data = self.creation_code()?;
        data.extend(encode_args(constructor_args)?);
        Ok(data)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentCost {
    pub gas_price: U256,
    pub estimated_gas: U256,
    pub deployment_price: U256,
    pub deployer_balance: U256,
}

#[derive(Clone, Debug)]
pub struct DeployReport {
    pub contract_name: String,
    pub address: Address,
    pub transaction_hash: TxHash,
    pub cost: DeploymentCost,
}

/// Price the deployment and refuse when the deployer cannot cover it.
pub async fn preflight(
    provider: &dyn Provider,
    tx: &TransactionRequest,
    deployer: &Address,
) -> Result<DeploymentCost> {
    let gas_price = provider.gas_price().await.context("reading gas price")?;
    debug!("⛽ [DEPLOY] Current gas price: {}", gas_price);
    let estimated_gas = provider
        .estimate_gas(tx)
        .await
        .context("estimating deployment gas")?;
    debug!("⛽ [DEPLOY] Estimated gas: {}", estimated_gas);

    let deployment_price = &gas_price * &estimated_gas;
    let deployer_balance = provider
        .get_balance(deployer)
        .await
        .context("reading deployer balance")?;
    debug!("💰 [DEPLOY] Deployer balance:  {}", format_ether(&deployer_balance));
    debug!("💰 [DEPLOY] Deployment price:  {}", format_ether(&deployment_price));

    if deployer_balance < deployment_price {
        return Err(IcoError::InsufficientBalance {
            balance: deployer_balance,
            required: deployment_price,
        }
        .into());
    }

    Ok(DeploymentCost {
        gas_price,
        estimated_gas,
        deployment_price,
        deployer_balance,
    })
}

pub async fn deploy_contract(
    provider: &dyn Provider,
    deployer: Address,
    artifact: &ContractArtifact,
    constructor_args: &[Token],
    poll_interval: Duration,
    timeout: Duration,
) -> Result<DeployReport> {
    let tx = TransactionRequest::deploy(artifact.deploy_data(constructor_args)?)
        .from_address(deployer);
    let cost = preflight(provider, &tx, &deployer).await?;

    let hash = provider
        .send_transaction(&tx)
        .await
        .with_context(|| format!("submitting {} deployment", artifact.contract_name))?;
    info!("🚀 [DEPLOY] {} deployment submitted: {}", artifact.contract_name, hash);

    let receipt = wait_for_receipt(provider, &hash, poll_interval, timeout).await?;
    let address = receipt
        .contract_address
        .ok_or_else(|| anyhow!("receipt for {hash} carries no contract address"))?;
    debug!(
        "[DEPLOY] {} included in block {}",
        artifact.contract_name, receipt.block_number
    );

    Ok(DeployReport {
        contract_name: artifact.contract_name.clone(),
        address,
        transaction_hash: hash,
        cost,
    })
}

/// Deploy the sale contract bound to the configured NFT collection, using the
/// active wallet as deployer.
pub async fn run(settings: &Settings) -> Result<DeployReport> {
    let artifact = ContractArtifact::load(&settings.artifact_path)?;

    let wallet = ConfiguredWallet::new(settings.clone());
    let provider = wallet.connect().await?;
    let chain_id = provider.chain_id().await.context("reading chain id")?;
    info!("🔗 [DEPLOY] Connected to chain {}", chain_id);

    let deployer = match wallet.preferred_account() {
        Some(addr) => addr,
        None => provider
            .accounts()
            .await
            .context("listing deployer accounts")?
            .into_iter()
            .next()
            .ok_or(IcoError::NoAccounts)?,
    };
    info!("👤 [DEPLOY] Deployer: {}", deployer);

    deploy_contract(
        &*provider,
        deployer,
        &artifact,
        &[Token::Address(settings.nft_contract_address)],
        settings.receipt_poll_interval(),
        settings.receipt_timeout(),
    )
    .await
}
