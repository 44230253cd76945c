//! Deploy the CryptoDevToken sale contract.
//!
//! Usage: cargo run --bin deploy
//!
//! Reads config/settings.json; the deployer is the active wallet. Exits
//! non-zero on any failure, including an insufficient deployer balance.

use cryptodev_ico::{config::Settings, deploy, types::format_ether};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = Settings::load()?;
    println!("🚀 Deploying {:?}...", settings.artifact_path);

    let report = deploy::run(&settings).await?;

    println!("⛽ Gas price:        {}", report.cost.gas_price);
    println!("⛽ Estimated gas:    {}", report.cost.estimated_gas);
    println!(
        "💰 Deployer balance: {}",
        format_ether(&report.cost.deployer_balance)
    );
    println!(
        "💰 Deployment price: {}",
        format_ether(&report.cost.deployment_price)
    );
    println!(
        "✅ {} deployed address is: {}",
        report.contract_name, report.address
    );

    Ok(())
}
