//! Command-line front end for the CryptoDev token sale.
//!
//! Usage: cargo run --bin ico -- [--config path] [--wallet label] <status|claim|mint N|withdraw>

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use cryptodev_ico::{
    config::{settings::DEFAULT_SETTINGS_PATH, Settings},
    ico::{ActionOutcome, IcoApp, View},
    notify::ConsoleNotifier,
    wallet::ConfiguredWallet,
};

#[derive(Parser, Debug)]
#[command(name = "ico")]
#[command(about = "Claim or mint Crypto Dev tokens", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = DEFAULT_SETTINGS_PATH)]
    config: PathBuf,

    /// Wallet label to use instead of the configured active wallet
    #[arg(short, long)]
    wallet: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show balances and the available action
    Status,
    /// Claim tokens for every unclaimed NFT held
    Claim,
    /// Buy tokens at the sale price
    Mint {
        /// Number of whole tokens
        amount: String,
    },
    /// Owner only: move sale proceeds out of the contract
    Withdraw,
}

impl Commands {
    /// Whether the page's current control belongs to this command.
    fn offered_by(&self, view: View) -> bool {
        match self {
            Commands::Status => true,
            Commands::Claim => matches!(view, View::Claim { .. }),
            Commands::Mint { .. } => view == View::Mint,
            Commands::Withdraw => view == View::Withdraw,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = Settings::load_from_file(&cli.config)?;
    if let Some(label) = cli.wallet {
        settings.active_wallet = label;
    }

    let modal = Arc::new(ConfiguredWallet::new(settings.clone()));
    let mut app = IcoApp::new(settings, modal, Arc::new(ConsoleNotifier));

    app.mount().await;
    if !app.state().wallet_connected {
        print!("{}", app.render());
        anyhow::bail!("wallet not connected ({:?})", app.connection_state());
    }

    let view = app.view();
    if !cli.command.offered_by(view) {
        print!("{}", app.render());
        anyhow::bail!("{:?} is not available, the page offers {:?}", cli.command, view);
    }

    let outcome = match cli.command {
        Commands::Status => None,
        Commands::Claim => Some(app.claim_tokens().await),
        Commands::Mint { amount } => {
            app.set_mint_amount(&amount)?;
            Some(app.mint_entered_amount().await)
        }
        Commands::Withdraw => Some(app.withdraw_tokens().await),
    };

    print!("{}", app.render());

    if let Some(ActionOutcome::Confirmed(receipt)) = &outcome {
        println!(
            "Transaction {} included in block {}",
            receipt.transaction_hash, receipt.block_number
        );
    }
    if outcome.as_ref().is_some_and(ActionOutcome::is_failure) {
        anyhow::bail!("action failed, see log for details");
    }
    Ok(())
}
