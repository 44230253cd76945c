//! Wallet connection: pick a wallet, make sure it is on the expected
//! network, and hand out either a read-only provider or a signer.

pub mod signer;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};

use crate::config::Settings;
use crate::error::IcoError;
use crate::notify::Notifier;
use crate::rpc::{iface::Provider, HttpProvider};
use crate::types::Address;

pub use signer::Signer;

/// The "choose a wallet" step. Resolves to a provider for the selected wallet.
#[async_trait]
pub trait WalletModal: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn Provider>>;

    /// Account pinned by the wallet selection, if any.
    fn preferred_account(&self) -> Option<Address> {
        None
    }
}

/// Selects the settings' active wallet entry and talks JSON-RPC to it.
pub struct ConfiguredWallet {
    settings: Settings,
}

impl ConfiguredWallet {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl WalletModal for ConfiguredWallet {
    async fn connect(&self) -> Result<Arc<dyn Provider>> {
        let wallet = self.settings.active_wallet_config()?;
        info!("👛 [WALLET] Selected wallet `{}` ({})", wallet.label, wallet.rpc_url);
        let provider = HttpProvider::new(&wallet.rpc_url, self.settings.rpc_timeout())?;
        Ok(Arc::new(provider))
    }

    fn preferred_account(&self) -> Option<Address> {
        self.settings
            .active_wallet_config()
            .ok()
            .and_then(|w| w.account.as_deref())
            .and_then(|a| a.parse().ok())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected { chain_id: u64 },
    WrongNetwork { chain_id: u64 },
}

/// What [`WalletConnector::get_provider_or_signer`] hands back.
#[derive(Clone)]
pub enum Session {
    Provider(Arc<dyn Provider>),
    Signer(Signer),
}

impl Session {
    pub fn provider(&self) -> Arc<dyn Provider> {
        match self {
            Session::Provider(p) => p.clone(),
            Session::Signer(s) => s.provider(),
        }
    }

    pub fn signer(&self) -> Option<&Signer> {
        match self {
            Session::Provider(_) => None,
            Session::Signer(s) => Some(s),
        }
    }
}

pub struct WalletConnector {
    modal: Arc<dyn WalletModal>,
    notifier: Arc<dyn Notifier>,
    network: String,
    expected_chain_id: u64,
    provider: Option<Arc<dyn Provider>>,
    state: ConnectionState,
}

impl WalletConnector {
    pub fn new(
        modal: Arc<dyn WalletModal>,
        notifier: Arc<dyn Notifier>,
        network: String,
        expected_chain_id: u64,
    ) -> Self {
        Self {
            modal,
            notifier,
            network,
            expected_chain_id,
            provider: None,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn from_settings(
        settings: &Settings,
        modal: Arc<dyn WalletModal>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(
            modal,
            notifier,
            settings.network_display_name(),
            settings.chain_id,
        )
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected { .. })
    }

    /// Connect (selecting a wallet on first use), verify the chain id and
    /// return a provider or, with `need_signer`, a signer. The chain id is
    /// checked on every call since the user may switch networks at any time.
    pub async fn get_provider_or_signer(&mut self, need_signer: bool) -> Result<Session> {
        let provider = match &self.provider {
            Some(p) => p.clone(),
            None => {
                self.state = ConnectionState::Connecting;
                match self.modal.connect().await {
                    Ok(p) => {
                        self.provider = Some(p.clone());
                        p
                    }
                    Err(e) => {
                        self.state = ConnectionState::Disconnected;
                        return Err(e.context("wallet connection failed"));
                    }
                }
            }
        };

        let chain_id = match provider.chain_id().await {
            Ok(id) => id,
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                return Err(e.context("reading chain id"));
            }
        };

        if chain_id != self.expected_chain_id {
            self.state = ConnectionState::WrongNetwork { chain_id };
            warn!(
                "🚫 [WALLET] Wrong network: chain {} (expected {})",
                chain_id, self.expected_chain_id
            );
            self.notifier.alert(&format!(
                "Please connect your wallet using {} testnet!",
                self.network
            ));
            return Err(IcoError::WrongNetwork {
                network: self.network.clone(),
                expected: self.expected_chain_id,
                actual: chain_id,
            }
            .into());
        }
        self.state = ConnectionState::Connected { chain_id };

        if !need_signer {
            return Ok(Session::Provider(provider));
        }

        let address = match self.modal.preferred_account() {
            Some(addr) => addr,
            None => provider
                .accounts()
                .await
                .context("listing wallet accounts")?
                .into_iter()
                .next()
                .ok_or(IcoError::NoAccounts)?,
        };
        Ok(Session::Signer(Signer::new(provider, address)))
    }

    /// Forget the selected wallet; the next call prompts for a wallet again.
    pub fn disconnect(&mut self) {
        self.provider = None;
        self.state = ConnectionState::Disconnected;
        info!("👛 [WALLET] Disconnected");
    }
}
