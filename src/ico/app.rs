//! The sale controller: owns the page state, talks to the wallet, runs the
//! read queries and the three state-changing actions.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::{error, info, warn};
use num::Zero;

use crate::config::Settings;
use crate::contracts::{NftContract, TokenContract};
use crate::eligibility::tokens_to_be_claimed;
use crate::ico::render::render_page;
use crate::ico::state::{IcoState, View};
use crate::notify::Notifier;
use crate::rpc::{iface::TransactionReceipt, wait_for_receipt};
use crate::types::{format_ether, Address, U256};
use crate::wallet::{ConnectionState, Session, WalletConnector, WalletModal};

/// Result of a user-triggered action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Confirmed(TransactionReceipt),
    /// Withdraw found an empty contract and sent nothing.
    NothingToWithdraw,
    /// The error has already been logged.
    Failed,
}

impl ActionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ActionOutcome::Failed)
    }
}

#[derive(Clone, Debug)]
enum Action {
    Claim,
    Mint { count: U256, value: U256 },
    Withdraw,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Claim => "claim",
            Action::Mint { .. } => "mint",
            Action::Withdraw => "withdraw",
        }
    }

    /// Whether the page currently offers the control for this action.
    fn offered_by(&self, view: View) -> bool {
        matches!(
            (self, view),
            (Action::Claim, View::Claim { .. })
                | (Action::Mint { .. }, View::Mint)
                | (Action::Withdraw, View::Withdraw)
        )
    }

    fn success_message(&self) -> &'static str {
        match self {
            Action::Claim => "Your crypto dev tokens are successfully claimed!",
            Action::Mint { .. } => "You've successfully minted crypto dev tokens!",
            Action::Withdraw => "You've successfully withdrawn the tokens",
        }
    }
}

/// Log a failed read and fall back to the zero value.
fn or_default_logged<T: Default>(what: &str, result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        error!("❌ [ICO] Reading {} failed: {:#}", what, e);
        T::default()
    })
}

pub struct IcoApp {
    settings: Settings,
    connector: WalletConnector,
    notifier: Arc<dyn Notifier>,
    state: IcoState,
}

impl IcoApp {
    pub fn new(
        settings: Settings,
        modal: Arc<dyn WalletModal>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let connector = WalletConnector::from_settings(&settings, modal, notifier.clone());
        Self {
            settings,
            connector,
            notifier,
            state: IcoState::default(),
        }
    }

    pub fn state(&self) -> &IcoState {
        &self.state
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connector.state()
    }

    pub fn view(&self) -> View {
        self.state.view(self.settings.tokens_per_nft)
    }

    pub fn render(&self) -> String {
        render_page(&self.state, &self.settings)
    }

    pub fn set_mint_amount(&mut self, input: &str) -> Result<()> {
        self.state.set_mint_amount(input)
    }

    /* ------------------------------------------------------------------ */
    /*  Connection                                                        */
    /* ------------------------------------------------------------------ */

    async fn session(&mut self, need_signer: bool) -> Result<Session> {
        let result = self.connector.get_provider_or_signer(need_signer).await;
        self.state.wallet_connected = self.connector.is_connected();
        result
    }

    async fn signer_session(&mut self) -> Result<(Session, Address)> {
        let session = self.session(true).await?;
        let address = session
            .signer()
            .map(|s| s.address())
            .ok_or_else(|| anyhow!("wallet returned no signer"))?;
        Ok((session, address))
    }

    pub async fn connect_wallet(&mut self) {
        self.state.loading = true;
        match self.session(false).await {
            Ok(_) => info!("👛 [ICO] Wallet connected"),
            Err(e) => error!("❌ [ICO] Wallet connection failed: {:#}", e),
        }
        self.state.loading = false;
    }

    /// First load: connect if needed, then read everything the page shows.
    pub async fn mount(&mut self) {
        if !self.state.wallet_connected {
            self.connect_wallet().await;
        }
        if !self.state.wallet_connected {
            warn!("⚠️ [ICO] Not connected, skipping chain reads");
            return;
        }
        self.check_is_owner().await;
        self.refresh_counters().await;
    }

    /* ------------------------------------------------------------------ */
    /*  Reads                                                             */
    /* ------------------------------------------------------------------ */

    async fn read_is_owner(&mut self) -> Result<bool> {
        let (session, user) = self.signer_session().await?;
        let token = TokenContract::new(self.settings.token_contract_address, &session);
        let owner = token.owner().await?;
        Ok(owner == user)
    }

    async fn read_minted_by_user(&mut self) -> Result<U256> {
        let (session, user) = self.signer_session().await?;
        let token = TokenContract::new(self.settings.token_contract_address, &session);
        token.balance_of(&user).await
    }

    async fn read_total_minted(&mut self) -> Result<U256> {
        let session = self.session(false).await?;
        let token = TokenContract::new(self.settings.token_contract_address, &session);
        token.total_supply().await
    }

    async fn read_tokens_to_be_claimed(&mut self) -> Result<u64> {
        let (session, user) = self.signer_session().await?;
        let nft = NftContract::new(self.settings.nft_contract_address, &session);
        let token = TokenContract::new(self.settings.token_contract_address, &session);
        tokens_to_be_claimed(&nft, &token, &user, self.settings.eligibility_concurrency).await
    }

    pub async fn check_is_owner(&mut self) {
        let result = self.read_is_owner().await;
        self.state.is_owner = or_default_logged("contract owner", result);
    }

    pub async fn calculate_minted_tokens_by_user(&mut self) {
        let result = self.read_minted_by_user().await;
        self.state.minted_tokens_by_user = or_default_logged("minted tokens", result);
    }

    pub async fn calculate_total_minted_tokens(&mut self) {
        let result = self.read_total_minted().await;
        self.state.total_minted_tokens = or_default_logged("total supply", result);
    }

    pub async fn get_tokens_to_be_claimed(&mut self) {
        let result = self.read_tokens_to_be_claimed().await;
        self.state.tokens_to_be_claimed = or_default_logged("claimable tokens", result);
    }

    /// Re-derive the three counters from the chain.
    pub async fn refresh_counters(&mut self) {
        self.calculate_minted_tokens_by_user().await;
        self.calculate_total_minted_tokens().await;
        self.get_tokens_to_be_claimed().await;
        info!(
            "📊 [ICO] minted by user {} / total {} / claimable NFTs {}",
            format_ether(&self.state.minted_tokens_by_user),
            format_ether(&self.state.total_minted_tokens),
            self.state.tokens_to_be_claimed
        );
    }

    /* ------------------------------------------------------------------ */
    /*  Actions                                                           */
    /* ------------------------------------------------------------------ */

    /// Signer, submit, wait for inclusion. `loading` is raised only once the
    /// signer is in hand and dropped as soon as the receipt arrives.
    async fn execute(&mut self, action: &Action) -> Result<TransactionReceipt> {
        let (session, _) = self.signer_session().await?;
        let token = TokenContract::new(self.settings.token_contract_address, &session);

        self.state.loading = true;
        let hash = match action {
            Action::Claim => token.claim().await?,
            Action::Mint { count, value } => token.mint(count, value.clone()).await?,
            Action::Withdraw => token.withdraw().await?,
        };
        info!("⏳ [ICO] {} submitted: {}", action.name(), hash);

        let provider = session.provider();
        let receipt = wait_for_receipt(
            &*provider,
            &hash,
            self.settings.receipt_poll_interval(),
            self.settings.receipt_timeout(),
        )
        .await?;
        self.state.loading = false;
        Ok(receipt)
    }

    /// Refuse an action while another one is in flight or while the page
    /// shows a different control.
    fn permits(&self, action: &Action) -> bool {
        if self.state.loading {
            warn!("⚠️ [ICO] {} refused: another transaction is processing", action.name());
            return false;
        }
        let view = self.view();
        if !action.offered_by(view) {
            warn!("⚠️ [ICO] {} refused: page shows {:?}", action.name(), view);
            return false;
        }
        true
    }

    async fn perform(&mut self, action: Action) -> ActionOutcome {
        if !self.permits(&action) {
            return ActionOutcome::Failed;
        }
        match self.execute(&action).await {
            Ok(receipt) => {
                info!("✅ [ICO] {} confirmed in block {}", action.name(), receipt.block_number);
                self.notifier.alert(action.success_message());
                self.refresh_counters().await;
                ActionOutcome::Confirmed(receipt)
            }
            Err(e) => {
                error!("❌ [ICO] {} failed: {:#}", action.name(), e);
                self.state.loading = false;
                ActionOutcome::Failed
            }
        }
    }

    /// Claim the allotment for every unclaimed NFT the user holds.
    pub async fn claim_tokens(&mut self) -> ActionOutcome {
        self.perform(Action::Claim).await
    }

    /// Buy `count` tokens at the configured price.
    pub async fn mint_tokens(&mut self, count: U256) -> ActionOutcome {
        let value = &count * &self.settings.token_price_wei;
        info!(
            "🪙 [ICO] Minting {} tokens for {} ETH",
            count,
            format_ether(&value)
        );
        self.perform(Action::Mint { count, value }).await
    }

    /// Mint whatever is currently in the amount field.
    pub async fn mint_entered_amount(&mut self) -> ActionOutcome {
        let count = self.state.tokens_amount_to_mint.clone();
        self.mint_tokens(count).await
    }

    /// Move the sale proceeds to the owner. Nothing is sent while the
    /// contract holds no ether.
    pub async fn withdraw_tokens(&mut self) -> ActionOutcome {
        if !self.permits(&Action::Withdraw) {
            return ActionOutcome::Failed;
        }
        match self.contract_balance().await {
            Ok(balance) if balance.is_zero() => {
                info!("💤 [ICO] Contract balance is 0, skipping withdraw");
                self.notifier
                    .alert("There is nothing to withdraw. Balance is 0.");
                ActionOutcome::NothingToWithdraw
            }
            Ok(balance) => {
                info!("💰 [ICO] Contract holds {} ETH", format_ether(&balance));
                self.perform(Action::Withdraw).await
            }
            Err(e) => {
                error!("❌ [ICO] withdraw failed: {:#}", e);
                self.state.loading = false;
                ActionOutcome::Failed
            }
        }
    }

    async fn contract_balance(&mut self) -> Result<U256> {
        let session = self.session(false).await?;
        session
            .provider()
            .get_balance(&self.settings.token_contract_address)
            .await
    }
}
