//! Plain-text rendering of the sale page.

use std::fmt::Write;

use crate::config::Settings;
use crate::ico::state::{IcoState, View};
use crate::types::format_ether;

/// 10000 -> "10,000"
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn render_control(view: View, state: &IcoState) -> String {
    match view {
        View::ConnectWallet => "[ Connect Wallet ]".to_string(),
        View::Processing => "[ Processing ...Wait! ]".to_string(),
        View::Withdraw => "[ Withdraw ]".to_string(),
        View::Claim { claimable_tokens } => {
            format!("{claimable_tokens} tokens can be claimed!\n[ Claim your tokens! ]")
        }
        View::Mint => format!(
            "Amount of tokens: {}\n[ Mint ]",
            state.tokens_amount_to_mint
        ),
    }
}

pub fn render_page(state: &IcoState, settings: &Settings) -> String {
    let mut page = String::new();
    let _ = writeln!(page, "Welcome to CryptoDev Token ICO!");
    let _ = writeln!(page, "You can claim or mint Crypto Dev tokens here");

    let view = state.view(settings.tokens_per_nft);
    if state.wallet_connected {
        let _ = writeln!(
            page,
            "You have minted {} Crypto Dev tokens here",
            format_ether(&state.minted_tokens_by_user)
        );
        let _ = writeln!(
            page,
            "Overall {}/{} tokens have been minted!!!",
            format_ether(&state.total_minted_tokens),
            group_thousands(settings.max_total_supply)
        );
    }
    let _ = writeln!(page, "{}", render_control(view, state));
    page
}
