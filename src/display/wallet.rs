//! Wallet display formatting

use tabled::Tabled;

use crate::models::{Money, Wallet};

use super::render_table;

#[derive(Tabled)]
struct WalletRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "")]
    default: &'static str,
}

/// Format wallets as a table, marking the default wallet
pub fn format_wallet_list(wallets: &[Wallet], default: Option<&Wallet>, symbol: &str) -> String {
    if wallets.is_empty() {
        return "No wallets found.".to_string();
    }

    let rows: Vec<WalletRow> = wallets
        .iter()
        .map(|w| WalletRow {
            name: w.name.clone(),
            kind: w.kind.to_string(),
            currency: w.currency.clone(),
            balance: w.current_balance.format_with_symbol(symbol),
            default: if default.map(|d| d.id) == Some(w.id) {
                "default"
            } else {
                ""
            },
        })
        .collect();

    let assets: Money = wallets
        .iter()
        .filter(|w| w.is_asset)
        .map(|w| w.current_balance)
        .sum();

    let mut output = render_table(rows);
    output.push_str(&format!("Assets: {}\n", assets.format_with_symbol(symbol)));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WalletKind;

    #[test]
    fn test_format_wallet_list() {
        let cash = Wallet::with_balance("เงินสด", WalletKind::Cash, "THB", Money::from_minor(150_000));
        let card = Wallet::new("บัตรเครดิต KBank", WalletKind::CreditCard, "THB");
        let wallets = vec![cash.clone(), card];

        let output = format_wallet_list(&wallets, Some(&cash), "฿");
        assert!(output.contains("เงินสด"));
        assert!(output.contains("Credit Card"));
        assert!(output.contains("default"));
        assert!(output.contains("Assets: ฿1,500.00"));
    }

    #[test]
    fn test_format_empty_list() {
        assert!(format_wallet_list(&[], None, "฿").contains("No wallets found"));
    }
}
