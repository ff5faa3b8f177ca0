//! Summary display formatting

use tabled::Tabled;

use crate::models::{DailySummary, MonthlySummary};

use super::{format_day, render_table};

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Income")]
    income: String,
    #[tabled(rename = "Expense")]
    expense: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Count")]
    count: usize,
}

/// Format daily summaries, newest day first as given
pub fn format_daily_summaries(days: &[&DailySummary], symbol: &str, date_format: &str) -> String {
    if days.is_empty() {
        return "No transactions recorded.".to_string();
    }

    render_table(
        days.iter()
            .map(|d| DayRow {
                date: format_day(d.date, date_format),
                income: d.income.format_with_symbol(symbol),
                expense: d.expense.format_with_symbol(symbol),
                balance: d.balance().format_with_symbol(symbol),
                count: d.transactions.len(),
            })
            .collect(),
    )
}

/// Format the selected month's totals
pub fn format_monthly_summary(summary: &MonthlySummary, symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Month: {:04}-{:02}\n", summary.year, summary.month));
    output.push_str(&format!("  Income:  {}\n", summary.income.format_with_symbol(symbol)));
    output.push_str(&format!("  Expense: {}\n", summary.expense.format_with_symbol(symbol)));
    output.push_str(&format!("  Balance: {}\n", summary.balance.format_with_symbol(symbol)));
    output
}
