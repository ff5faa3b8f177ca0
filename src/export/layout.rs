//! Workbook layout shared by the exporter and the importer
//!
//! Wallet sheet:
//!
//! | A              | B        | C        | D      | E    |
//! |----------------|----------|----------|--------|------|
//! | Wallet         | name     |          |        |      |
//! | Date           | Type     | Category | Amount | Note |
//! | 2024-01        |          |          |        |      |
//! | 2024-01-05T... | expense  | อาหาร    | 120    | lunch|

/// Name of the per-category totals sheet; never read back as a wallet
pub const SUMMARY_SHEET_NAME: &str = "Category Summary";

/// Label in A1 of a wallet sheet; B1 holds the exact wallet name
pub const WALLET_LABEL: &str = "Wallet";

pub const TRANSACTION_HEADERS: [&str; 5] = ["Date", "Type", "Category", "Amount", "Note"];

pub const SUMMARY_HEADERS: [&str; 4] = ["Category", "Type", "Total", "Count"];

/// Label of the closing row of each summary section
pub const TOTAL_LABEL: &str = "Total";

/// Transaction date cells, local time
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Month section rows
pub const MONTH_FORMAT: &str = "%Y-%m";

// Transaction columns
pub const COL_DATE: usize = 0;
pub const COL_TYPE: usize = 1;
pub const COL_CATEGORY: usize = 2;
pub const COL_AMOUNT: usize = 3;
pub const COL_NOTE: usize = 4;
