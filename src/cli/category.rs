//! Category CLI commands

use clap::Subcommand;

use crate::display::format_category_list;
use crate::error::{PocketbookError, PocketbookResult};
use crate::models::CategoryType;
use crate::services::Session;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories, expense first
    List {
        /// Only show one type (income or expense)
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
    },

    /// Create a new category
    Add {
        /// Category name
        name: String,
        /// Category type (income or expense)
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: String,
    },
}

fn parse_kind(kind: &str) -> PocketbookResult<CategoryType> {
    CategoryType::parse(kind).ok_or_else(|| {
        PocketbookError::Config(format!(
            "Invalid category type: '{}'. Use income or expense",
            kind
        ))
    })
}

/// Handle a category command
pub fn handle_category_command(
    session: &mut Session,
    cmd: CategoryCommands,
) -> PocketbookResult<()> {
    match cmd {
        CategoryCommands::List { kind } => {
            let filter = kind.as_deref().map(parse_kind).transpose()?;
            let categories: Vec<_> = session
                .categories()
                .all()
                .into_iter()
                .filter(|c| filter.map_or(true, |k| c.kind == k))
                .collect();
            print!("{}", format_category_list(&categories));
        }

        CategoryCommands::Add { name, kind } => {
            let kind = parse_kind(&kind)?;
            let category = session.create_category(name.trim(), kind)?;
            session.save()?;
            println!("Created {} category: {}", category.kind, category.name);
        }
    }

    Ok(())
}
