//! Category display formatting

use tabled::Tabled;

use crate::models::Category;

use super::render_table;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Order")]
    sort_order: i32,
}

/// Format categories as a table, in the order given
pub fn format_category_list(categories: &[&Category]) -> String {
    if categories.is_empty() {
        return "No categories found.".to_string();
    }

    render_table(
        categories
            .iter()
            .map(|c| CategoryRow {
                name: c.name.clone(),
                kind: c.kind.to_string(),
                sort_order: c.sort_order,
            })
            .collect(),
    )
}
