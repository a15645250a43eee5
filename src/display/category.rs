//! Category table and detail view

use tabled::Tabled;

use crate::models::Category;

use super::render_table;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Icon")]
    icon: String,
    #[tabled(rename = "Color")]
    color: String,
}

pub fn format_category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'cashiro init' to create the default categories.\n"
            .to_string();
    }

    let rows: Vec<_> = categories
        .iter()
        .map(|c| CategoryRow {
            id: c.id.to_string(),
            name: c.name.clone(),
            kind: c.kind.to_string(),
            icon: c.icon.clone(),
            color: c.color.clone(),
        })
        .collect();
    render_table(rows, &[])
}

pub fn format_category_details(
    category: &Category,
    transaction_count: usize,
    subscription_count: usize,
) -> String {
    let mut output = String::new();
    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:            {}\n", category.id));
    output.push_str(&format!("  Kind:          {}\n", category.kind));
    if !category.icon.is_empty() {
        output.push_str(&format!("  Icon:          {}\n", category.icon));
    }
    if !category.color.is_empty() {
        output.push_str(&format!("  Color:         {}\n", category.color));
    }
    output.push_str(&format!("  Transactions:  {}\n", transaction_count));
    output.push_str(&format!("  Subscriptions: {}\n", subscription_count));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryKind;

    #[test]
    fn test_format_category_list() {
        let categories = vec![
            Category::new("Salary", CategoryKind::Income),
            Category::with_style("Rent", CategoryKind::Expense, "home", "#FF0000", 1),
        ];
        let output = format_category_list(&categories);
        assert!(output.contains("Salary"));
        assert!(output.contains("Income"));
        assert!(output.contains("#FF0000"));
    }

    #[test]
    fn test_empty_list_points_to_init() {
        assert!(format_category_list(&[]).contains("cashiro init"));
    }

    #[test]
    fn test_details_show_usage() {
        let category = Category::new("Rent", CategoryKind::Expense);
        let output = format_category_details(&category, 12, 1);
        assert!(output.contains("Category: Rent"));
        assert!(output.contains("Transactions:  12"));
        assert!(output.contains("Subscriptions: 1"));
    }
}
