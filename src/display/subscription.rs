//! Subscription table and detail view

use chrono::NaiveDate;
use tabled::Tabled;

use crate::currency::format_amount;
use crate::models::Subscription;

use super::{render_table, NameLookup};

#[derive(Tabled)]
struct SubscriptionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Frequency")]
    frequency: String,
    #[tabled(rename = "Next Due")]
    next_due: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Account")]
    account: String,
}

fn due_phrase(days: i64) -> String {
    match days {
        0 => "today".into(),
        1 => "tomorrow".into(),
        d if d < 0 => format!("{} day(s) late", -d),
        d => format!("in {} days", d),
    }
}

pub fn format_subscription_list(
    subscriptions: &[Subscription],
    names: &NameLookup,
    today: NaiveDate,
    reminder_days: u32,
) -> String {
    if subscriptions.is_empty() {
        return "No subscriptions found.\n".to_string();
    }

    let rows: Vec<_> = subscriptions
        .iter()
        .map(|s| {
            let status = s.status(today, reminder_days);
            let next_due = if s.active {
                format!("{} ({})", s.next_due(), due_phrase(s.days_until_due(today)))
            } else {
                s.next_due().to_string()
            };
            SubscriptionRow {
                id: s.id.to_string(),
                name: s.name.clone(),
                amount: format_amount(s.amount, names.currency(s.account_id)),
                frequency: s.frequency.to_string(),
                next_due,
                status: status.to_string(),
                account: names.account(s.account_id).to_string(),
            }
        })
        .collect();

    render_table(rows, &[2])
}

pub fn format_subscription_details(
    subscription: &Subscription,
    names: &NameLookup,
    today: NaiveDate,
    reminder_days: u32,
) -> String {
    let currency = names.currency(subscription.account_id);
    let mut output = String::new();

    output.push_str(&format!("Subscription: {}\n", subscription.name));
    output.push_str(&format!("  ID:           {}\n", subscription.id));
    output.push_str(&format!(
        "  Amount:       {} {}\n",
        format_amount(subscription.amount, currency),
        subscription.frequency.to_string().to_lowercase()
    ));
    output.push_str(&format!(
        "  Per month:    {}\n",
        format_amount(subscription.monthly_cost(), currency)
    ));
    output.push_str(&format!(
        "  Per year:     {}\n",
        format_amount(subscription.yearly_cost(), currency)
    ));
    output.push_str(&format!(
        "  Account:      {}\n",
        names.account(subscription.account_id)
    ));
    output.push_str(&format!(
        "  Category:     {}\n",
        names.category(subscription.category_id)
    ));
    output.push_str(&format!("  Started:      {}\n", subscription.start_date));
    output.push_str(&format!(
        "  Status:       {}\n",
        subscription.status(today, reminder_days)
    ));
    output.push_str(&format!(
        "  Next due:     {} ({})\n",
        subscription.next_due(),
        due_phrase(subscription.days_until_due(today))
    ));
    output.push_str(&format!("  Payments:     {}\n", subscription.payments_made));
    if let Some(paid) = subscription.last_paid_on {
        output.push_str(&format!("  Last paid:    {}\n", paid));
    }
    if !subscription.notes.is_empty() {
        output.push_str(&format!("  Notes:        {}\n", subscription.notes));
    }
    output
}
