//! Budget command implementations

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use warden_core::db::Database;
use warden_core::models::NewBudget;

/// Resolve an optional month/year pair against today
fn month_or_current(month: Option<u32>, year: Option<i32>) -> (u32, i32) {
    let today = Utc::now().date_naive();
    (month.unwrap_or(today.month()), year.unwrap_or(today.year()))
}

pub fn cmd_budgets_list(db: &Database, month: Option<u32>, year: Option<i32>) -> Result<()> {
    let (month, year) = month_or_current(month, year);
    let budgets = db.get_budgets(month, year)?;

    if budgets.is_empty() {
        println!("No budgets for {}/{}. Add one with:", month, year);
        println!("  warden budgets add --user me --category Dining --amount 300");
        return Ok(());
    }

    println!();
    println!("Budgets for {}/{}", month, year);
    println!("   ─────────────────────────────────────────────────────────────");

    for budget in budgets {
        let threshold = budget
            .alert_threshold
            .map(|t| format!("alert at {:.0}%", t))
            .unwrap_or_default();
        println!(
            "   [{}] {:<12} │ {:<16} │ {:>10.2} │ {}",
            budget.id, budget.user_id, budget.category, budget.amount, threshold
        );
    }

    Ok(())
}

pub fn cmd_budgets_add(
    db: &Database,
    user: &str,
    category: &str,
    amount: f64,
    month: Option<u32>,
    year: Option<i32>,
    threshold: Option<f64>,
) -> Result<()> {
    let (month, year) = month_or_current(month, year);

    let id = db
        .upsert_budget(&NewBudget {
            user_id: user.to_string(),
            category: category.to_string(),
            amount,
            month,
            year,
            alert_threshold: threshold,
        })
        .context("Failed to save budget")?;

    println!(
        "Budget [{}] saved: {} {} {:.2} for {}/{}",
        id, user, category, amount, month, year
    );

    Ok(())
}
