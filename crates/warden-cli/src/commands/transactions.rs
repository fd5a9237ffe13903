//! Transaction and recurring transaction command implementations

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};
use warden_core::db::Database;
use warden_core::models::{Frequency, NewRecurringTransaction, NewTransaction, TransactionType};

use super::truncate;

fn parse_type(s: &str) -> Result<TransactionType> {
    s.parse::<TransactionType>().map_err(|e| anyhow!(e))
}

fn format_amount(amount: f64, transaction_type: TransactionType) -> String {
    match transaction_type {
        TransactionType::Expense => format!("\x1b[31m-${:.2}\x1b[0m", amount), // Red for expenses
        TransactionType::Income => format!("\x1b[32m+${:.2}\x1b[0m", amount), // Green for income
    }
}

pub fn cmd_transactions_list(db: &Database, limit: i64, include_deleted: bool) -> Result<()> {
    let transactions = db.list_recent_transactions(limit, include_deleted)?;

    if transactions.is_empty() {
        println!("No transactions found. Record one with:");
        println!("  warden transactions add --user me --category Dining --amount 42");
        return Ok(());
    }

    println!();
    println!("Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let deleted = if tx.deleted_at.is_some() {
            " (deleted)"
        } else {
            ""
        };
        println!(
            "   [{}] {} │ {:>10} │ {:<14} │ {}{}",
            tx.id,
            tx.date,
            format_amount(tx.amount, tx.transaction_type),
            truncate(&tx.category, 14),
            truncate(tx.description.as_deref().unwrap_or(""), 30),
            deleted
        );
    }

    Ok(())
}

pub fn cmd_transactions_add(
    db: &Database,
    user: &str,
    category: &str,
    amount: f64,
    transaction_type: &str,
    date: Option<&str>,
    description: Option<String>,
) -> Result<()> {
    let transaction_type = parse_type(transaction_type)?;
    let date = match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", d))?,
        None => Utc::now().date_naive(),
    };

    let id = db
        .create_transaction(&NewTransaction {
            user_id: user.to_string(),
            category: category.to_string(),
            amount,
            transaction_type,
            date,
            description,
        })
        .context("Failed to record transaction")?;

    println!(
        "Transaction [{}] recorded: {} {} on {}",
        id,
        category,
        format_amount(amount, transaction_type),
        date
    );

    Ok(())
}

pub fn cmd_transactions_delete(db: &Database, id: i64) -> Result<()> {
    let tx = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow!("Transaction {} not found", id))?;

    if tx.deleted_at.is_some() {
        println!("Transaction {} is already deleted.", id);
        return Ok(());
    }

    db.soft_delete_transaction(id)?;
    println!(
        "Deleted transaction [{}] {} │ {} │ {:.2}",
        tx.id, tx.date, tx.category, tx.amount
    );

    Ok(())
}

pub fn cmd_recurring_list(db: &Database, include_inactive: bool) -> Result<()> {
    let recurring = db.list_recurring(include_inactive)?;

    if recurring.is_empty() {
        println!("No recurring transactions.");
        return Ok(());
    }

    println!();
    println!("Recurring Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for r in recurring {
        let inactive = if r.is_active { "" } else { " (inactive)" };
        println!(
            "   [{}] {:<8} │ {:>10} │ {:<14} │ {}{}",
            r.id,
            r.frequency,
            format_amount(r.amount, r.transaction_type),
            truncate(&r.category, 14),
            truncate(r.description.as_deref().unwrap_or(""), 30),
            inactive
        );
    }

    Ok(())
}

pub fn cmd_recurring_add(
    db: &Database,
    user: &str,
    category: &str,
    amount: f64,
    transaction_type: &str,
    frequency: &str,
    description: Option<String>,
) -> Result<()> {
    let transaction_type = parse_type(transaction_type)?;
    let frequency = frequency.parse::<Frequency>().map_err(|e| anyhow!(e))?;

    let id = db
        .create_recurring(&NewRecurringTransaction {
            user_id: user.to_string(),
            category: category.to_string(),
            amount,
            transaction_type,
            frequency,
            description,
        })
        .context("Failed to save recurring transaction")?;

    println!(
        "Recurring [{}] saved: {} {} {}",
        id,
        frequency,
        category,
        format_amount(amount, transaction_type)
    );

    Ok(())
}

pub fn cmd_recurring_deactivate(db: &Database, id: i64) -> Result<()> {
    if !db.deactivate_recurring(id)? {
        bail!("Recurring transaction {} not found", id);
    }
    println!("Deactivated recurring transaction [{}]", id);
    Ok(())
}
