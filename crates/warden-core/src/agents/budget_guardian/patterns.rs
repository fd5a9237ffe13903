//! Calendar helpers and historical spending aggregation

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};

use crate::error::{Error, Result};
use crate::models::{MonthlySpendingPattern, Transaction, TransactionType};

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> Result<NaiveDate> {
    date.with_day(1)
        .ok_or_else(|| Error::InvalidData(format!("No first day for {}", date)))
}

/// Number of days in the month containing `date`
pub fn days_in_month(date: NaiveDate) -> Result<u32> {
    let first = month_start(date)?;
    let next = first
        .checked_add_months(Months::new(1))
        .ok_or_else(|| Error::InvalidData(format!("Month after {} out of range", first)))?;
    Ok((next - first).num_days() as u32)
}

/// Inclusive date range covering the `months_back` full months before the
/// month containing `today`
pub fn history_window(today: NaiveDate, months_back: u32) -> Result<(NaiveDate, NaiveDate)> {
    let current = month_start(today)?;
    let start = current
        .checked_sub_months(Months::new(months_back))
        .ok_or_else(|| {
            Error::InvalidData(format!("History start before {} out of range", current))
        })?;
    let end = current
        .pred_opt()
        .ok_or_else(|| Error::InvalidData(format!("No day before {}", current)))?;
    Ok((start, end))
}

/// Group expense transactions by user, category and calendar month
///
/// Income is ignored. Output is ordered by user, category, year, month.
pub fn aggregate_monthly(transactions: &[Transaction]) -> Vec<MonthlySpendingPattern> {
    let mut groups: BTreeMap<(&str, &str, i32, u32), (f64, usize)> = BTreeMap::new();

    for tx in transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Expense)
    {
        let entry = groups
            .entry((
                tx.user_id.as_str(),
                tx.category.as_str(),
                tx.date.year(),
                tx.date.month(),
            ))
            .or_insert((0.0, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(
            |((user_id, category, year, month), (total_spent, transaction_count))| {
                MonthlySpendingPattern {
                    user_id: user_id.to_string(),
                    month,
                    year,
                    category: category.to_string(),
                    total_spent,
                    transaction_count,
                    average_per_transaction: total_spent / transaction_count as f64,
                }
            },
        )
        .collect()
}

/// Mean monthly spend for a user and category across the months that have
/// any spending; `None` when there is no history
pub fn average_monthly_spend(
    patterns: &[MonthlySpendingPattern],
    user_id: &str,
    category: &str,
) -> Option<f64> {
    let months: Vec<f64> = patterns
        .iter()
        .filter(|p| p.user_id == user_id && p.category == category)
        .map(|p| p.total_spent)
        .collect();

    if months.is_empty() {
        return None;
    }

    Some(months.iter().sum::<f64>() / months.len() as f64)
}
