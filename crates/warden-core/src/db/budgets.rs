//! Budget operations

use rusqlite::params;

use super::{parse_datetime, validate_amount, Database};
use crate::error::{Error, Result};
use crate::models::{Budget, NewBudget};

const BUDGET_COLUMNS: &str =
    "id, user_id, category, amount, month, year, alert_threshold, created_at";

fn row_to_budget(row: &rusqlite::Row) -> rusqlite::Result<Budget> {
    let created_at: String = row.get(7)?;
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        month: row.get(4)?,
        year: row.get(5)?,
        alert_threshold: row.get(6)?,
        created_at: parse_datetime(&created_at),
    })
}

impl Database {
    /// Create or replace the budget for a user, category and month
    ///
    /// Returns the budget id (the existing id when replacing).
    pub fn upsert_budget(&self, budget: &NewBudget) -> Result<i64> {
        validate_amount(budget.amount)?;
        if !(1..=12).contains(&budget.month) {
            return Err(Error::InvalidData(format!("Month must be 1-12, got {}", budget.month)));
        }
        if let Some(threshold) = budget.alert_threshold {
            if !(0.0..=100.0).contains(&threshold) {
                return Err(Error::InvalidData(format!(
                    "Alert threshold must be a percentage (0-100), got {}",
                    threshold
                )));
            }
        }

        let conn = self.conn()?;
        let id = conn.query_row(
            r#"
            INSERT INTO budgets (user_id, category, amount, month, year, alert_threshold)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, category, month, year) DO UPDATE SET
                amount = excluded.amount,
                alert_threshold = excluded.alert_threshold
            RETURNING id
            "#,
            params![
                budget.user_id,
                budget.category,
                budget.amount,
                budget.month,
                budget.year,
                budget.alert_threshold,
            ],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    /// Budgets for a calendar month, across all users
    pub fn get_budgets(&self, month: u32, year: i32) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budgets WHERE month = ? AND year = ? ORDER BY user_id, category",
            BUDGET_COLUMNS
        ))?;

        let budgets = stmt
            .query_map(params![month, year], row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    /// Delete a budget; returns whether it existed
    pub fn delete_budget(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM budgets WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
