//! Transaction and recurring transaction operations

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};

use super::{
    format_datetime, parse_date, parse_datetime, parse_enum, validate_amount, Database,
};
use crate::error::Result;
use crate::models::{
    NewRecurringTransaction, NewTransaction, RecurringTransaction, Transaction, TransactionType,
};

const TRANSACTION_COLUMNS: &str =
    "id, user_id, category, amount, transaction_type, date, description, deleted_at, created_at";

const RECURRING_COLUMNS: &str =
    "id, user_id, category, amount, transaction_type, frequency, description, is_active, created_at";

fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
    let transaction_type: String = row.get(4)?;
    let date: String = row.get(5)?;
    let deleted_at: Option<String> = row.get(7)?;
    let created_at: String = row.get(8)?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        transaction_type: parse_enum(4, &transaction_type)?,
        date: parse_date(5, &date)?,
        description: row.get(6)?,
        deleted_at: deleted_at.map(|s| parse_datetime(&s)),
        created_at: parse_datetime(&created_at),
    })
}

fn row_to_recurring(row: &rusqlite::Row) -> rusqlite::Result<RecurringTransaction> {
    let transaction_type: String = row.get(4)?;
    let frequency: String = row.get(5)?;
    let created_at: String = row.get(8)?;

    Ok(RecurringTransaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        transaction_type: parse_enum(4, &transaction_type)?,
        frequency: parse_enum(5, &frequency)?,
        description: row.get(6)?,
        is_active: row.get(7)?,
        created_at: parse_datetime(&created_at),
    })
}

impl Database {
    /// Insert a transaction; returns its id
    pub fn create_transaction(&self, tx: &NewTransaction) -> Result<i64> {
        validate_amount(tx.amount)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (user_id, category, amount, transaction_type, date, description)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.user_id,
                tx.category,
                tx.amount,
                tx.transaction_type.as_str(),
                tx.date.to_string(),
                tx.description,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a transaction by id, including soft-deleted ones
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!(
                    "SELECT {} FROM transactions WHERE id = ?",
                    TRANSACTION_COLUMNS
                ),
                params![id],
                row_to_transaction,
            )
            .optional()?;
        Ok(tx)
    }

    /// Most recent transactions first
    pub fn list_recent_transactions(
        &self,
        limit: i64,
        include_deleted: bool,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM transactions
            WHERE (? OR deleted_at IS NULL)
            ORDER BY date DESC, id DESC
            LIMIT ?
            "#,
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map(params![include_deleted, limit], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Transactions dated on or after `since`
    pub fn get_transactions_since(
        &self,
        since: NaiveDate,
        exclude_deleted: bool,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM transactions
            WHERE date >= ? AND (NOT ? OR deleted_at IS NULL)
            ORDER BY date DESC, id DESC
            "#,
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map(
                params![since.to_string(), exclude_deleted],
                row_to_transaction,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Transactions dated within `[start, end]`, optionally of one type
    pub fn get_transactions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        exclude_deleted: bool,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM transactions
            WHERE date >= ? AND date <= ?
              AND (NOT ? OR deleted_at IS NULL)
              AND (? IS NULL OR transaction_type = ?)
            ORDER BY date, id
            "#,
            TRANSACTION_COLUMNS
        ))?;

        let type_str = transaction_type.map(|t| t.as_str());
        let transactions = stmt
            .query_map(
                params![
                    start.to_string(),
                    end.to_string(),
                    exclude_deleted,
                    type_str,
                    type_str,
                ],
                row_to_transaction,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Soft-delete a transaction; returns false if missing or already deleted
    pub fn soft_delete_transaction(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE transactions SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(updated > 0)
    }

    /// Insert a recurring transaction (active); returns its id
    pub fn create_recurring(&self, recurring: &NewRecurringTransaction) -> Result<i64> {
        validate_amount(recurring.amount)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO recurring_transactions
                (user_id, category, amount, transaction_type, frequency, description, is_active)
            VALUES (?, ?, ?, ?, ?, ?, 1)
            "#,
            params![
                recurring.user_id,
                recurring.category,
                recurring.amount,
                recurring.transaction_type.as_str(),
                recurring.frequency.as_str(),
                recurring.description,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List recurring transactions
    pub fn list_recurring(&self, include_inactive: bool) -> Result<Vec<RecurringTransaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM recurring_transactions
            WHERE (? OR is_active = 1)
            ORDER BY user_id, category, id
            "#,
            RECURRING_COLUMNS
        ))?;

        let recurring = stmt
            .query_map(params![include_inactive], row_to_recurring)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(recurring)
    }

    /// Stop a recurring transaction from counting toward projections
    pub fn deactivate_recurring(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE recurring_transactions SET is_active = 0 WHERE id = ? AND is_active = 1",
            params![id],
        )?;
        Ok(updated > 0)
    }
}
