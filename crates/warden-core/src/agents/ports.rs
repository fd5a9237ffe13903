//! External collaborators consumed by agents
//!
//! Agents never touch storage directly; they read through
//! [`FinancialStateReader`] and write through [`NotificationSink`] and
//! [`DecisionLogStore`]. [`crate::db::Database`] implements all three.
//! Implementations are expected to handle their own write concurrency.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{
    Budget, NewDecisionLog, NewNotification, NewSuggestion, RecurringTransaction, Transaction,
    TransactionType,
};
use crate::Result;

/// Read access to budgets and money movements
#[async_trait]
pub trait FinancialStateReader: Send + Sync {
    /// Budgets for a calendar month, across all users
    async fn list_budgets(&self, month: u32, year: i32) -> Result<Vec<Budget>>;

    /// Transactions dated on or after `since`
    async fn list_transactions(
        &self,
        since: NaiveDate,
        exclude_deleted: bool,
    ) -> Result<Vec<Transaction>>;

    /// Recurring transactions that are still active
    async fn list_active_recurring(&self) -> Result<Vec<RecurringTransaction>>;

    /// Transactions dated within `[start, end]`, optionally of one type
    async fn list_transactions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        exclude_deleted: bool,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<Transaction>>;
}

/// Destination for user-facing output of agent actions
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn create_notification(&self, notification: NewNotification) -> Result<()>;

    async fn create_suggestion(&self, suggestion: NewSuggestion) -> Result<()>;
}

/// Append-only audit trail of agent cycles
#[async_trait]
pub trait DecisionLogStore: Send + Sync {
    async fn append_decision_log(&self, log: NewDecisionLog) -> Result<()>;
}
