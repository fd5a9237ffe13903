//! Agent collaborator traits backed by SQLite
//!
//! Queries run on the blocking pool so agent loops never stall the runtime.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::Database;
use crate::agents::ports::{DecisionLogStore, FinancialStateReader, NotificationSink};
use crate::error::Result;
use crate::models::{
    Budget, NewDecisionLog, NewNotification, NewSuggestion, RecurringTransaction, Transaction,
    TransactionType,
};

#[async_trait]
impl FinancialStateReader for Database {
    async fn list_budgets(&self, month: u32, year: i32) -> Result<Vec<Budget>> {
        self.blocking(move |db| db.get_budgets(month, year)).await
    }

    async fn list_transactions(
        &self,
        since: NaiveDate,
        exclude_deleted: bool,
    ) -> Result<Vec<Transaction>> {
        self.blocking(move |db| db.get_transactions_since(since, exclude_deleted))
            .await
    }

    async fn list_active_recurring(&self) -> Result<Vec<RecurringTransaction>> {
        self.blocking(|db| db.list_recurring(false)).await
    }

    async fn list_transactions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        exclude_deleted: bool,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<Transaction>> {
        self.blocking(move |db| {
            db.get_transactions_in_range(start, end, exclude_deleted, transaction_type)
        })
        .await
    }
}

#[async_trait]
impl NotificationSink for Database {
    async fn create_notification(&self, notification: NewNotification) -> Result<()> {
        self.blocking(move |db| db.insert_notification(&notification).map(|_| ()))
            .await
    }

    async fn create_suggestion(&self, suggestion: NewSuggestion) -> Result<()> {
        self.blocking(move |db| db.insert_suggestion(&suggestion).map(|_| ()))
            .await
    }
}

#[async_trait]
impl DecisionLogStore for Database {
    async fn append_decision_log(&self, log: NewDecisionLog) -> Result<()> {
        self.blocking(move |db| db.insert_decision_log(&log).map(|_| ()))
            .await
    }
}
