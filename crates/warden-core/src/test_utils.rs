//! Test utilities for warden-core
//!
//! - [`MemoryStore`]: in-memory implementation of every agent collaborator,
//!   with switches to make reads or writes fail
//! - [`ScriptedAgent`]: a minimal agent that records which stages ran and can be
//!   told to fail, panic or stall on chosen cycles

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::ports::{DecisionLogStore, FinancialStateReader, NotificationSink};
use crate::agents::runtime::Agent;
use crate::agents::types::{Action, AgentState, Cycle, DecisionLog, Insight, Priority, Severity};
use crate::error::{Error, Result};
use crate::models::{
    Budget, NewDecisionLog, NewNotification, NewSuggestion, RecurringTransaction, Transaction,
    TransactionType,
};

/// In-memory financial store
#[derive(Default)]
pub struct MemoryStore {
    budgets: Mutex<Vec<Budget>>,
    transactions: Mutex<Vec<Transaction>>,
    recurring: Mutex<Vec<RecurringTransaction>>,
    notifications: Mutex<Vec<NewNotification>>,
    suggestions: Mutex<Vec<NewSuggestion>>,
    decision_logs: Mutex<Vec<NewDecisionLog>>,
    history_ranges: Mutex<Vec<(NaiveDate, NaiveDate)>>,
    fail_reads: AtomicBool,
    fail_decision_log: AtomicBool,
    /// Notification titles that fail to persist
    failing_titles: Mutex<HashSet<String>>,
    next_id: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1
    }

    /// Add a budget; returns its id
    pub fn add_budget(
        &self,
        user_id: &str,
        category: &str,
        amount: f64,
        month: u32,
        year: i32,
        alert_threshold: Option<f64>,
    ) -> i64 {
        let id = self.id();
        self.budgets.lock().unwrap().push(Budget {
            id,
            user_id: user_id.to_string(),
            category: category.to_string(),
            amount,
            month,
            year,
            alert_threshold,
            created_at: Utc::now(),
        });
        id
    }

    /// Add a transaction; returns its id
    pub fn add_transaction(
        &self,
        user_id: &str,
        category: &str,
        amount: f64,
        transaction_type: TransactionType,
        date: NaiveDate,
    ) -> i64 {
        let id = self.id();
        self.transactions.lock().unwrap().push(Transaction {
            id,
            user_id: user_id.to_string(),
            category: category.to_string(),
            amount,
            transaction_type,
            date,
            description: None,
            deleted_at: None,
            created_at: Utc::now(),
        });
        id
    }

    /// Soft-delete a transaction
    pub fn delete_transaction(&self, id: i64) {
        for tx in self.transactions.lock().unwrap().iter_mut() {
            if tx.id == id {
                tx.deleted_at = Some(Utc::now());
            }
        }
    }

    /// Add a monthly recurring transaction; returns its id
    pub fn add_recurring(
        &self,
        user_id: &str,
        category: &str,
        amount: f64,
        transaction_type: TransactionType,
        is_active: bool,
    ) -> i64 {
        let id = self.id();
        self.recurring.lock().unwrap().push(RecurringTransaction {
            id,
            user_id: user_id.to_string(),
            category: category.to_string(),
            amount,
            transaction_type,
            frequency: crate::models::Frequency::Monthly,
            description: None,
            is_active,
            created_at: Utc::now(),
        });
        id
    }

    /// Make every read fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make decision log appends fail
    pub fn fail_decision_log(&self, fail: bool) {
        self.fail_decision_log.store(fail, Ordering::SeqCst);
    }

    /// Make notifications with this exact title fail
    pub fn fail_notification_titled(&self, title: &str) {
        self.failing_titles.lock().unwrap().insert(title.into());
    }

    pub fn notifications(&self) -> Vec<NewNotification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn suggestions(&self) -> Vec<NewSuggestion> {
        self.suggestions.lock().unwrap().clone()
    }

    pub fn decision_logs(&self) -> Vec<NewDecisionLog> {
        self.decision_logs.lock().unwrap().clone()
    }

    /// Date ranges requested through `list_transactions_in_range`
    pub fn history_ranges(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.history_ranges.lock().unwrap().clone()
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::InvalidData("simulated read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FinancialStateReader for MemoryStore {
    async fn list_budgets(&self, month: u32, year: i32) -> Result<Vec<Budget>> {
        self.check_reads()?;
        Ok(self
            .budgets
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.month == month && b.year == year)
            .cloned()
            .collect())
    }

    async fn list_transactions(
        &self,
        since: NaiveDate,
        exclude_deleted: bool,
    ) -> Result<Vec<Transaction>> {
        self.check_reads()?;
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.date >= since && !(exclude_deleted && t.deleted_at.is_some()))
            .cloned()
            .collect())
    }

    async fn list_active_recurring(&self) -> Result<Vec<RecurringTransaction>> {
        self.check_reads()?;
        Ok(self
            .recurring
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }

    async fn list_transactions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        exclude_deleted: bool,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<Transaction>> {
        self.check_reads()?;
        self.history_ranges.lock().unwrap().push((start, end));
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.date >= start && t.date <= end)
            .filter(|t| !(exclude_deleted && t.deleted_at.is_some()))
            .filter(|t| transaction_type.map_or(true, |tt| t.transaction_type == tt))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationSink for MemoryStore {
    async fn create_notification(&self, notification: NewNotification) -> Result<()> {
        let title = &notification.title;
        if self.failing_titles.lock().unwrap().contains(title) {
            return Err(Error::InvalidData("simulated notification failure".to_string()));
        }
        self.notifications.lock().unwrap().push(notification);
        Ok(())
    }

    async fn create_suggestion(&self, suggestion: NewSuggestion) -> Result<()> {
        self.suggestions.lock().unwrap().push(suggestion);
        Ok(())
    }
}

#[async_trait]
impl DecisionLogStore for MemoryStore {
    async fn append_decision_log(&self, log: NewDecisionLog) -> Result<()> {
        if self.fail_decision_log.load(Ordering::SeqCst) {
            return Err(Error::InvalidData("simulated log failure".to_string()));
        }
        self.decision_logs.lock().unwrap().push(log);
        Ok(())
    }
}

/// Insight emitted by [`ScriptedAgent`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScriptedInsight {
    Reading { value: f64 },
}

/// Action emitted by [`ScriptedAgent`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScriptedAction {
    Ping,
}

/// Scriptable agent for runtime and orchestrator tests
///
/// Cycle numbers are 1-based counts of `observe` calls.
pub struct ScriptedAgent {
    name: String,
    observe_calls: AtomicUsize,
    failing: Vec<usize>,
    panicking: Vec<usize>,
    slow: Vec<usize>,
    slow_for: Duration,
    stages: Mutex<Vec<&'static str>>,
    logged: Mutex<Vec<NewDecisionLog>>,
    errors_handled: AtomicUsize,
}

impl ScriptedAgent {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            observe_calls: AtomicUsize::new(0),
            failing: vec![],
            panicking: vec![],
            slow: vec![],
            slow_for: Duration::ZERO,
            stages: Mutex::new(vec![]),
            logged: Mutex::new(vec![]),
            errors_handled: AtomicUsize::new(0),
        }
    }

    /// Return an error from `observe` on these cycles
    pub fn failing_observe_on(mut self, cycles: &[usize]) -> Self {
        self.failing = cycles.to_vec();
        self
    }

    /// Panic inside `observe` on these cycles
    pub fn panicking_observe_on(mut self, cycles: &[usize]) -> Self {
        self.panicking = cycles.to_vec();
        self
    }

    /// Sleep inside `observe` on these cycles
    pub fn slow_observe_on(mut self, cycles: &[usize], duration: Duration) -> Self {
        self.slow = cycles.to_vec();
        self.slow_for = duration;
        self
    }

    pub fn observe_calls(&self) -> usize {
        self.observe_calls.load(Ordering::SeqCst)
    }

    pub fn stages(&self) -> Vec<&'static str> {
        self.stages.lock().unwrap().clone()
    }

    pub fn logged(&self) -> Vec<NewDecisionLog> {
        self.logged.lock().unwrap().clone()
    }

    pub fn errors_handled(&self) -> usize {
        self.errors_handled.load(Ordering::SeqCst)
    }

    fn record(&self, stage: &'static str) {
        self.stages.lock().unwrap().push(stage);
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    type Observation = usize;
    type Insight = ScriptedInsight;
    type Action = ScriptedAction;

    fn name(&self) -> &str {
        &self.name
    }

    async fn observe(&self) -> Result<AgentState<usize>> {
        let call = self.observe_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.record("observe");

        if self.slow.contains(&call) {
            tokio::time::sleep(self.slow_for).await;
        }
        if self.panicking.contains(&call) {
            panic!("scripted panic on cycle {}", call);
        }
        if self.failing.contains(&call) {
            return Err(Error::Agent(format!("scripted failure on cycle {}", call)));
        }

        Ok(AgentState::new(Utc::now(), call))
    }

    fn analyze(&self, state: &AgentState<usize>) -> Result<Vec<Insight<ScriptedInsight>>> {
        self.record("analyze");
        Ok(vec![Insight::new(
            ScriptedInsight::Reading {
                value: state.data as f64,
            },
            Severity::High,
            0.9,
            "scripted reading",
        )])
    }

    fn decide(&self, insights: &[Insight<ScriptedInsight>]) -> Result<Vec<Action<ScriptedAction>>> {
        self.record("decide");
        Ok(insights
            .iter()
            .map(|_| Action::new(ScriptedAction::Ping, Priority::Low, "ping"))
            .collect())
    }

    async fn act(&self, _actions: &[Action<ScriptedAction>]) -> Result<()> {
        self.record("act");
        Ok(())
    }

    async fn learn(
        &self,
        _cycle: &Cycle<'_, usize, ScriptedInsight, ScriptedAction>,
    ) -> Result<()> {
        self.record("learn");
        Ok(())
    }

    async fn log_decision(&self, log: &DecisionLog<'_, usize, ScriptedInsight, ScriptedAction>) {
        self.record("log_decision");
        if let Ok(record) = log.to_record() {
            self.logged.lock().unwrap().push(record);
        }
    }

    async fn handle_error(&self, _error: &Error) {
        self.errors_handled.fetch_add(1, Ordering::SeqCst);
    }
}
