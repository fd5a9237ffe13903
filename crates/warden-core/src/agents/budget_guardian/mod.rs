//! Budget Guardian agent
//!
//! Watches every budget of the current month and warns about:
//! - projected overruns (spend so far plus recurring obligations)
//! - spending faster than a linear pace through the month
//! - spending well above the previous months' average
//! - user-defined alert thresholds
//!
//! Alerts and insights become notifications. Budget increases are only ever
//! proposed: they are stored as suggestions awaiting review.

pub mod analysis;
pub mod decisions;
pub mod patterns;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::agents::clock::{Clock, SystemClock};
use crate::agents::ports::{DecisionLogStore, FinancialStateReader, NotificationSink};
use crate::agents::runtime::Agent;
use crate::agents::types::{Action, AgentState, Cycle, DecisionLog, Insight};
use crate::config::GuardianConfig;
use crate::error::Result;
use crate::models::{
    Budget, MonthlySpendingPattern, NewNotification, NewSuggestion, RecurringTransaction,
    SuggestionType, Transaction, TransactionType,
};

pub use analysis::BudgetInsight;
pub use decisions::{BudgetAction, NotificationPayload, ReallocationPayload};

use patterns::{aggregate_monthly, history_window, month_start};

/// Registry name of the Budget Guardian
pub const NAME: &str = "BudgetGuardian";

/// Everything the guardian looks at in one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetObservation {
    pub budgets: Vec<Budget>,
    /// Non-deleted transactions since the start of the month
    pub transactions: Vec<Transaction>,
    pub recurring: Vec<RecurringTransaction>,
    pub historical_patterns: Vec<MonthlySpendingPattern>,
}

pub struct BudgetGuardian {
    reader: Arc<dyn FinancialStateReader>,
    sink: Arc<dyn NotificationSink>,
    decision_log: Arc<dyn DecisionLogStore>,
    clock: Arc<dyn Clock>,
    config: GuardianConfig,
}

impl BudgetGuardian {
    pub fn new(
        reader: Arc<dyn FinancialStateReader>,
        sink: Arc<dyn NotificationSink>,
        decision_log: Arc<dyn DecisionLogStore>,
    ) -> Self {
        Self {
            reader,
            sink,
            decision_log,
            clock: Arc::new(SystemClock),
            config: GuardianConfig::default(),
        }
    }

    /// Use one store for reads, notifications and the decision log
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: FinancialStateReader + NotificationSink + DecisionLogStore + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }

    pub fn with_config(mut self, config: GuardianConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &GuardianConfig {
        &self.config
    }

    async fn historical_patterns(&self, today: NaiveDate) -> Result<Vec<MonthlySpendingPattern>> {
        let (start, end) = history_window(today, self.config.historical.months_back)?;
        let transactions = self
            .reader
            .list_transactions_in_range(start, end, true, Some(TransactionType::Expense))
            .await?;
        Ok(aggregate_monthly(&transactions))
    }

    async fn execute(&self, action: &Action<BudgetAction>) -> Result<()> {
        match &action.payload {
            BudgetAction::SendAlert(payload)
            | BudgetAction::SendNotification(payload)
            | BudgetAction::SendInsight(payload) => {
                self.sink
                    .create_notification(NewNotification {
                        user_id: payload.user_id.clone(),
                        notification_type: payload.notification_type,
                        title: payload.title.clone(),
                        message: payload.message.clone(),
                        priority: action.priority.notification_level(),
                        metadata: json!({
                            "agent_generated": true,
                            "agent_name": NAME,
                            "reasoning": action.reasoning,
                        }),
                    })
                    .await
            }
            BudgetAction::SuggestReallocation(payload) => {
                self.sink
                    .create_suggestion(NewSuggestion {
                        user_id: payload.user_id.clone(),
                        suggestion_type: SuggestionType::BudgetReallocation,
                        suggested_value: payload.suggestion.clone(),
                        confidence_score: self.config.reallocation.confidence,
                        metadata: json!({
                            "agent_generated": true,
                            "agent_name": NAME,
                            "reasoning": action.reasoning,
                            "from_category": payload.from_category,
                            "suggested_increase": payload.suggested_increase,
                        }),
                    })
                    .await
            }
        }
    }
}

#[async_trait]
impl Agent for BudgetGuardian {
    type Observation = BudgetObservation;
    type Insight = BudgetInsight;
    type Action = BudgetAction;

    fn name(&self) -> &str {
        NAME
    }

    async fn observe(&self) -> Result<AgentState<BudgetObservation>> {
        let now = self.clock.now();
        let today = now.date_naive();
        let since = month_start(today)?;

        let (budgets, transactions, recurring, historical_patterns) = tokio::try_join!(
            self.reader.list_budgets(today.month(), today.year()),
            self.reader.list_transactions(since, true),
            self.reader.list_active_recurring(),
            self.historical_patterns(today),
        )?;

        let state = AgentState::new(
            now,
            BudgetObservation {
                budgets,
                transactions,
                recurring,
                historical_patterns,
            },
        );
        let counts = (
            state.data.budgets.len(),
            state.data.transactions.len(),
            state.data.recurring.len(),
            state.data.historical_patterns.len(),
        );

        Ok(state
            .with_metadata("budget_count", counts.0)
            .with_metadata("transaction_count", counts.1)
            .with_metadata("recurring_count", counts.2)
            .with_metadata("pattern_count", counts.3))
    }

    fn analyze(
        &self,
        state: &AgentState<BudgetObservation>,
    ) -> Result<Vec<Insight<BudgetInsight>>> {
        analysis::analyze(state, &self.config)
    }

    fn decide(&self, insights: &[Insight<BudgetInsight>]) -> Result<Vec<Action<BudgetAction>>> {
        Ok(decisions::decide(insights, &self.config))
    }

    async fn act(&self, actions: &[Action<BudgetAction>]) -> Result<()> {
        let mut failed = 0;
        for action in actions {
            if let Err(e) = self.execute(action).await {
                failed += 1;
                warn!(
                    agent = NAME,
                    action = action.payload.kind(),
                    error = %e,
                    "Failed to execute action"
                );
            }
        }

        if failed > 0 {
            warn!(
                agent = NAME,
                failed,
                total = actions.len(),
                "Some actions failed"
            );
        }
        Ok(())
    }

    async fn learn(
        &self,
        cycle: &Cycle<'_, BudgetObservation, BudgetInsight, BudgetAction>,
    ) -> Result<()> {
        // Suggestion accept/reject feedback is not yet fed back into thresholds
        info!(
            agent = NAME,
            insights = cycle.insights.len(),
            actions = cycle.actions.len(),
            high_severity = cycle.high_severity_count(),
            "Learning metrics"
        );
        Ok(())
    }

    async fn log_decision(
        &self,
        log: &DecisionLog<'_, BudgetObservation, BudgetInsight, BudgetAction>,
    ) {
        let record = match log.to_record() {
            Ok(record) => record,
            Err(e) => {
                warn!(agent = NAME, error = %e, "Failed to serialize decision log");
                return;
            }
        };

        let (insights, actions) = (record.insights_count, record.actions_count);
        match self.decision_log.append_decision_log(record).await {
            Ok(()) => info!(
                agent = NAME,
                insights,
                actions,
                elapsed_ms = log.metadata.execution_time_ms,
                "Logged decision"
            ),
            Err(e) => warn!(agent = NAME, error = %e, "Failed to log decision"),
        }
    }
}
