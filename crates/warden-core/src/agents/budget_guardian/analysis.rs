//! Budget health analysis
//!
//! Pure functions over an observed [`BudgetObservation`]. Each budget yields
//! between zero and four independent insights; nothing is deduplicated
//! across cycles.

use std::collections::HashMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agents::types::{AgentState, Insight, Severity};
use crate::config::GuardianConfig;
use crate::error::Result;
use crate::models::{Budget, TransactionType};

use super::patterns::{average_monthly_spend, days_in_month};
use super::BudgetObservation;

/// What the Budget Guardian can detect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetInsight {
    /// Spend plus remaining recurring obligations exceeds the budget
    BudgetOverrunRisk {
        user_id: String,
        category: String,
        budget_amount: f64,
        current_spent: f64,
        projected_total: f64,
        overrun_amount: f64,
        overrun_percent: f64,
        days_remaining: u32,
    },
    /// Spending faster than a linear pace through the month
    SpendingPaceAnomaly {
        user_id: String,
        category: String,
        current_spent: f64,
        expected_spending: f64,
        pace_ratio: f64,
        days_elapsed: u32,
        days_remaining: u32,
    },
    /// Spending well above the average of previous months
    HistoricalAnomaly {
        user_id: String,
        category: String,
        current_spent: f64,
        historical_average: f64,
        /// Percent above the average
        deviation: f64,
    },
    /// The user's own alert threshold has been reached
    ThresholdExceeded {
        user_id: String,
        category: String,
        spent_percent: f64,
        threshold_percent: f64,
        budget_amount: f64,
        current_spent: f64,
    },
}

/// Where in the month the observation falls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthProgress {
    pub days_in_month: u32,
    pub days_elapsed: u32,
    pub days_remaining: u32,
}

impl MonthProgress {
    pub fn from_state<D>(state: &AgentState<D>) -> Result<Self> {
        let today = state.timestamp.date_naive();
        let days_in_month = days_in_month(today)?;
        let days_elapsed = today.day();
        Ok(Self {
            days_in_month,
            days_elapsed,
            days_remaining: days_in_month.saturating_sub(days_elapsed),
        })
    }
}

/// Detect risks for every budget in the observation
pub fn analyze(
    state: &AgentState<BudgetObservation>,
    config: &GuardianConfig,
) -> Result<Vec<Insight<BudgetInsight>>> {
    let progress = MonthProgress::from_state(state)?;
    let data = &state.data;

    let mut spent: HashMap<(&str, &str), f64> = HashMap::new();
    for tx in data
        .transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Expense)
    {
        *spent
            .entry((tx.user_id.as_str(), tx.category.as_str()))
            .or_insert(0.0) += tx.amount;
    }

    let mut recurring: HashMap<(&str, &str), f64> = HashMap::new();
    for r in data
        .recurring
        .iter()
        .filter(|r| r.is_active && r.transaction_type == TransactionType::Expense)
    {
        *recurring
            .entry((r.user_id.as_str(), r.category.as_str()))
            .or_insert(0.0) += r.amount;
    }

    let mut insights = Vec::new();
    for budget in &data.budgets {
        if budget.amount <= 0.0 {
            debug!(
                budget_id = budget.id,
                category = %budget.category,
                "Skipping non-positive budget"
            );
            continue;
        }

        let key = (budget.user_id.as_str(), budget.category.as_str());
        let current_spent = spent.get(&key).copied().unwrap_or(0.0);
        let category_recurring = recurring.get(&key).copied().unwrap_or(0.0);
        let historical_average =
            average_monthly_spend(&data.historical_patterns, &budget.user_id, &budget.category);

        insights.extend(analyze_budget(
            budget,
            BudgetFigures {
                current_spent,
                category_recurring,
                historical_average,
            },
            progress,
            config,
        ));
    }

    Ok(insights)
}

/// Per-budget totals derived from the observation
#[derive(Debug, Clone, Copy)]
struct BudgetFigures {
    current_spent: f64,
    category_recurring: f64,
    historical_average: Option<f64>,
}

fn analyze_budget(
    budget: &Budget,
    figures: BudgetFigures,
    progress: MonthProgress,
    config: &GuardianConfig,
) -> Vec<Insight<BudgetInsight>> {
    let mut insights = Vec::new();
    let amount = budget.amount;
    let current_spent = figures.current_spent;

    let projected = current_spent + figures.category_recurring;
    if projected > amount {
        let overrun_amount = projected - amount;
        let overrun_percent = overrun_amount / amount * 100.0;
        let severity = if overrun_percent > config.overrun.critical_percent {
            Severity::Critical
        } else if overrun_percent > config.overrun.high_percent {
            Severity::High
        } else {
            Severity::Medium
        };

        insights.push(Insight::new(
            BudgetInsight::BudgetOverrunRisk {
                user_id: budget.user_id.clone(),
                category: budget.category.clone(),
                budget_amount: amount,
                current_spent,
                projected_total: projected,
                overrun_amount,
                overrun_percent,
                days_remaining: progress.days_remaining,
            },
            severity,
            config.overrun.confidence,
            format!(
                "Budget \"{}\" projected to exceed by ${:.2} ({:.1}%)",
                budget.category, overrun_amount, overrun_percent
            ),
        ));
    }

    let expected_spending =
        amount / progress.days_in_month as f64 * progress.days_elapsed as f64;
    let pace_ratio = current_spent / expected_spending;
    if pace_ratio > config.pace.anomaly_ratio
        && progress.days_elapsed > config.pace.min_days_elapsed
    {
        let severity = if pace_ratio > config.pace.high_ratio {
            Severity::High
        } else {
            Severity::Medium
        };

        insights.push(Insight::new(
            BudgetInsight::SpendingPaceAnomaly {
                user_id: budget.user_id.clone(),
                category: budget.category.clone(),
                current_spent,
                expected_spending,
                pace_ratio,
                days_elapsed: progress.days_elapsed,
                days_remaining: progress.days_remaining,
            },
            severity,
            config.pace.confidence,
            format!(
                "Spending pace is {:.0}% of expected for \"{}\"",
                pace_ratio * 100.0,
                budget.category
            ),
        ));
    }

    if let Some(average) = figures.historical_average.filter(|a| *a > 0.0) {
        if current_spent > average * config.historical.deviation_multiplier
            && progress.days_elapsed > config.historical.min_days_elapsed
        {
            insights.push(Insight::new(
                BudgetInsight::HistoricalAnomaly {
                    user_id: budget.user_id.clone(),
                    category: budget.category.clone(),
                    current_spent,
                    historical_average: average,
                    deviation: (current_spent / average - 1.0) * 100.0,
                },
                Severity::Medium,
                config.historical.confidence,
                format!(
                    "Spending on \"{}\" is {:.0}%+ above historical average",
                    budget.category,
                    (config.historical.deviation_multiplier - 1.0) * 100.0
                ),
            ));
        }
    }

    // A zero threshold counts as unset
    if let Some(threshold) = budget.alert_threshold.filter(|t| *t > 0.0) {
        let spent_percent = current_spent / amount * 100.0;
        if spent_percent >= threshold {
            let severity = if spent_percent >= config.threshold.high_percent {
                Severity::High
            } else {
                Severity::Medium
            };

            insights.push(Insight::new(
                BudgetInsight::ThresholdExceeded {
                    user_id: budget.user_id.clone(),
                    category: budget.category.clone(),
                    spent_percent,
                    threshold_percent: threshold,
                    budget_amount: amount,
                    current_spent,
                },
                severity,
                config.threshold.confidence,
                format!(
                    "Budget threshold ({}%) exceeded for \"{}\"",
                    threshold, budget.category
                ),
            ));
        }
    }

    insights
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::models::{
        Frequency, MonthlySpendingPattern, RecurringTransaction, Transaction,
    };

    const USER: &str = "user-1";

    fn budget(category: &str, amount: f64, threshold: Option<f64>) -> Budget {
        Budget {
            id: 1,
            user_id: USER.to_string(),
            category: category.to_string(),
            amount,
            month: 6,
            year: 2024,
            alert_threshold: threshold,
            created_at: Utc::now(),
        }
    }

    fn expense(category: &str, amount: f64) -> Transaction {
        Transaction {
            id: 1,
            user_id: USER.to_string(),
            category: category.to_string(),
            amount,
            transaction_type: TransactionType::Expense,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            description: None,
            deleted_at: None,
            created_at: Utc::now(),
        }
    }

    fn recurring(category: &str, amount: f64, kind: TransactionType) -> RecurringTransaction {
        RecurringTransaction {
            id: 1,
            user_id: USER.to_string(),
            category: category.to_string(),
            amount,
            transaction_type: kind,
            frequency: Frequency::Monthly,
            description: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Observation on the given day of June 2024 (30 days)
    fn state_on(day: u32, observation: BudgetObservation) -> AgentState<BudgetObservation> {
        AgentState::new(
            Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap(),
            observation,
        )
    }

    fn observation(budgets: Vec<Budget>, transactions: Vec<Transaction>) -> BudgetObservation {
        BudgetObservation {
            budgets,
            transactions,
            recurring: vec![],
            historical_patterns: vec![],
        }
    }

    /// One budget and one expense in the same category
    fn single(
        category: &str,
        amount: f64,
        threshold: Option<f64>,
        spent: f64,
    ) -> BudgetObservation {
        observation(
            vec![budget(category, amount, threshold)],
            vec![expense(category, spent)],
        )
    }

    fn run(state: &AgentState<BudgetObservation>) -> Vec<Insight<BudgetInsight>> {
        analyze(state, &GuardianConfig::default()).unwrap()
    }

    fn overruns(insights: &[Insight<BudgetInsight>]) -> Vec<&Insight<BudgetInsight>> {
        insights
            .iter()
            .filter(|i| matches!(i.kind, BudgetInsight::BudgetOverrunRisk { .. }))
            .collect()
    }

    #[test]
    fn test_month_progress() {
        let state = state_on(10, observation(vec![], vec![]));
        let progress = MonthProgress::from_state(&state).unwrap();
        assert_eq!(progress.days_in_month, 30);
        assert_eq!(progress.days_elapsed, 10);
        assert_eq!(progress.days_remaining, 20);
    }

    #[test]
    fn test_small_overrun_is_medium() {
        let state = state_on(28, single("Groceries", 1000.0, None, 1100.0));
        let insights = run(&state);

        let found = overruns(&insights);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Medium);
        assert_eq!(found[0].confidence.value(), 0.85);
        match &found[0].kind {
            BudgetInsight::BudgetOverrunRisk {
                overrun_amount,
                overrun_percent,
                days_remaining,
                ..
            } => {
                assert!((overrun_amount - 100.0).abs() < 1e-9);
                assert!((overrun_percent - 10.0).abs() < 1e-9);
                assert_eq!(*days_remaining, 2);
            }
            other => panic!("unexpected insight {:?}", other),
        }
    }

    #[test]
    fn test_overrun_severity_bands() {
        let cases = [
            (1200.0, Severity::Medium),
            (1260.0, Severity::High),
            (1500.0, Severity::High),
            (1510.0, Severity::Critical),
        ];

        for (spent, expected) in cases {
            let state = state_on(28, single("Rent", 1000.0, None, spent));
            let insights = run(&state);
            let found = overruns(&insights);
            assert_eq!(found.len(), 1, "spent {}", spent);
            assert_eq!(found[0].severity, expected, "spent {}", spent);
        }
    }

    #[test]
    fn test_recurring_expenses_count_toward_projection() {
        let mut obs = observation(
            vec![budget("Utilities", 200.0, None)],
            vec![expense("Utilities", 150.0)],
        );
        obs.recurring = vec![
            recurring("Utilities", 100.0, TransactionType::Expense),
            recurring("Utilities", 900.0, TransactionType::Income),
        ];
        let insights = run(&state_on(5, obs));

        let found = overruns(&insights);
        assert_eq!(found.len(), 1);
        match &found[0].kind {
            BudgetInsight::BudgetOverrunRisk { projected_total, .. } => {
                assert_eq!(*projected_total, 250.0)
            }
            other => panic!("unexpected insight {:?}", other),
        }
    }

    #[test]
    fn test_other_users_spending_is_ignored() {
        let mut other = expense("Dining", 5000.0);
        other.user_id = "user-2".to_string();
        let budgets = vec![budget("Dining", 300.0, Some(50.0))];
        let state = state_on(20, observation(budgets, vec![other]));

        assert!(run(&state).is_empty());
    }

    #[test]
    fn test_no_threshold_insight_without_alert_threshold() {
        let state = state_on(20, single("Dining", 300.0, None, 290.0));
        let insights = run(&state);

        assert!(!insights
            .iter()
            .any(|i| matches!(i.kind, BudgetInsight::ThresholdExceeded { .. })));
    }

    #[test]
    fn test_pace_anomaly_waits_past_first_week() {
        // 300 over 30 days expects 70 by day 7 and 80 by day 8
        let budgets = vec![budget("Dining", 300.0, None)];
        let spent = vec![expense("Dining", 200.0)];

        let day7 = run(&state_on(7, observation(budgets.clone(), spent.clone())));
        assert!(!day7
            .iter()
            .any(|i| matches!(i.kind, BudgetInsight::SpendingPaceAnomaly { .. })));

        let day8 = run(&state_on(8, observation(budgets, spent)));
        let pace: Vec<_> = day8
            .iter()
            .filter(|i| matches!(i.kind, BudgetInsight::SpendingPaceAnomaly { .. }))
            .collect();
        assert_eq!(pace.len(), 1);
        // 200 / 80 = 2.5x
        assert_eq!(pace[0].severity, Severity::High);
        assert_eq!(pace[0].confidence.value(), 0.75);
    }

    #[test]
    fn test_moderate_pace_is_medium() {
        // day 10 expects 100; 170 is 1.7x
        let state = state_on(10, single("Dining", 300.0, None, 170.0));
        let insights = run(&state);
        let pace = insights
            .iter()
            .find(|i| matches!(i.kind, BudgetInsight::SpendingPaceAnomaly { .. }))
            .unwrap();
        assert_eq!(pace.severity, Severity::Medium);
    }

    #[test]
    fn test_threshold_exceeded_dining_scenario() {
        let state = state_on(20, single("Dining", 300.0, Some(80.0), 260.0));
        let insights = run(&state);

        assert_eq!(insights.len(), 1);
        let insight = &insights[0];
        assert_eq!(insight.severity, Severity::Medium);
        assert_eq!(insight.confidence.value(), 1.0);
        match &insight.kind {
            BudgetInsight::ThresholdExceeded {
                spent_percent,
                threshold_percent,
                ..
            } => {
                assert!((spent_percent - 86.666).abs() < 0.01);
                assert_eq!(*threshold_percent, 80.0);
            }
            other => panic!("unexpected insight {:?}", other),
        }
    }

    #[test]
    fn test_threshold_high_at_ninety_percent() {
        let state = state_on(28, single("Dining", 300.0, Some(80.0), 270.0));
        let insights = run(&state);
        let threshold = insights
            .iter()
            .find(|i| matches!(i.kind, BudgetInsight::ThresholdExceeded { .. }))
            .unwrap();
        assert_eq!(threshold.severity, Severity::High);
    }

    #[test]
    fn test_historical_anomaly_after_two_weeks() {
        let mut obs = observation(
            vec![budget("Travel", 1000.0, None)],
            vec![expense("Travel", 400.0)],
        );
        obs.historical_patterns = vec![MonthlySpendingPattern {
            user_id: USER.to_string(),
            month: 5,
            year: 2024,
            category: "Travel".to_string(),
            total_spent: 200.0,
            transaction_count: 2,
            average_per_transaction: 100.0,
        }];

        let early = run(&state_on(14, obs.clone()));
        assert!(!early
            .iter()
            .any(|i| matches!(i.kind, BudgetInsight::HistoricalAnomaly { .. })));

        let later = run(&state_on(15, obs));
        let historical = later
            .iter()
            .find(|i| matches!(i.kind, BudgetInsight::HistoricalAnomaly { .. }))
            .unwrap();
        assert_eq!(historical.severity, Severity::Medium);
        assert_eq!(historical.confidence.value(), 0.70);
        match &historical.kind {
            BudgetInsight::HistoricalAnomaly { deviation, .. } => {
                assert!((deviation - 100.0).abs() < 1e-9)
            }
            other => panic!("unexpected insight {:?}", other),
        }
    }

    #[test]
    fn test_non_positive_budget_skipped() {
        let state = state_on(20, single("Gifts", 0.0, Some(50.0), 10.0));
        assert!(run(&state).is_empty());
    }

    #[test]
    fn test_thresholds_come_from_config() {
        let mut config = GuardianConfig::default();
        config.pace.min_days_elapsed = 3;

        let state = state_on(5, single("Dining", 300.0, None, 200.0));
        let insights = analyze(&state, &config).unwrap();
        assert!(insights
            .iter()
            .any(|i| matches!(i.kind, BudgetInsight::SpendingPaceAnomaly { .. })));
    }
}
