//! Mapping from budget insights to actions
//!
//! | Insight                            | Action                          |
//! |------------------------------------|---------------------------------|
//! | overrun risk, high or critical     | alert + reallocation suggestion |
//! | threshold exceeded                 | notification                    |
//! | pace anomaly, high                 | insight notification            |
//! | historical anomaly                 | insight notification (low)      |
//!
//! Everything else produces no action.

use serde::{Deserialize, Serialize};

use crate::agents::types::{Action, Insight, Priority, Severity};
use crate::config::GuardianConfig;
use crate::models::NotificationType;

use super::analysis::BudgetInsight;

/// A user-facing message to persist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub user_id: String,
    pub category: String,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
}

/// A proposed budget change, stored for the user to review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReallocationPayload {
    pub user_id: String,
    pub from_category: String,
    pub suggested_increase: f64,
    pub suggestion: String,
}

/// What the Budget Guardian can do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetAction {
    SendAlert(NotificationPayload),
    SendNotification(NotificationPayload),
    SendInsight(NotificationPayload),
    SuggestReallocation(ReallocationPayload),
}

impl BudgetAction {
    pub fn kind(&self) -> &'static str {
        match self {
            BudgetAction::SendAlert(_) => "SEND_ALERT",
            BudgetAction::SendNotification(_) => "SEND_NOTIFICATION",
            BudgetAction::SendInsight(_) => "SEND_INSIGHT",
            BudgetAction::SuggestReallocation(_) => "SUGGEST_REALLOCATION",
        }
    }
}

/// Decide actions for a batch of insights
///
/// Deterministic: the same insights always yield the same actions, in the
/// same order.
pub fn decide(
    insights: &[Insight<BudgetInsight>],
    config: &GuardianConfig,
) -> Vec<Action<BudgetAction>> {
    insights
        .iter()
        .flat_map(|insight| actions_for(insight, config))
        .collect()
}

fn actions_for(
    insight: &Insight<BudgetInsight>,
    config: &GuardianConfig,
) -> Vec<Action<BudgetAction>> {
    match &insight.kind {
        BudgetInsight::BudgetOverrunRisk {
            user_id,
            category,
            budget_amount,
            projected_total,
            overrun_amount,
            days_remaining,
            ..
        } if insight.severity.is_high() => {
            let priority = if insight.severity == Severity::Critical {
                Priority::Urgent
            } else {
                Priority::High
            };
            let multiplier = config.reallocation.buffer_multiplier;
            let increase = overrun_amount * multiplier;

            vec![
                Action::new(
                    BudgetAction::SendAlert(NotificationPayload {
                        user_id: user_id.clone(),
                        category: category.clone(),
                        title: format!("Budget Alert: {}", category),
                        message: format!(
                            "Your {} budget is projected to exceed by ${:.2} with {} days remaining.",
                            category, overrun_amount, days_remaining
                        ),
                        notification_type: NotificationType::BudgetAlert,
                    }),
                    priority,
                    format!(
                        "Projected spending (${:.2}) exceeds budget (${:.2})",
                        projected_total, budget_amount
                    ),
                ),
                Action::new(
                    BudgetAction::SuggestReallocation(ReallocationPayload {
                        user_id: user_id.clone(),
                        from_category: category.clone(),
                        suggested_increase: increase,
                        suggestion: format!(
                            "Consider reducing discretionary spending or increasing budget by ${:.2}",
                            increase
                        ),
                    }),
                    Priority::Medium,
                    format!(
                        "Allow {:.0}% buffer for unexpected expenses",
                        (multiplier - 1.0) * 100.0
                    ),
                )
                .requiring_approval(),
            ]
        }

        BudgetInsight::ThresholdExceeded {
            user_id,
            category,
            spent_percent,
            threshold_percent,
            ..
        } => vec![Action::new(
            BudgetAction::SendNotification(NotificationPayload {
                user_id: user_id.clone(),
                category: category.clone(),
                title: format!("Budget Threshold Reached: {}", category),
                message: format!(
                    "You've reached {:.1}% of your {} budget.",
                    spent_percent, category
                ),
                notification_type: NotificationType::BudgetAlert,
            }),
            Priority::Medium,
            format!("User-defined threshold ({}%) exceeded", threshold_percent),
        )],

        BudgetInsight::SpendingPaceAnomaly {
            user_id,
            category,
            pace_ratio,
            ..
        } if insight.severity == Severity::High => vec![Action::new(
            BudgetAction::SendInsight(NotificationPayload {
                user_id: user_id.clone(),
                category: category.clone(),
                title: format!("Spending Pace Alert: {}", category),
                message: format!(
                    "You're spending {:.0}% faster than expected. Consider slowing down to stay within budget.",
                    pace_ratio * 100.0
                ),
                notification_type: NotificationType::AnomalyDetection,
            }),
            Priority::Medium,
            format!(
                "Spending pace significantly above expected ({:.2}x)",
                pace_ratio
            ),
        )],

        BudgetInsight::HistoricalAnomaly {
            user_id,
            category,
            deviation,
            ..
        } => vec![Action::new(
            BudgetAction::SendInsight(NotificationPayload {
                user_id: user_id.clone(),
                category: category.clone(),
                title: format!("Spending Trend: {}", category),
                message: format!(
                    "Your {} spending is {:.1}% above your historical average.",
                    category, deviation
                ),
                notification_type: NotificationType::AnomalyDetection,
            }),
            Priority::Low,
            "Historical pattern deviation detected",
        )],

        _ => vec![],
    }
}
