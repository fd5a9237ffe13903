//! Domain models for Warden
//!
//! Budgets, transactions and recurring transactions are read by agents;
//! notifications, suggestions and decision logs are written by them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A monthly spending budget for one user and category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    /// Opaque user identifier (owned by the authentication service)
    pub user_id: String,
    pub category: String,
    pub amount: f64,
    /// Calendar month, 1-12
    pub month: u32,
    pub year: i32,
    /// Percentage of the budget (0-100) at which the user wants a notification
    pub alert_threshold: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A budget to be inserted
#[derive(Debug, Clone)]
pub struct NewBudget {
    pub user_id: String,
    pub category: String,
    pub amount: f64,
    pub month: u32,
    pub year: i32,
    pub alert_threshold: Option<f64>,
}

/// Direction of money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub category: String,
    /// Always positive; direction is given by `transaction_type`
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub date: NaiveDate,
    pub description: Option<String>,
    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A new transaction (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: String,
    pub category: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Recurrence interval of a recurring transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            "YEARLY" | "ANNUAL" => Ok(Self::Yearly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scheduled recurring obligation (rent, subscriptions, salary)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTransaction {
    pub id: i64,
    pub user_id: String,
    pub category: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub frequency: Frequency,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A new recurring transaction (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewRecurringTransaction {
    pub user_id: String,
    pub category: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub frequency: Frequency,
    pub description: Option<String>,
}

/// Kind of user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    BudgetAlert,
    AnomalyDetection,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BudgetAlert => "BUDGET_ALERT",
            Self::AnomalyDetection => "ANOMALY_DETECTION",
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "BUDGET_ALERT" => Ok(Self::BudgetAlert),
            "ANOMALY_DETECTION" => Ok(Self::AnomalyDetection),
            _ => Err(format!("Unknown notification type: {}", s)),
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification to be delivered to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    /// 0 = normal, 1 = high, 2 = urgent
    pub priority: i32,
    pub metadata: serde_json::Value,
}

/// A persisted notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: i32,
    pub metadata: serde_json::Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Kind of AI suggestion awaiting review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionType {
    BudgetReallocation,
}

impl SuggestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BudgetReallocation => "BUDGET_REALLOCATION",
        }
    }
}

impl std::str::FromStr for SuggestionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "BUDGET_REALLOCATION" => Ok(Self::BudgetReallocation),
            _ => Err(format!("Unknown suggestion type: {}", s)),
        }
    }
}

/// Review status of a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl SuggestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for SuggestionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Unknown suggestion status: {}", s)),
        }
    }
}

/// A suggestion to be stored for human review (never applied automatically)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSuggestion {
    pub user_id: String,
    pub suggestion_type: SuggestionType,
    pub suggested_value: String,
    pub confidence_score: f64,
    pub metadata: serde_json::Value,
}

/// A persisted suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: i64,
    pub user_id: String,
    pub suggestion_type: SuggestionType,
    pub suggested_value: String,
    pub confidence_score: f64,
    pub metadata: serde_json::Value,
    pub status: SuggestionStatus,
    pub created_at: DateTime<Utc>,
}

/// One completed agent cycle, flattened for the decision log store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDecisionLog {
    pub agent_type: String,
    pub observation: serde_json::Value,
    pub insights: serde_json::Value,
    pub actions: serde_json::Value,
    pub reasoning: String,
    pub execution_time_ms: u64,
    pub insights_count: usize,
    pub actions_count: usize,
    pub high_severity_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// A persisted decision log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub id: i64,
    pub agent_type: String,
    pub observation: serde_json::Value,
    pub insights: serde_json::Value,
    pub actions: serde_json::Value,
    pub reasoning: String,
    pub execution_time_ms: u64,
    pub insights_count: usize,
    pub actions_count: usize,
    pub high_severity_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Per-month spending aggregate for one user and category
///
/// Derived from historical expense transactions each cycle; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySpendingPattern {
    pub user_id: String,
    pub month: u32,
    pub year: i32,
    pub category: String,
    pub total_spent: f64,
    pub transaction_count: usize,
    pub average_per_transaction: f64,
}
