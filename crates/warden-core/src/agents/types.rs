//! Core types shared by every agent

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::NewDecisionLog;
use crate::Result;

/// Severity level of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// High and critical insights count as high-priority patterns
    pub fn is_high(&self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Numeric priority stored on notifications: urgent = 2, high = 1, else 0
    pub fn notification_level(&self) -> i32 {
        match self {
            Priority::Urgent => 2,
            Priority::High => 1,
            Priority::Medium | Priority::Low => 0,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence score, always within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    /// Clamp into [0, 1]; NaN becomes 0
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

/// Snapshot of the world observed at the start of a cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState<D> {
    pub timestamp: DateTime<Utc>,
    pub data: D,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl<D> AgentState<D> {
    pub fn new(timestamp: DateTime<Utc>, data: D) -> Self {
        Self {
            timestamp,
            data,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A detected condition worth acting on
///
/// `K` is the agent's insight enum; its variant is serialized as `type` with
/// the payload under `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight<K> {
    pub severity: Severity,
    pub description: String,
    pub confidence: Confidence,
    #[serde(flatten)]
    pub kind: K,
}

impl<K> Insight<K> {
    pub fn new(
        kind: K,
        severity: Severity,
        confidence: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            description: description.into(),
            confidence: Confidence::new(confidence),
            kind,
        }
    }
}

/// A concrete response to one or more insights
///
/// `P` is the agent's action enum; its variant is serialized as `type` with
/// the payload under `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action<P> {
    pub priority: Priority,
    pub reasoning: String,
    /// Proposed, not applied: stored for human review
    pub requires_approval: bool,
    #[serde(flatten)]
    pub payload: P,
}

impl<P> Action<P> {
    pub fn new(payload: P, priority: Priority, reasoning: impl Into<String>) -> Self {
        Self {
            priority,
            reasoning: reasoning.into(),
            requires_approval: false,
            payload,
        }
    }

    /// Mark the action as needing human approval
    pub fn requiring_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }
}

/// Everything a cycle produced, handed to `learn`
#[derive(Debug)]
pub struct Cycle<'a, D, K, P> {
    pub state: &'a AgentState<D>,
    pub insights: &'a [Insight<K>],
    pub actions: &'a [Action<P>],
}

impl<D, K, P> Cycle<'_, D, K, P> {
    pub fn high_severity_count(&self) -> usize {
        high_severity_count(self.insights)
    }
}

/// Timing and bookkeeping attached to a decision log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionMetadata {
    pub execution_time_ms: u64,
}

/// Audit record of one completed cycle
///
/// Borrows the cycle's values so the log reflects exactly what
/// analyze/decide returned.
#[derive(Debug, Serialize)]
pub struct DecisionLog<'a, D, K, P> {
    pub agent_type: &'a str,
    pub observation: &'a AgentState<D>,
    pub insights: &'a [Insight<K>],
    pub actions: &'a [Action<P>],
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: DecisionMetadata,
}

impl<D, K, P> DecisionLog<'_, D, K, P>
where
    D: Serialize,
    K: Serialize,
    P: Serialize,
{
    /// Flatten into the record appended to the decision log store
    pub fn to_record(&self) -> Result<NewDecisionLog> {
        Ok(NewDecisionLog {
            agent_type: self.agent_type.to_string(),
            observation: serde_json::to_value(self.observation)?,
            insights: serde_json::to_value(self.insights)?,
            actions: serde_json::to_value(self.actions)?,
            reasoning: self.reasoning.clone(),
            execution_time_ms: self.metadata.execution_time_ms,
            insights_count: self.insights.len(),
            actions_count: self.actions.len(),
            high_severity_count: high_severity_count(self.insights),
            timestamp: self.timestamp,
        })
    }
}

/// Number of high or critical insights
pub fn high_severity_count<K>(insights: &[Insight<K>]) -> usize {
    insights.iter().filter(|i| i.severity.is_high()).count()
}

/// Snapshot of an agent's scheduling state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub name: String,
    pub running: bool,
    pub interval_ms: u64,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}
