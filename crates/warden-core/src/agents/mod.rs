//! Autonomous agents
//!
//! An agent runs a fixed observe → analyze → decide → act → learn → log
//! cycle on a timer. The pieces:
//! - [`runtime`]: the [`Agent`] stage trait, the cycle driver and the
//!   per-agent scheduler ([`AgentRunner`])
//! - [`orchestrator`]: registry and lifecycle control for all agents
//! - [`ports`]: the storage collaborators agents read from and write to
//! - [`budget_guardian`]: monitors monthly budgets

pub mod budget_guardian;
pub mod clock;
pub mod orchestrator;
pub mod ports;
pub mod runtime;
pub mod types;

pub use budget_guardian::{BudgetAction, BudgetGuardian, BudgetInsight, BudgetObservation};
pub use clock::{Clock, FixedClock, SystemClock};
pub use orchestrator::AgentOrchestrator;
pub use ports::{DecisionLogStore, FinancialStateReader, NotificationSink};
pub use runtime::{run_cycle, Agent, AgentRunner, CycleOutcome, ManagedAgent, DEFAULT_RUN_INTERVAL};
pub use types::{
    Action, AgentState, AgentStatus, Confidence, Cycle, DecisionLog, Insight, Priority, Severity,
};
