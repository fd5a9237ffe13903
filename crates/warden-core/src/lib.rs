//! Warden Core Library
//!
//! Autonomous budget monitoring:
//! - Generic agent runtime (stage trait, scheduler, orchestrator)
//! - Budget Guardian agent
//! - Encrypted SQLite store for budgets, transactions, notifications,
//!   suggestions and the agent decision log
//! - Threshold and environment configuration

pub mod agents;
pub mod config;
pub mod db;
pub mod error;
pub mod models;

/// Test utilities: in-memory store and a scriptable agent
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use agents::{
    AgentOrchestrator, AgentRunner, AgentStatus, BudgetGuardian, CycleOutcome, ManagedAgent,
};
pub use config::{AgentsConfig, GuardianConfig};
pub use db::Database;
pub use error::{Error, Result};
