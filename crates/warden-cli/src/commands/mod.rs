//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db)
//! - `agents` - Agent supervisor, status and on-demand cycles
//! - `budgets` - Monthly budget commands
//! - `transactions` - Transaction and recurring transaction commands
//! - `activity` - Agent output: notifications, suggestions, decision log

pub mod activity;
pub mod agents;
pub mod budgets;
pub mod core;
pub mod transactions;

// Re-export command functions for main.rs
pub use activity::*;
pub use agents::*;
pub use budgets::*;
pub use core::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
