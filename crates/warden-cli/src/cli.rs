//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Warden - Autonomous budget monitoring agents
#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Autonomous budget monitoring agents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "warden.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set WARDEN_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Guardian thresholds file (defaults to the per-user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start all agents and supervise them until Ctrl-C
    ///
    /// Agents start when WARDEN_AUTO_START_AGENTS=true or --force is given.
    Run {
        /// Start agents even when auto-start is disabled
        #[arg(long)]
        force: bool,
    },

    /// Inspect agents or run a single cycle
    Agents {
        #[command(subcommand)]
        action: Option<AgentsAction>,
    },

    /// Manage monthly budgets
    Budgets {
        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Manage transactions (list, add, delete)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Manage recurring transactions
    Recurring {
        #[command(subcommand)]
        action: Option<RecurringAction>,
    },

    /// Show or acknowledge agent notifications
    Notifications {
        #[command(subcommand)]
        action: Option<NotificationsAction>,
    },

    /// Review budget suggestions
    Suggestions {
        #[command(subcommand)]
        action: Option<SuggestionsAction>,
    },

    /// Show the agent decision log
    Decisions {
        /// Only entries from this agent
        #[arg(long)]
        agent: Option<String>,

        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum AgentsAction {
    /// List registered agents
    List,

    /// Show runtime status for every agent
    Status,

    /// Run one observe/analyze/decide/act cycle now
    Cycle {
        /// Agent name (e.g. BudgetGuardian)
        name: String,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List budgets for a month (defaults to the current month)
    List {
        #[arg(long)]
        month: Option<u32>,

        #[arg(long)]
        year: Option<i32>,
    },

    /// Create or replace a budget
    Add {
        /// Owner of the budget
        #[arg(long)]
        user: String,

        /// Spending category
        #[arg(long)]
        category: String,

        /// Monthly limit
        #[arg(long)]
        amount: f64,

        #[arg(long)]
        month: Option<u32>,

        #[arg(long)]
        year: Option<i32>,

        /// Alert when this percent of the budget is spent (0-100)
        #[arg(long)]
        threshold: Option<f64>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent transactions
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Include soft-deleted transactions
        #[arg(long)]
        deleted: bool,
    },

    /// Record a transaction
    Add {
        #[arg(long)]
        user: String,

        #[arg(long)]
        category: String,

        /// Positive amount
        #[arg(long)]
        amount: f64,

        /// EXPENSE or INCOME
        #[arg(long = "type", default_value = "EXPENSE")]
        transaction_type: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Soft-delete a transaction (excluded from agent analysis)
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum RecurringAction {
    /// List recurring transactions
    List {
        /// Include deactivated entries
        #[arg(long)]
        all: bool,
    },

    /// Register a recurring transaction
    Add {
        #[arg(long)]
        user: String,

        #[arg(long)]
        category: String,

        #[arg(long)]
        amount: f64,

        /// EXPENSE or INCOME
        #[arg(long = "type", default_value = "EXPENSE")]
        transaction_type: String,

        /// DAILY, WEEKLY, MONTHLY or YEARLY
        #[arg(long, default_value = "MONTHLY")]
        frequency: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Stop counting a recurring transaction
    Deactivate {
        /// Recurring transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum NotificationsAction {
    /// List notifications
    List {
        #[arg(long)]
        user: Option<String>,

        /// Only unread notifications
        #[arg(long)]
        unread: bool,

        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Mark a notification as read
    Read {
        /// Notification ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum SuggestionsAction {
    /// List suggestions
    List {
        /// Include reviewed suggestions
        #[arg(long)]
        all: bool,

        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Accept a pending suggestion
    Accept {
        /// Suggestion ID
        id: i64,
    },

    /// Reject a pending suggestion
    Reject {
        /// Suggestion ID
        id: i64,
    },
}
