//! Warden CLI - Budget monitoring agents
//!
//! Usage:
//!   warden init                          Initialize database
//!   warden budgets add --user u --category Dining --amount 300
//!   warden run                           Supervise agents until Ctrl-C
//!   warden agents cycle BudgetGuardian   Run a single cycle now

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Run { force } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_run(db, config, force).await
        }
        Commands::Agents { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(AgentsAction::List) => commands::cmd_agents_list(db, config),
                Some(AgentsAction::Status) => commands::cmd_agents_status(db, config),
                Some(AgentsAction::Cycle { name }) => {
                    commands::cmd_agents_cycle(db, config, &name).await
                }
            }
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_budgets_list(&db, None, None),
                Some(BudgetsAction::List { month, year }) => {
                    commands::cmd_budgets_list(&db, month, year)
                }
                Some(BudgetsAction::Add {
                    user,
                    category,
                    amount,
                    month,
                    year,
                    threshold,
                }) => commands::cmd_budgets_add(
                    &db,
                    &user,
                    &category,
                    amount,
                    month,
                    year,
                    threshold,
                ),
            }
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&db, 20, false),
                Some(TransactionsAction::List { limit, deleted }) => {
                    commands::cmd_transactions_list(&db, limit, deleted)
                }
                Some(TransactionsAction::Add {
                    user,
                    category,
                    amount,
                    transaction_type,
                    date,
                    description,
                }) => commands::cmd_transactions_add(
                    &db,
                    &user,
                    &category,
                    amount,
                    &transaction_type,
                    date.as_deref(),
                    description,
                ),
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&db, id)
                }
            }
        }
        Commands::Recurring { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_recurring_list(&db, false),
                Some(RecurringAction::List { all }) => commands::cmd_recurring_list(&db, all),
                Some(RecurringAction::Add {
                    user,
                    category,
                    amount,
                    transaction_type,
                    frequency,
                    description,
                }) => commands::cmd_recurring_add(
                    &db,
                    &user,
                    &category,
                    amount,
                    &transaction_type,
                    &frequency,
                    description,
                ),
                Some(RecurringAction::Deactivate { id }) => {
                    commands::cmd_recurring_deactivate(&db, id)
                }
            }
        }
        Commands::Notifications { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_notifications_list(&db, None, false, 20),
                Some(NotificationsAction::List {
                    user,
                    unread,
                    limit,
                }) => commands::cmd_notifications_list(&db, user.as_deref(), unread, limit),
                Some(NotificationsAction::Read { id }) => commands::cmd_notifications_read(&db, id),
            }
        }
        Commands::Suggestions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_suggestions_list(&db, false, 20),
                Some(SuggestionsAction::List { all, limit }) => {
                    commands::cmd_suggestions_list(&db, all, limit)
                }
                Some(SuggestionsAction::Accept { id }) => {
                    commands::cmd_suggestions_review(&db, id, true)
                }
                Some(SuggestionsAction::Reject { id }) => {
                    commands::cmd_suggestions_review(&db, id, false)
                }
            }
        }
        Commands::Decisions { agent, limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_decisions(&db, agent.as_deref(), limit)
        }
    }
}
