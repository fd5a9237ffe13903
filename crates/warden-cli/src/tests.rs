//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use chrono::{Datelike, Utc};
use clap::Parser;
use warden_core::db::Database;
use warden_core::models::{SuggestionStatus, TransactionType};
use warden_core::AgentsConfig;

use crate::cli::*;
use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn this_month() -> (u32, i32) {
    let today = Utc::now().date_naive();
    (today.month(), today.year())
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_global_flags() {
    let cli = Cli::try_parse_from([
        "warden",
        "--db",
        "ledger.db",
        "--no-encrypt",
        "-v",
        "--config",
        "guardian.toml",
        "init",
    ])
    .unwrap();

    assert_eq!(cli.db.to_str(), Some("ledger.db"));
    assert!(cli.no_encrypt);
    assert!(cli.verbose);
    assert_eq!(
        cli.config.as_deref().and_then(|p| p.to_str()),
        Some("guardian.toml")
    );
    assert!(matches!(cli.command, Commands::Init));
}

#[test]
fn test_parse_defaults() {
    let cli = Cli::try_parse_from(["warden", "run"]).unwrap();
    assert_eq!(cli.db.to_str(), Some("warden.db"));
    assert!(!cli.no_encrypt);
    assert!(cli.config.is_none());
    assert!(matches!(cli.command, Commands::Run { force: false }));
}

#[test]
fn test_parse_agents_cycle() {
    let cli = Cli::try_parse_from(["warden", "agents", "cycle", "BudgetGuardian"]).unwrap();
    match cli.command {
        Commands::Agents {
            action: Some(AgentsAction::Cycle { name }),
        } => assert_eq!(name, "BudgetGuardian"),
        _ => panic!("expected agents cycle"),
    }
}

#[test]
fn test_parse_transaction_add() {
    let cli = Cli::try_parse_from([
        "warden",
        "transactions",
        "add",
        "--user",
        "u1",
        "--category",
        "Dining",
        "--amount",
        "42.5",
        "--type",
        "income",
        "--date",
        "2024-06-01",
    ])
    .unwrap();

    match cli.command {
        Commands::Transactions {
            action:
                Some(TransactionsAction::Add {
                    amount,
                    transaction_type,
                    date,
                    description,
                    ..
                }),
        } => {
            assert_eq!(amount, 42.5);
            assert_eq!(transaction_type, "income");
            assert_eq!(date.as_deref(), Some("2024-06-01"));
            assert!(description.is_none());
        }
        _ => panic!("expected transactions add"),
    }
}

#[test]
fn test_parse_budget_add_requires_amount() {
    let result = Cli::try_parse_from([
        "warden", "budgets", "add", "--user", "u1", "--category", "Dining",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_parse_decisions_defaults() {
    let cli = Cli::try_parse_from(["warden", "decisions"]).unwrap();
    match cli.command {
        Commands::Decisions { agent, limit } => {
            assert!(agent.is_none());
            assert_eq!(limit, 10);
        }
        _ => panic!("expected decisions"),
    }
}

// ========== Core Command Tests ==========

#[test]
fn test_cmd_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warden.db");

    commands::cmd_init(&path, true).unwrap();

    assert!(path.exists());
    let conn = rusqlite::Connection::open(&path).unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'budgets'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a much longer description", 10), "a much ...");
    assert_eq!(truncate("café au lait", 6), "caf...");
}

// ========== Budget Command Tests ==========

#[test]
fn test_cmd_budgets_add_defaults_to_current_month() {
    let db = setup_test_db();
    let (month, year) = this_month();

    commands::cmd_budgets_add(&db, "u1", "Dining", 300.0, None, None, Some(80.0)).unwrap();
    commands::cmd_budgets_list(&db, None, None).unwrap();

    let budgets = db.get_budgets(month, year).unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].category, "Dining");
    assert_eq!(budgets[0].alert_threshold, Some(80.0));
}

#[test]
fn test_cmd_budgets_add_replaces_existing() {
    let db = setup_test_db();

    commands::cmd_budgets_add(&db, "u1", "Dining", 300.0, Some(6), Some(2024), None).unwrap();
    commands::cmd_budgets_add(&db, "u1", "Dining", 450.0, Some(6), Some(2024), None).unwrap();

    let budgets = db.get_budgets(6, 2024).unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].amount, 450.0);
}

#[test]
fn test_cmd_budgets_add_invalid_month() {
    let db = setup_test_db();
    let result = commands::cmd_budgets_add(&db, "u1", "Dining", 300.0, Some(13), Some(2024), None);
    assert!(result.is_err());
}

#[test]
fn test_cmd_budgets_add_rejects_negative_amount() {
    let db = setup_test_db();
    let result = commands::cmd_budgets_add(&db, "u1", "Dining", -5.0, Some(6), Some(2024), None);
    assert!(result.is_err());
    assert!(db.get_budgets(6, 2024).unwrap().is_empty());
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_transactions_add_and_delete() {
    let db = setup_test_db();

    commands::cmd_transactions_add(
        &db,
        "u1",
        "Dining",
        42.0,
        "expense",
        Some("2024-06-01"),
        Some("Lunch".to_string()),
    )
    .unwrap();

    let txs = db.list_recent_transactions(10, false).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].transaction_type, TransactionType::Expense);
    assert_eq!(txs[0].description.as_deref(), Some("Lunch"));

    commands::cmd_transactions_delete(&db, txs[0].id).unwrap();
    assert!(db.list_recent_transactions(10, false).unwrap().is_empty());
    assert_eq!(db.list_recent_transactions(10, true).unwrap().len(), 1);

    // Deleting again is a no-op
    commands::cmd_transactions_delete(&db, txs[0].id).unwrap();
    commands::cmd_transactions_list(&db, 10, true).unwrap();
}

#[test]
fn test_cmd_transactions_add_rejects_bad_input() {
    let db = setup_test_db();

    assert!(
        commands::cmd_transactions_add(&db, "u1", "Dining", 10.0, "transfer", None, None).is_err()
    );
    assert!(commands::cmd_transactions_add(
        &db,
        "u1",
        "Dining",
        10.0,
        "expense",
        Some("06/01/2024"),
        None
    )
    .is_err());
    assert!(
        commands::cmd_transactions_add(&db, "u1", "Dining", -5.0, "expense", None, None).is_err()
    );
}

#[test]
fn test_cmd_transactions_delete_missing() {
    let db = setup_test_db();
    assert!(commands::cmd_transactions_delete(&db, 999).is_err());
}

#[test]
fn test_cmd_recurring_lifecycle() {
    let db = setup_test_db();

    commands::cmd_recurring_add(&db, "u1", "Rent", 1000.0, "expense", "monthly", None).unwrap();
    let active = db.list_recurring(false).unwrap();
    assert_eq!(active.len(), 1);

    commands::cmd_recurring_deactivate(&db, active[0].id).unwrap();
    assert!(db.list_recurring(false).unwrap().is_empty());
    assert_eq!(db.list_recurring(true).unwrap().len(), 1);
    commands::cmd_recurring_list(&db, true).unwrap();

    assert!(commands::cmd_recurring_deactivate(&db, 999).is_err());
    assert!(
        commands::cmd_recurring_add(&db, "u1", "Rent", 10.0, "expense", "hourly", None).is_err()
    );
}

// ========== Agent Command Tests ==========

#[test]
fn test_build_orchestrator_registers_guardian() {
    let db = setup_test_db();
    let orchestrator = commands::build_orchestrator(db, None, &AgentsConfig::default()).unwrap();

    assert_eq!(orchestrator.list_agents(), vec!["BudgetGuardian"]);
    let status = orchestrator.status();
    assert!(!status[0].running);
    assert_eq!(status[0].interval_ms, 3_600_000);
}

#[test]
fn test_build_orchestrator_rejects_invalid_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[overrun]\nconfidence = 7.0").unwrap();

    let config = AgentsConfig::default();
    let result = commands::build_orchestrator(setup_test_db(), Some(file.path()), &config);
    assert!(result.is_err());
}

#[tokio::test]
async fn test_cmd_agents_cycle_writes_activity() {
    let db = setup_test_db();
    let (month, year) = this_month();
    let today = Utc::now().date_naive();

    commands::cmd_budgets_add(
        &db,
        "u1",
        "Dining",
        100.0,
        Some(month),
        Some(year),
        Some(50.0),
    )
    .unwrap();
    commands::cmd_transactions_add(
        &db,
        "u1",
        "Dining",
        90.0,
        "expense",
        Some(&today.format("%Y-%m-%d").to_string()),
        None,
    )
    .unwrap();

    commands::cmd_agents_cycle(db.clone(), None, "BudgetGuardian")
        .await
        .unwrap();

    let notifications = db.list_notifications(Some("u1"), true, 10).unwrap();
    assert!(notifications
        .iter()
        .any(|n| n.title == "Budget Threshold Reached: Dining"));

    let logs = db.list_decision_logs(Some("BudgetGuardian"), 10).unwrap();
    assert_eq!(logs.len(), 1);

    commands::cmd_notifications_read(&db, notifications[0].id).unwrap();
    assert_eq!(
        db.list_notifications(Some("u1"), true, 10).unwrap().len(),
        notifications.len() - 1
    );
    commands::cmd_decisions(&db, Some("BudgetGuardian"), 5).unwrap();
}

#[tokio::test]
async fn test_cmd_agents_cycle_unknown_agent() {
    let result = commands::cmd_agents_cycle(setup_test_db(), None, "Nonexistent").await;
    assert!(result.is_err());
}

// ========== Activity Command Tests ==========

#[test]
fn test_cmd_suggestions_review() {
    use warden_core::models::{NewSuggestion, SuggestionType};

    let db = setup_test_db();
    let id = db
        .insert_suggestion(&NewSuggestion {
            user_id: "u1".to_string(),
            suggestion_type: SuggestionType::BudgetReallocation,
            suggested_value: "Increase Rent by $110.00".to_string(),
            confidence_score: 0.8,
            metadata: serde_json::json!({ "from_category": "Rent" }),
        })
        .unwrap();

    commands::cmd_suggestions_list(&db, false, 10).unwrap();
    commands::cmd_suggestions_review(&db, id, true).unwrap();

    let accepted = db
        .list_suggestions(Some(SuggestionStatus::Accepted), 10)
        .unwrap();
    assert_eq!(accepted.len(), 1);

    // Already reviewed
    assert!(commands::cmd_suggestions_review(&db, id, false).is_err());
    assert!(commands::cmd_suggestions_review(&db, 999, true).is_err());
}

#[test]
fn test_cmd_notifications_read_missing() {
    let db = setup_test_db();
    assert!(commands::cmd_notifications_read(&db, 42).is_err());
    commands::cmd_notifications_list(&db, None, false, 10).unwrap();
}
