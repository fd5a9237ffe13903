//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::ports::{DecisionLogStore, FinancialStateReader, NotificationSink};
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_budget(category: &str, amount: f64, threshold: Option<f64>) -> NewBudget {
        NewBudget {
            user_id: "u1".to_string(),
            category: category.to_string(),
            amount,
            month: 6,
            year: 2024,
            alert_threshold: threshold,
        }
    }

    fn new_tx(category: &str, amount: f64, kind: TransactionType, on: NaiveDate) -> NewTransaction {
        NewTransaction {
            user_id: "u1".to_string(),
            category: category.to_string(),
            amount,
            transaction_type: kind,
            date: on,
            description: None,
        }
    }

    fn new_notification(user: &str, title: &str) -> NewNotification {
        NewNotification {
            user_id: user.to_string(),
            notification_type: NotificationType::BudgetAlert,
            title: title.to_string(),
            message: "message".to_string(),
            priority: 1,
            metadata: json!({"agent_generated": true, "agent_name": "BudgetGuardian"}),
        }
    }

    fn new_suggestion() -> NewSuggestion {
        NewSuggestion {
            user_id: "u1".to_string(),
            suggestion_type: SuggestionType::BudgetReallocation,
            suggested_value: "Increase Rent by $110.00".to_string(),
            confidence_score: 0.8,
            metadata: json!({"from_category": "Rent"}),
        }
    }

    fn new_log(agent: &str, insights: usize) -> NewDecisionLog {
        NewDecisionLog {
            agent_type: agent.to_string(),
            observation: json!({"data": {"budgets": []}}),
            insights: json!([]),
            actions: json!([]),
            reasoning: "No significant patterns detected. No action required.".to_string(),
            execution_time_ms: 12,
            insights_count: insights,
            actions_count: 0,
            high_severity_count: 0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.get_budgets(6, 2024).unwrap().is_empty());
        assert!(db.list_recent_transactions(10, true).unwrap().is_empty());
    }

    #[test]
    fn test_schema_tables_exist() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        for table in [
            "budgets",
            "transactions",
            "recurring_transactions",
            "notifications",
            "suggestions",
            "agent_decision_logs",
        ] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let db = Database::in_memory().unwrap();
        db.upsert_budget(&new_budget("Dining", 300.0, None))
            .unwrap();

        let reopened = Database::new_unencrypted(db.path()).unwrap();
        assert_eq!(reopened.get_budgets(6, 2024).unwrap().len(), 1);
    }

    #[test]
    fn test_budget_upsert_replaces_amount() {
        let db = Database::in_memory().unwrap();

        let id = db
            .upsert_budget(&new_budget("Dining", 300.0, None))
            .unwrap();
        let id2 = db
            .upsert_budget(&new_budget("Dining", 350.0, Some(80.0)))
            .unwrap();
        assert_eq!(id, id2);

        let budgets = db.get_budgets(6, 2024).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount, 350.0);
        assert_eq!(budgets[0].alert_threshold, Some(80.0));
        assert_eq!(budgets[0].user_id, "u1");
    }

    #[test]
    fn test_budget_validation() {
        let db = Database::in_memory().unwrap();

        let mut bad_month = new_budget("Dining", 300.0, None);
        bad_month.month = 13;
        assert!(matches!(db.upsert_budget(&bad_month), Err(Error::InvalidData(_))));

        assert!(db
            .upsert_budget(&new_budget("Dining", 300.0, Some(150.0)))
            .is_err());
    }

    #[test]
    fn test_budget_amount_must_be_positive() {
        let db = Database::in_memory().unwrap();

        for amount in [-5.0, 0.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                db.upsert_budget(&new_budget("Dining", amount, None)),
                Err(Error::InvalidData(_))
            ));
        }
        assert!(db.get_budgets(6, 2024).unwrap().is_empty());
    }

    #[test]
    fn test_budgets_filtered_by_period() {
        let db = Database::in_memory().unwrap();
        db.upsert_budget(&new_budget("Dining", 300.0, None))
            .unwrap();
        let mut july = new_budget("Dining", 300.0, None);
        july.month = 7;
        db.upsert_budget(&july).unwrap();

        assert_eq!(db.get_budgets(6, 2024).unwrap().len(), 1);
        assert_eq!(db.get_budgets(7, 2024).unwrap().len(), 1);
        assert!(db.get_budgets(6, 2023).unwrap().is_empty());

        let id = db.get_budgets(7, 2024).unwrap()[0].id;
        assert!(db.delete_budget(id).unwrap());
        assert!(!db.delete_budget(id).unwrap());
    }

    #[test]
    fn test_transaction_crud_and_soft_delete() {
        let db = Database::in_memory().unwrap();

        let id = db
            .create_transaction(&new_tx("Dining", 42.5, TransactionType::Expense, date(2024, 6, 3)))
            .unwrap();
        let tx = db.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.amount, 42.5);
        assert_eq!(tx.transaction_type, TransactionType::Expense);
        assert_eq!(tx.date, date(2024, 6, 3));
        assert!(tx.deleted_at.is_none());

        assert!(db.soft_delete_transaction(id).unwrap());
        assert!(!db.soft_delete_transaction(id).unwrap());

        let tx = db.get_transaction(id).unwrap().unwrap();
        assert!(tx.deleted_at.is_some());

        assert!(db
            .get_transactions_since(date(2024, 6, 1), true)
            .unwrap()
            .is_empty());
        assert_eq!(
            db.get_transactions_since(date(2024, 6, 1), false)
                .unwrap()
                .len(),
            1
        );
        assert!(db.list_recent_transactions(10, false).unwrap().is_empty());
        assert_eq!(db.list_recent_transactions(10, true).unwrap().len(), 1);

        assert!(db.get_transaction(9999).unwrap().is_none());
    }

    #[test]
    fn test_transaction_amount_must_be_positive() {
        let db = Database::in_memory().unwrap();
        let tx = new_tx("Dining", -5.0, TransactionType::Expense, date(2024, 6, 3));
        let result = db.create_transaction(&tx);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_transactions_since_is_inclusive() {
        let db = Database::in_memory().unwrap();
        db.create_transaction(&new_tx("Dining", 1.0, TransactionType::Expense, date(2024, 5, 31)))
            .unwrap();
        db.create_transaction(&new_tx("Dining", 2.0, TransactionType::Expense, date(2024, 6, 1)))
            .unwrap();

        let since = db.get_transactions_since(date(2024, 6, 1), true).unwrap();
        assert_eq!(since.len(), 1);
        assert_eq!(since[0].amount, 2.0);
    }

    #[test]
    fn test_transactions_in_range_with_type() {
        let db = Database::in_memory().unwrap();
        db.create_transaction(&new_tx("Dining", 10.0, TransactionType::Expense, date(2024, 3, 1)))
            .unwrap();
        db.create_transaction(&new_tx("Dining", 20.0, TransactionType::Expense, date(2024, 5, 31)))
            .unwrap();
        db.create_transaction(&new_tx("Salary", 3000.0, TransactionType::Income, date(2024, 4, 15)))
            .unwrap();
        db.create_transaction(&new_tx("Dining", 40.0, TransactionType::Expense, date(2024, 6, 1)))
            .unwrap();

        let expenses = db
            .get_transactions_in_range(
                date(2024, 3, 1),
                date(2024, 5, 31),
                true,
                Some(TransactionType::Expense),
            )
            .unwrap();
        assert_eq!(expenses.len(), 2);
        assert!(expenses
            .iter()
            .all(|t| t.transaction_type == TransactionType::Expense));

        let all = db
            .get_transactions_in_range(date(2024, 3, 1), date(2024, 5, 31), true, None)
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_recurring_lifecycle() {
        let db = Database::in_memory().unwrap();
        let id = db
            .create_recurring(&NewRecurringTransaction {
                user_id: "u1".to_string(),
                category: "Rent".to_string(),
                amount: 1200.0,
                transaction_type: TransactionType::Expense,
                frequency: Frequency::Monthly,
                description: Some("Apartment".to_string()),
            })
            .unwrap();

        let active = db.list_recurring(false).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].frequency, Frequency::Monthly);
        assert!(active[0].is_active);

        assert!(db.deactivate_recurring(id).unwrap());
        assert!(!db.deactivate_recurring(id).unwrap());
        assert!(db.list_recurring(false).unwrap().is_empty());
        assert_eq!(db.list_recurring(true).unwrap().len(), 1);
    }

    #[test]
    fn test_notifications_filter_and_mark_read() {
        let db = Database::in_memory().unwrap();
        let first = db
            .insert_notification(&new_notification("u1", "first"))
            .unwrap();
        db.insert_notification(&new_notification("u1", "second"))
            .unwrap();
        db.insert_notification(&new_notification("u2", "other"))
            .unwrap();

        assert_eq!(db.list_notifications(None, false, 50).unwrap().len(), 3);
        assert_eq!(
            db.list_notifications(Some("u1"), false, 50).unwrap().len(),
            2
        );

        assert!(db.mark_notification_read(first).unwrap());
        let unread = db.list_notifications(Some("u1"), true, 50).unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "second");
        assert_eq!(unread[0].priority, 1);
        assert_eq!(unread[0].notification_type, NotificationType::BudgetAlert);
        assert_eq!(unread[0].metadata["agent_name"], "BudgetGuardian");

        assert!(!db.mark_notification_read(9999).unwrap());
    }

    #[test]
    fn test_suggestion_review() {
        let db = Database::in_memory().unwrap();
        let id = db.insert_suggestion(&new_suggestion()).unwrap();

        let pending = db
            .list_suggestions(Some(SuggestionStatus::Pending), 10)
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].confidence_score, 0.8);
        assert_eq!(pending[0].metadata["from_category"], "Rent");

        assert!(db
            .review_suggestion(id, SuggestionStatus::Accepted)
            .unwrap());
        // Already reviewed
        assert!(!db
            .review_suggestion(id, SuggestionStatus::Rejected)
            .unwrap());

        assert!(db
            .list_suggestions(Some(SuggestionStatus::Pending), 10)
            .unwrap()
            .is_empty());
        let all = db.list_suggestions(None, 10).unwrap();
        assert_eq!(all[0].status, SuggestionStatus::Accepted);
    }

    #[test]
    fn test_decision_log_roundtrip() {
        let db = Database::in_memory().unwrap();
        db.insert_decision_log(&new_log("BudgetGuardian", 3))
            .unwrap();
        db.insert_decision_log(&new_log("Other", 0)).unwrap();

        let logs = db.list_decision_logs(Some("BudgetGuardian"), 10).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].insights_count, 3);
        assert_eq!(logs[0].execution_time_ms, 12);
        assert_eq!(logs[0].observation["data"]["budgets"], json!([]));

        assert_eq!(db.list_decision_logs(None, 10).unwrap().len(), 2);
        assert_eq!(db.list_decision_logs(None, 1).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_port_impls_use_store() {
        let db = Database::in_memory().unwrap();
        db.upsert_budget(&new_budget("Dining", 300.0, None))
            .unwrap();
        db.create_transaction(&new_tx("Dining", 25.0, TransactionType::Expense, date(2024, 6, 2)))
            .unwrap();

        assert_eq!(db.list_budgets(6, 2024).await.unwrap().len(), 1);
        let recent = db.list_transactions(date(2024, 6, 1), true).await;
        assert_eq!(recent.unwrap().len(), 1);
        assert!(db.list_active_recurring().await.unwrap().is_empty());

        db.create_notification(new_notification("u1", "hello"))
            .await
            .unwrap();
        db.create_suggestion(new_suggestion()).await.unwrap();
        db.append_decision_log(new_log("BudgetGuardian", 1))
            .await
            .unwrap();

        assert_eq!(db.list_notifications(None, false, 10).unwrap().len(), 1);
        assert_eq!(db.list_suggestions(None, 10).unwrap().len(), 1);
        assert_eq!(db.list_decision_logs(None, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_encrypted_database() {
        let path = std::env::temp_dir().join(format!(
            "warden_test_encrypted_{}.db",
            std::process::id()
        ));
        let test_path = path.to_string_lossy().to_string();
        let _ = std::fs::remove_file(&test_path);

        {
            let db = Database::new_with_key(&test_path, Some("test-passphrase")).unwrap();
            db.upsert_budget(&new_budget("Dining", 300.0, None))
            .unwrap();
        }

        {
            let db = Database::new_with_key(&test_path, Some("test-passphrase")).unwrap();
            assert_eq!(db.get_budgets(6, 2024).unwrap().len(), 1);
        }

        assert!(
            Database::new_with_key(&test_path, Some("wrong-passphrase")).is_err(),
            "Should fail to open encrypted db with wrong key"
        );

        let _ = std::fs::remove_file(&test_path);
        let _ = std::fs::remove_file(format!("{}-wal", test_path));
        let _ = std::fs::remove_file(format!("{}-shm", test_path));
    }
}
