//! Agent output: notifications, suggestions and the decision log

use anyhow::{bail, Result};
use warden_core::db::Database;
use warden_core::models::SuggestionStatus;

use super::truncate;

pub fn cmd_notifications_list(
    db: &Database,
    user: Option<&str>,
    unread_only: bool,
    limit: i64,
) -> Result<()> {
    let notifications = db.list_notifications(user, unread_only, limit)?;

    if notifications.is_empty() {
        println!("No notifications. Run 'warden agents cycle BudgetGuardian' to check budgets.");
        return Ok(());
    }

    println!();
    println!("Notifications");
    println!("   ─────────────────────────────────────────────────────────────");

    for n in notifications {
        let marker = if n.is_read { " " } else { "*" };
        println!(
            "   {}[{}] {} │ p{} │ {} │ {}",
            marker,
            n.id,
            n.created_at.format("%Y-%m-%d %H:%M"),
            n.priority,
            n.user_id,
            n.title
        );
        println!("        {}", n.message);
    }

    Ok(())
}

pub fn cmd_notifications_read(db: &Database, id: i64) -> Result<()> {
    if !db.mark_notification_read(id)? {
        bail!("Notification {} not found", id);
    }
    println!("Marked notification [{}] as read", id);
    Ok(())
}

pub fn cmd_suggestions_list(db: &Database, all: bool, limit: i64) -> Result<()> {
    let status = if all {
        None
    } else {
        Some(SuggestionStatus::Pending)
    };
    let suggestions = db.list_suggestions(status, limit)?;

    if suggestions.is_empty() {
        println!("No suggestions to review.");
        return Ok(());
    }

    println!();
    println!("Suggestions");
    println!("   ─────────────────────────────────────────────────────────────");

    for s in suggestions {
        println!(
            "   [{}] {:<8} │ {:.0}% │ {} │ {}",
            s.id,
            s.status.as_str(),
            s.confidence_score * 100.0,
            s.user_id,
            truncate(&s.suggested_value, 80)
        );
    }

    println!();
    println!("   Use 'warden suggestions accept <id>' or 'reject <id>' to review.");

    Ok(())
}

pub fn cmd_suggestions_review(db: &Database, id: i64, accept: bool) -> Result<()> {
    let status = if accept {
        SuggestionStatus::Accepted
    } else {
        SuggestionStatus::Rejected
    };

    if !db.review_suggestion(id, status)? {
        bail!("Suggestion {} not found or already reviewed", id);
    }

    println!("Suggestion [{}] {}", id, status.as_str());
    Ok(())
}

pub fn cmd_decisions(db: &Database, agent: Option<&str>, limit: i64) -> Result<()> {
    let logs = db.list_decision_logs(agent, limit)?;

    if logs.is_empty() {
        println!("No agent decisions recorded yet.");
        return Ok(());
    }

    println!();
    println!("Agent Decisions");
    println!("   ─────────────────────────────────────────────────────────────");

    for log in logs {
        println!(
            "   [{}] {} │ {} │ {} insights ({} high), {} actions │ {} ms",
            log.id,
            log.timestamp.format("%Y-%m-%d %H:%M:%S"),
            log.agent_type,
            log.insights_count,
            log.high_severity_count,
            log.actions_count,
            log.execution_time_ms
        );
        println!("        {}", log.reasoning);
    }

    Ok(())
}
