//! Notification and suggestion operations

use rusqlite::params;

use super::{parse_datetime, parse_enum, parse_json, Database};
use crate::error::Result;
use crate::models::{NewNotification, NewSuggestion, Notification, Suggestion, SuggestionStatus};

fn row_to_notification(row: &rusqlite::Row) -> rusqlite::Result<Notification> {
    let notification_type: String = row.get(2)?;
    let metadata: String = row.get(6)?;
    let created_at: String = row.get(8)?;

    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        notification_type: parse_enum(2, &notification_type)?,
        title: row.get(3)?,
        message: row.get(4)?,
        priority: row.get(5)?,
        metadata: parse_json(6, &metadata)?,
        is_read: row.get(7)?,
        created_at: parse_datetime(&created_at),
    })
}

fn row_to_suggestion(row: &rusqlite::Row) -> rusqlite::Result<Suggestion> {
    let suggestion_type: String = row.get(2)?;
    let metadata: String = row.get(5)?;
    let status: String = row.get(6)?;
    let created_at: String = row.get(7)?;

    Ok(Suggestion {
        id: row.get(0)?,
        user_id: row.get(1)?,
        suggestion_type: parse_enum(2, &suggestion_type)?,
        suggested_value: row.get(3)?,
        confidence_score: row.get(4)?,
        metadata: parse_json(5, &metadata)?,
        status: parse_enum(6, &status)?,
        created_at: parse_datetime(&created_at),
    })
}

impl Database {
    /// Store a notification; returns its id
    pub fn insert_notification(&self, notification: &NewNotification) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO notifications (user_id, type, title, message, priority, metadata)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                notification.user_id,
                notification.notification_type.as_str(),
                notification.title,
                notification.message,
                notification.priority,
                serde_json::to_string(&notification.metadata)?,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Newest notifications first, optionally for one user and/or unread only
    pub fn list_notifications(
        &self,
        user_id: Option<&str>,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, type, title, message, priority, metadata, is_read, created_at
            FROM notifications
            WHERE (? IS NULL OR user_id = ?)
              AND (NOT ? OR is_read = 0)
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let notifications = stmt
            .query_map(
                params![user_id, user_id, unread_only, limit],
                row_to_notification,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(notifications)
    }

    /// Mark a notification read; returns whether it existed
    pub fn mark_notification_read(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE id = ?",
            params![id],
        )?;
        Ok(updated > 0)
    }

    /// Store a suggestion as pending; returns its id
    pub fn insert_suggestion(&self, suggestion: &NewSuggestion) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO suggestions (user_id, suggestion_type, suggested_value, confidence_score, metadata, status)
            VALUES (?, ?, ?, ?, ?, 'pending')
            "#,
            params![
                suggestion.user_id,
                suggestion.suggestion_type.as_str(),
                suggestion.suggested_value,
                suggestion.confidence_score,
                serde_json::to_string(&suggestion.metadata)?,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Newest suggestions first, optionally filtered by status
    pub fn list_suggestions(
        &self,
        status: Option<SuggestionStatus>,
        limit: i64,
    ) -> Result<Vec<Suggestion>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, suggestion_type, suggested_value, confidence_score, metadata, status, created_at
            FROM suggestions
            WHERE (? IS NULL OR status = ?)
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let status_str = status.map(|s| s.as_str());
        let suggestions = stmt
            .query_map(params![status_str, status_str, limit], row_to_suggestion)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(suggestions)
    }

    /// Record the user's review of a pending suggestion
    ///
    /// Returns false if the suggestion is missing or was already reviewed.
    pub fn review_suggestion(&self, id: i64, status: SuggestionStatus) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE suggestions SET status = ? WHERE id = ? AND status = 'pending'",
            params![status.as_str(), id],
        )?;
        Ok(updated > 0)
    }
}
