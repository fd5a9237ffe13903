//! Agent decision log operations

use rusqlite::params;

use super::{format_datetime, parse_datetime, parse_json, Database};
use crate::error::Result;
use crate::models::{DecisionLogEntry, NewDecisionLog};

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<DecisionLogEntry> {
    let observation: String = row.get(2)?;
    let insights: String = row.get(3)?;
    let actions: String = row.get(4)?;
    let timestamp: String = row.get(10)?;

    Ok(DecisionLogEntry {
        id: row.get(0)?,
        agent_type: row.get(1)?,
        observation: parse_json(2, &observation)?,
        insights: parse_json(3, &insights)?,
        actions: parse_json(4, &actions)?,
        reasoning: row.get(5)?,
        execution_time_ms: row.get::<_, i64>(6)? as u64,
        insights_count: row.get::<_, i64>(7)? as usize,
        actions_count: row.get::<_, i64>(8)? as usize,
        high_severity_count: row.get::<_, i64>(9)? as usize,
        timestamp: parse_datetime(&timestamp),
    })
}

impl Database {
    /// Append a decision log entry; returns its id
    pub fn insert_decision_log(&self, log: &NewDecisionLog) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO agent_decision_logs
                (agent_type, observation, insights, actions, reasoning, execution_time_ms,
                 insights_count, actions_count, high_severity_count, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                log.agent_type,
                serde_json::to_string(&log.observation)?,
                serde_json::to_string(&log.insights)?,
                serde_json::to_string(&log.actions)?,
                log.reasoning,
                log.execution_time_ms as i64,
                log.insights_count as i64,
                log.actions_count as i64,
                log.high_severity_count as i64,
                format_datetime(&log.timestamp),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Newest entries first, optionally for one agent
    pub fn list_decision_logs(
        &self,
        agent_type: Option<&str>,
        limit: i64,
    ) -> Result<Vec<DecisionLogEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, agent_type, observation, insights, actions, reasoning, execution_time_ms,
                   insights_count, actions_count, high_severity_count, timestamp
            FROM agent_decision_logs
            WHERE (? IS NULL OR agent_type = ?)
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let entries = stmt
            .query_map(params![agent_type, agent_type, limit], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
