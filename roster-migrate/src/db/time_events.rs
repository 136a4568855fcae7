//! Time event rows

use crate::models::EntityId;
use chrono::NaiveDateTime;
use roster_common::time::format_db_timestamp;
use roster_common::Result;
use sqlx::SqlitePool;

/// Time event to write; never linked to a session and never voided on import
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeEvent {
    pub entity: EntityId,
    pub action_type_id: i64,
    pub occurred_at: NaiveDateTime,
    pub entry_type_id: i64,
    pub minutes: Option<i64>,
    pub note: Option<String>,
}

/// Insert unless the (entity, action, timestamp) punch already exists
pub async fn insert_time_event(pool: &SqlitePool, event: &NewTimeEvent) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO time_events (
            entity_id, action_type_id, occurred_at, entry_type_id, minutes, note
        ) VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(event.entity.get())
    .bind(event.action_type_id)
    .bind(format_db_timestamp(&event.occurred_at))
    .bind(event.entry_type_id)
    .bind(event.minutes)
    .bind(&event.note)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Number of events recorded for `entity`
pub async fn count_for_entity(pool: &SqlitePool, entity: EntityId) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM time_events WHERE entity_id = ?")
        .bind(entity.get())
        .fetch_one(pool)
        .await?;
    Ok(count)
}
