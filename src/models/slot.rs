use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Recurring screening position, e.g. "evening" 18:00-20:00.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotTemplate {
    pub id: i16,
    pub code: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub position: i16,
    pub is_active: bool,
}

/// A template materialized for one calendar date.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailySlot {
    pub id: i64,
    pub slot_date: NaiveDate,
    pub template_id: i16,
    pub position: i16,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub is_enabled: bool,
}

// Ещё не сохранённый daily slot (id выдаёт БД)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDailySlot {
    pub slot_date: NaiveDate,
    pub template_id: i16,
    pub position: i16,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, FromRow, Serialize, PartialEq, Eq)]
pub struct ReservationSlot {
    pub reservation_id: Uuid,
    pub daily_slot_id: i64,
}
