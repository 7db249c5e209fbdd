use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MAX_PEOPLE_PER_RESERVATION: u8 = 12;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct CinemaReservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub people_num: i16,
    pub is_approved: bool,
    pub phone_num: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Optional predicates over `cinema_reservations`.
///
/// Every `Some` field adds exactly one condition, `None` fields add nothing.
/// The inclusive bounds (`*_from`, `*_to`) compare with `>=`/`<=`, while
/// `starts_before`/`ends_after` are strict and are used for overlap checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    pub start_from: Option<DateTime<Utc>>,
    pub start_to: Option<DateTime<Utc>>,
    pub end_from: Option<DateTime<Utc>>,
    pub end_to: Option<DateTime<Utc>>,
    pub starts_before: Option<DateTime<Utc>>,
    pub ends_after: Option<DateTime<Utc>>,
    pub user_ids: Option<Vec<Uuid>>,
    pub people_num_from: Option<i16>,
    pub people_num_to: Option<i16>,
    pub is_approved: Option<bool>,
}

impl ReservationFilter {
    /// Reservations lying entirely inside `[from, to]`.
    pub fn within(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            start_from: Some(from),
            end_to: Some(to),
            ..Default::default()
        }
    }

    /// Reservations sharing at least an instant with `[start, end)`.
    pub fn overlapping(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            starts_before: Some(end),
            ends_after: Some(start),
            ..Default::default()
        }
    }

    pub fn for_users(mut self, user_ids: Vec<Uuid>) -> Self {
        self.user_ids = Some(user_ids);
        self
    }

    pub fn matches(&self, r: &CinemaReservation) -> bool {
        self.start_from.map_or(true, |t| r.start_time >= t)
            && self.start_to.map_or(true, |t| r.start_time <= t)
            && self.end_from.map_or(true, |t| r.end_time >= t)
            && self.end_to.map_or(true, |t| r.end_time <= t)
            && self.starts_before.map_or(true, |t| r.start_time < t)
            && self.ends_after.map_or(true, |t| r.end_time > t)
            && self.user_ids.as_ref().map_or(true, |ids| ids.contains(&r.user_id))
            && self.people_num_from.map_or(true, |n| r.people_num >= n)
            && self.people_num_to.map_or(true, |n| r.people_num <= n)
            && self.is_approved.map_or(true, |a| r.is_approved == a)
    }
}
