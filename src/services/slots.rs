//! Daily slot materialization and free-slot calculation.
//!
//! A date is a calendar day in the cinema's timezone. Template times of day are
//! resolved to absolute instants in that timezone first and only then stored as UTC.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, instrument};

use crate::error::AppResult;
use crate::models::{DailySlot, NewDailySlot, SlotTemplate};
use crate::repository::SlotRepository;

#[derive(Clone)]
pub struct SlotService {
    repo: Arc<dyn SlotRepository>,
    timezone: Tz,
}

impl SlotService {
    pub fn new(repo: Arc<dyn SlotRepository>, timezone: Tz) -> Self {
        Self { repo, timezone }
    }

    /// Makes sure every active template has a daily slot on `date`.
    /// Safe to call any number of times, concurrently included.
    #[instrument(skip(self), err(level = "debug"))]
    pub async fn ensure_daily_slots(&self, date: NaiveDate) -> AppResult<u64> {
        let templates = self.repo.active_templates().await?;
        let slots = materialize(&templates, date, self.timezone);
        let created = self.repo.insert_daily_slots(&slots).await?;
        if created > 0 {
            debug!(created, %date, "materialized daily slots");
        }
        Ok(created)
    }

    /// Enabled, unbound slots of `date` ordered by position.
    #[instrument(skip(self), err(level = "debug"))]
    pub async fn get_free_daily_slots(&self, date: NaiveDate) -> AppResult<Vec<DailySlot>> {
        self.ensure_daily_slots(date).await?;
        Ok(self.repo.free_daily_slots(date).await?)
    }

    /// Adjacent position pairs `(p, p + 1)` that are both free on `date`.
    pub async fn get_free_slot_pairs(&self, date: NaiveDate) -> AppResult<Vec<[i16; 2]>> {
        let free = self.get_free_daily_slots(date).await?;
        Ok(free_slot_pairs(&free))
    }

    pub(crate) async fn slots_by_positions(
        &self,
        date: NaiveDate,
        positions: &[i16],
    ) -> AppResult<Vec<DailySlot>> {
        Ok(self.repo.daily_slots_by_positions(date, positions).await?)
    }
}

/// Wall-clock `time` on `date` in `tz`, as UTC.
///
/// Ambiguous local times take the later instant; times skipped by a DST jump
/// fall back to reading the wall clock as UTC.
pub fn local_instant(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Concrete slots for every active template on `date`.
/// A template whose end is not after its start ends on the next day.
pub fn materialize(templates: &[SlotTemplate], date: NaiveDate, tz: Tz) -> Vec<NewDailySlot> {
    templates
        .iter()
        .filter(|t| t.is_active)
        .map(|t| {
            let end_date = if t.end_time <= t.start_time {
                date.checked_add_days(Days::new(1)).unwrap_or(date)
            } else {
                date
            };
            NewDailySlot {
                slot_date: date,
                template_id: t.id,
                position: t.position,
                start_at: local_instant(date, t.start_time, tz),
                end_at: local_instant(end_date, t.end_time, tz),
            }
        })
        .collect()
}

pub fn free_slot_pairs(free: &[DailySlot]) -> Vec<[i16; 2]> {
    let positions: BTreeSet<i16> = free.iter().map(|s| s.position).collect();
    positions
        .iter()
        .filter_map(|&p| {
            let next = p.checked_add(1)?;
            positions.contains(&next).then_some([p, next])
        })
        .collect()
}
