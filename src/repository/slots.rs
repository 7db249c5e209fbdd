use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{SlotRepository, StorageResult};
use crate::models::{DailySlot, NewDailySlot, SlotTemplate};

#[derive(Clone)]
pub struct PgSlotRepository {
    pool: PgPool,
}

impl PgSlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotRepository for PgSlotRepository {
    async fn active_templates(&self) -> StorageResult<Vec<SlotTemplate>> {
        let templates = sqlx::query_as::<_, SlotTemplate>(
            "SELECT id, code, start_time, end_time, position, is_active
             FROM slot_templates
             WHERE is_active = true
             ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    async fn insert_daily_slots(&self, slots: &[NewDailySlot]) -> StorageResult<u64> {
        if slots.is_empty() {
            return Ok(0);
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO daily_slots (slot_date, template_id, position, start_at, end_at, is_enabled) ",
        );
        qb.push_values(slots, |mut row, slot| {
            row.push_bind(slot.slot_date)
                .push_bind(slot.template_id)
                .push_bind(slot.position)
                .push_bind(slot.start_at)
                .push_bind(slot.end_at)
                .push_bind(true);
        });
        // параллельные запросы на ту же дату не должны падать
        qb.push(" ON CONFLICT (slot_date, position) DO NOTHING");

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn free_daily_slots(&self, date: NaiveDate) -> StorageResult<Vec<DailySlot>> {
        let slots = sqlx::query_as::<_, DailySlot>(
            r#"
            SELECT ds.id, ds.slot_date, ds.template_id, ds.position, ds.start_at, ds.end_at, ds.is_enabled
            FROM daily_slots ds
            LEFT JOIN reservation_slots rs ON rs.daily_slot_id = ds.id
            WHERE ds.slot_date = $1
              AND ds.is_enabled = true
              AND rs.daily_slot_id IS NULL
            ORDER BY ds.position
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }

    async fn daily_slots_by_positions(
        &self,
        date: NaiveDate,
        positions: &[i16],
    ) -> StorageResult<Vec<DailySlot>> {
        let slots = sqlx::query_as::<_, DailySlot>(
            "SELECT id, slot_date, template_id, position, start_at, end_at, is_enabled
             FROM daily_slots
             WHERE slot_date = $1 AND position = ANY($2)
             ORDER BY position",
        )
        .bind(date)
        .bind(positions)
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }
}
