use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ReservationRepository, StorageResult};
use crate::models::{CinemaReservation, ReservationFilter, ReservationSlot};

const SELECT_RESERVATIONS: &str = "SELECT id, user_id, start_time, end_time, people_num, \
     is_approved, phone_num, created_at FROM cinema_reservations WHERE true";

#[derive(Clone)]
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translates the filter into a parameterized query, one `AND` per present field.
fn filter_query(filter: &ReservationFilter) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new(SELECT_RESERVATIONS);

    if let Some(t) = filter.start_from {
        qb.push(" AND start_time >= ").push_bind(t);
    }
    if let Some(t) = filter.start_to {
        qb.push(" AND start_time <= ").push_bind(t);
    }
    if let Some(t) = filter.end_from {
        qb.push(" AND end_time >= ").push_bind(t);
    }
    if let Some(t) = filter.end_to {
        qb.push(" AND end_time <= ").push_bind(t);
    }
    if let Some(t) = filter.starts_before {
        qb.push(" AND start_time < ").push_bind(t);
    }
    if let Some(t) = filter.ends_after {
        qb.push(" AND end_time > ").push_bind(t);
    }
    if let Some(ids) = &filter.user_ids {
        qb.push(" AND user_id = ANY(").push_bind(ids.as_slice()).push(")");
    }
    if let Some(n) = filter.people_num_from {
        qb.push(" AND people_num >= ").push_bind(n);
    }
    if let Some(n) = filter.people_num_to {
        qb.push(" AND people_num <= ").push_bind(n);
    }
    if let Some(approved) = filter.is_approved {
        qb.push(" AND is_approved = ").push_bind(approved);
    }

    qb.push(" ORDER BY start_time, created_at");
    qb
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn create_with_slots(
        &self,
        reservation: &CinemaReservation,
        bindings: &[ReservationSlot],
    ) -> StorageResult<()> {
        // Если future дропнут до commit, транзакция откатывается сама
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO cinema_reservations
                (id, user_id, start_time, end_time, people_num, is_approved, phone_num, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.user_id)
        .bind(reservation.start_time)
        .bind(reservation.end_time)
        .bind(reservation.people_num)
        .bind(reservation.is_approved)
        .bind(&reservation.phone_num)
        .bind(reservation.created_at)
        .execute(&mut *tx)
        .await?;

        for binding in bindings {
            sqlx::query("INSERT INTO reservation_slots (reservation_id, daily_slot_id) VALUES ($1, $2)")
                .bind(binding.reservation_id)
                .bind(binding.daily_slot_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<CinemaReservation>> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_RESERVATIONS);
        qb.push(" AND id = ").push_bind(id);

        let reservation = qb
            .build_query_as::<CinemaReservation>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(reservation)
    }

    async fn find_by_filter(
        &self,
        filter: &ReservationFilter,
    ) -> StorageResult<Vec<CinemaReservation>> {
        let reservations = filter_query(filter)
            .build_query_as::<CinemaReservation>()
            .fetch_all(&self.pool)
            .await?;

        Ok(reservations)
    }

    async fn approve(&self, id: Uuid) -> StorageResult<bool> {
        let result = sqlx::query("UPDATE cinema_reservations SET is_approved = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
