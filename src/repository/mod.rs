//! Storage traits for the reservation core and their Postgres implementations.
//!
//! Services depend on the traits only, so the allocation logic can run against
//! any store that enforces the same uniqueness rules:
//! one daily slot per `(slot_date, position)` and one binding per `daily_slot_id`.

pub mod reservations;
pub mod slots;
pub mod users;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::StorageError;
use crate::models::{
    CinemaReservation, DailySlot, NewDailySlot, ReservationFilter, ReservationSlot, SlotTemplate,
    User,
};

pub use reservations::PgReservationRepository;
pub use slots::PgSlotRepository;
pub use users::PgUserRepository;

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Active templates ordered by position.
    async fn active_templates(&self) -> StorageResult<Vec<SlotTemplate>>;

    /// Inserts the slots, silently skipping `(slot_date, position)` pairs that
    /// already exist. Returns how many rows were actually created.
    async fn insert_daily_slots(&self, slots: &[NewDailySlot]) -> StorageResult<u64>;

    /// Enabled slots of the date without a reservation binding, by position.
    async fn free_daily_slots(&self, date: NaiveDate) -> StorageResult<Vec<DailySlot>>;

    async fn daily_slots_by_positions(
        &self,
        date: NaiveDate,
        positions: &[i16],
    ) -> StorageResult<Vec<DailySlot>>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Stores the reservation and its slot bindings atomically.
    /// A binding to an already taken slot fails with [`StorageError::Conflict`]
    /// and leaves nothing behind.
    async fn create_with_slots(
        &self,
        reservation: &CinemaReservation,
        bindings: &[ReservationSlot],
    ) -> StorageResult<()>;

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<CinemaReservation>>;

    async fn find_by_filter(&self, filter: &ReservationFilter)
        -> StorageResult<Vec<CinemaReservation>>;

    /// Returns false when no reservation has this id.
    async fn approve(&self, id: Uuid) -> StorageResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<User>>;
    async fn find_by_apartment_id(&self, apartment_id: Uuid) -> StorageResult<Vec<User>>;
}
