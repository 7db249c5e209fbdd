//! In-memory storage with the same uniqueness rules as the Postgres schema.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use cinema_reservation::config::{AppConfig, CinemaConfig, Config, DatabaseConfig, JwtConfig};
use cinema_reservation::error::StorageError;
use cinema_reservation::models::{
    CinemaReservation, DailySlot, NewDailySlot, ReservationFilter, ReservationSlot, Role,
    SlotTemplate, User,
};
use cinema_reservation::repository::{
    ReservationRepository, SlotRepository, StorageResult, UserRepository,
};
use cinema_reservation::AppState;

pub const JWT_SECRET: &str = "test-secret";

#[derive(Default)]
struct Inner {
    templates: Vec<SlotTemplate>,
    daily: Vec<DailySlot>,
    next_daily_id: i64,
    reservations: Vec<CinemaReservation>,
    bindings: Vec<ReservationSlot>,
    users: Vec<User>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

impl MemoryStore {
    /// Store seeded with the four default screening positions.
    pub fn with_default_templates() -> Arc<Self> {
        let store = Self::default();
        {
            let mut inner = store.inner.lock().unwrap();
            inner.templates = vec![
                template(1, "morning", hm(10, 0), hm(12, 0), 1),
                template(2, "afternoon", hm(14, 0), hm(16, 0), 2),
                template(3, "evening", hm(18, 0), hm(20, 0), 3),
                template(4, "night", hm(22, 0), hm(23, 30), 4),
            ];
        }
        Arc::new(store)
    }

    pub fn set_template_active(&self, position: i16, active: bool) {
        let mut inner = self.inner.lock().unwrap();
        for t in inner.templates.iter_mut().filter(|t| t.position == position) {
            t.is_active = active;
        }
    }

    pub fn disable_daily_slot(&self, date: NaiveDate, position: i16) {
        let mut inner = self.inner.lock().unwrap();
        for s in inner
            .daily
            .iter_mut()
            .filter(|s| s.slot_date == date && s.position == position)
        {
            s.is_enabled = false;
        }
    }

    pub fn add_user(&self, username: &str, role: Role, apartment_id: Option<Uuid>) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().users.push(User {
            id,
            username: username.to_string(),
            apartment_id,
            role,
        });
        id
    }

    /// Reservation row without slot bindings, as left by older bookings.
    pub fn insert_unbound_reservation(&self, reservation: CinemaReservation) {
        self.inner.lock().unwrap().reservations.push(reservation);
    }

    pub fn daily_slots_on(&self, date: NaiveDate) -> Vec<DailySlot> {
        let inner = self.inner.lock().unwrap();
        inner
            .daily
            .iter()
            .filter(|s| s.slot_date == date)
            .cloned()
            .collect()
    }

    pub fn bound_slot_ids(&self) -> Vec<i64> {
        let inner = self.inner.lock().unwrap();
        inner.bindings.iter().map(|b| b.daily_slot_id).collect()
    }

    pub fn bindings_of(&self, reservation_id: Uuid) -> Vec<i64> {
        let inner = self.inner.lock().unwrap();
        inner
            .bindings
            .iter()
            .filter(|b| b.reservation_id == reservation_id)
            .map(|b| b.daily_slot_id)
            .collect()
    }

    pub fn reservation_count(&self) -> usize {
        self.inner.lock().unwrap().reservations.len()
    }
}

fn template(id: i16, code: &str, start: NaiveTime, end: NaiveTime, position: i16) -> SlotTemplate {
    SlotTemplate {
        id,
        code: code.to_string(),
        start_time: start,
        end_time: end,
        position,
        is_active: true,
    }
}

#[async_trait]
impl SlotRepository for MemoryStore {
    async fn active_templates(&self) -> StorageResult<Vec<SlotTemplate>> {
        let inner = self.inner.lock().unwrap();
        let mut active: Vec<_> = inner.templates.iter().filter(|t| t.is_active).cloned().collect();
        active.sort_by_key(|t| t.position);
        Ok(active)
    }

    async fn insert_daily_slots(&self, slots: &[NewDailySlot]) -> StorageResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut created = 0;
        for slot in slots {
            let exists = inner
                .daily
                .iter()
                .any(|d| d.slot_date == slot.slot_date && d.position == slot.position);
            if exists {
                continue;
            }
            inner.next_daily_id += 1;
            let id = inner.next_daily_id;
            inner.daily.push(DailySlot {
                id,
                slot_date: slot.slot_date,
                template_id: slot.template_id,
                position: slot.position,
                start_at: slot.start_at,
                end_at: slot.end_at,
                is_enabled: true,
            });
            created += 1;
        }
        Ok(created)
    }

    async fn free_daily_slots(&self, date: NaiveDate) -> StorageResult<Vec<DailySlot>> {
        let inner = self.inner.lock().unwrap();
        let mut free: Vec<_> = inner
            .daily
            .iter()
            .filter(|s| s.slot_date == date && s.is_enabled)
            .filter(|s| !inner.bindings.iter().any(|b| b.daily_slot_id == s.id))
            .cloned()
            .collect();
        free.sort_by_key(|s| s.position);
        Ok(free)
    }

    async fn daily_slots_by_positions(
        &self,
        date: NaiveDate,
        positions: &[i16],
    ) -> StorageResult<Vec<DailySlot>> {
        let mut slots: Vec<_> = self
            .daily_slots_on(date)
            .into_iter()
            .filter(|s| positions.contains(&s.position))
            .collect();
        slots.sort_by_key(|s| s.position);
        Ok(slots)
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn create_with_slots(
        &self,
        reservation: &CinemaReservation,
        bindings: &[ReservationSlot],
    ) -> StorageResult<()> {
        let mut inner = self.inner.lock().unwrap();
        // all-or-nothing, like the transaction
        for binding in bindings {
            if inner
                .bindings
                .iter()
                .any(|b| b.daily_slot_id == binding.daily_slot_id)
            {
                return Err(StorageError::Conflict("ux_reservation_slots_daily_slot".into()));
            }
        }
        inner.reservations.push(reservation.clone());
        inner.bindings.extend_from_slice(bindings);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<CinemaReservation>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.reservations.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_filter(
        &self,
        filter: &ReservationFilter,
    ) -> StorageResult<Vec<CinemaReservation>> {
        let inner = self.inner.lock().unwrap();
        let mut found: Vec<_> = inner
            .reservations
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        found.sort_by_key(|r| (r.start_time, r.created_at));
        Ok(found)
    }

    async fn approve(&self, id: Uuid) -> StorageResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner.reservations.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.is_approved = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_apartment_id(&self, apartment_id: Uuid) -> StorageResult<Vec<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .filter(|u| u.apartment_id == Some(apartment_id))
            .cloned()
            .collect())
    }
}

pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            rust_log: "cinema_reservation=debug".to_string(),
            request_timeout_secs: 5,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            pool_size: 1,
            acquire_timeout_secs: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
        cinema: CinemaConfig::default(),
    }
}

pub fn state_with(store: &Arc<MemoryStore>, config: Config) -> AppState {
    AppState::with_repositories(config, store.clone(), store.clone(), store.clone())
}

pub fn state(store: &Arc<MemoryStore>) -> AppState {
    state_with(store, test_config())
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 17).unwrap()
}
