//! Reservation allocation, approval and listing.
//!
//! Double booking is prevented by storage alone: every reserved daily slot gets
//! a binding row, and bindings are unique per daily slot. Two requests racing
//! for the same slot both reach the create transaction; the loser gets
//! [`AppError::CinemaBusy`].

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::intervals::{free_intervals, Interval};
use super::slots::SlotService;
use crate::config::CinemaConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    CinemaReservation, ReservationFilter, ReservationSlot, Role, User, MAX_PEOPLE_PER_RESERVATION,
};
use crate::repository::{ReservationRepository, UserRepository};

// логин в формате телефона: +77011234567
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\d{11}$").expect("phone regex is valid"));

/// Result of a successful booking.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationOutcome {
    pub reservation: CinemaReservation,
    /// Informational: free reservations the household has left in this window.
    pub remaining_quota: u32,
}

#[derive(Clone)]
pub struct ReservationService {
    slots: SlotService,
    reservations: Arc<dyn ReservationRepository>,
    users: Arc<dyn UserRepository>,
    household_quota: u32,
    max_window: Duration,
}

impl ReservationService {
    pub fn new(
        slots: SlotService,
        reservations: Arc<dyn ReservationRepository>,
        users: Arc<dyn UserRepository>,
        config: &CinemaConfig,
    ) -> Self {
        Self {
            slots,
            reservations,
            users,
            household_quota: config.household_quota,
            max_window: Duration::hours(config.max_window_hours),
        }
    }

    /// Books one slot or two adjacent slots of `date` for `user_id`.
    #[instrument(skip(self, contact), err(level = "debug"))]
    pub async fn make_reservation(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        positions: &[i16],
        party_size: u8,
        role: Role,
        contact: &str,
    ) -> AppResult<ReservationOutcome> {
        let positions = validate_request(positions, party_size)?;

        self.slots.ensure_daily_slots(date).await?;

        let mut resolved = self.slots.slots_by_positions(date, &positions).await?;
        resolved.retain(|s| s.is_enabled);
        resolved.sort_by_key(|s| s.position);
        if resolved.len() != positions.len() {
            return Err(AppError::invalid("requested slot does not exist on this date"));
        }

        let (first, last) = match (resolved.first(), resolved.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(AppError::invalid("no slots requested")),
        };
        let (start, end) = (first.start_at, last.end_at);

        let remaining_quota = self.remaining_quota(user_id, start, end).await?;

        let reservation = CinemaReservation {
            id: Uuid::new_v4(),
            user_id,
            start_time: start,
            end_time: end,
            people_num: i16::from(party_size),
            is_approved: role.is_privileged(),
            phone_num: PHONE_RE.is_match(contact).then(|| contact.to_string()),
            created_at: Utc::now(),
        };
        let bindings: Vec<ReservationSlot> = resolved
            .iter()
            .map(|s| ReservationSlot {
                reservation_id: reservation.id,
                daily_slot_id: s.id,
            })
            .collect();

        self.reservations
            .create_with_slots(&reservation, &bindings)
            .await?;

        info!(
            reservation_id = %reservation.id,
            %date,
            ?positions,
            approved = reservation.is_approved,
            remaining_quota,
            "cinema reservation created"
        );

        Ok(ReservationOutcome {
            reservation,
            remaining_quota,
        })
    }

    /// Household allowance minus household reservations overlapping `[start, end)`.
    async fn remaining_quota(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<u32> {
        let household = self.household_of(user_id).await?;

        let taken = self
            .reservations
            .find_by_filter(&ReservationFilter::overlapping(start, end).for_users(household))
            .await?
            .len();

        let taken = u32::try_from(taken).unwrap_or(u32::MAX);
        Ok(self.household_quota.saturating_sub(taken))
    }

    async fn household_of(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let user = self.find_user(user_id).await?;
        let Some(apartment_id) = user.apartment_id else {
            return Ok(vec![user.id]);
        };

        let mut ids: Vec<Uuid> = self
            .users
            .find_by_apartment_id(apartment_id)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();
        if !ids.contains(&user.id) {
            ids.push(user.id);
        }
        Ok(ids)
    }

    async fn find_user(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Marks the reservation approved. Approving twice is not an error.
    #[instrument(skip(self), err(level = "debug"))]
    pub async fn approve_reservation(&self, id: Uuid) -> AppResult<()> {
        let reservation = self
            .reservations
            .find_by_id(id)
            .await?
            .ok_or(AppError::ReservationNotFound)?;

        if reservation.is_approved {
            return Ok(());
        }

        if !self.reservations.approve(id).await? {
            return Err(AppError::ReservationNotFound);
        }
        info!(reservation_id = %id, "cinema reservation approved");
        Ok(())
    }

    /// Reservations inside `start 00:00:00 ..= end 23:59:59` UTC visible to `user_id`.
    #[instrument(skip(self), err(level = "debug"))]
    pub async fn get_user_reservations(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<CinemaReservation>> {
        if start > end {
            return Err(AppError::invalid("`from` is after `to`"));
        }
        let from = start.and_time(NaiveTime::MIN).and_utc();
        let to = end
            .and_hms_opt(23, 59, 59)
            .map(|t| t.and_utc())
            .ok_or_else(|| AppError::invalid("invalid end date"))?;

        let user = self.find_user(user_id).await?;
        let reservations = self
            .reservations
            .find_by_filter(&ReservationFilter::within(from, to))
            .await?;

        Ok(visible_to(&user, reservations))
    }

    /// Continuous free time in `[from, to)` not covered by any stored reservation.
    #[instrument(skip(self), err(level = "debug"))]
    pub async fn get_free_intervals(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Interval<DateTime<Utc>>>> {
        if to <= from {
            return Err(AppError::invalid("`to` must be after `from`"));
        }
        if to - from > self.max_window {
            return Err(AppError::ReservationImpossible);
        }

        let busy = self
            .reservations
            .find_by_filter(&ReservationFilter::overlapping(from, to))
            .await?
            .into_iter()
            .map(|r| Interval::new(r.start_time, r.end_time));

        Ok(free_intervals(&Interval::new(from, to), busy))
    }
}

/// Checks the request shape and returns the positions sorted ascending.
fn validate_request(positions: &[i16], party_size: u8) -> AppResult<Vec<i16>> {
    if party_size > MAX_PEOPLE_PER_RESERVATION {
        return Err(AppError::TooManyPeople);
    }
    if party_size == 0 {
        return Err(AppError::invalid("party size must be at least 1"));
    }
    if positions.len() != 1 && positions.len() != 2 {
        return Err(AppError::invalid("book one slot or two adjacent slots"));
    }

    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    if let &[a, b] = sorted.as_slice() {
        if a.checked_add(1) != Some(b) {
            return Err(AppError::invalid("two slots must be adjacent"));
        }
    }
    Ok(sorted)
}

// Фильтрация после выборки: админы видят всё, остальные только свои брони
fn visible_to(user: &User, reservations: Vec<CinemaReservation>) -> Vec<CinemaReservation> {
    if user.role.is_privileged() {
        return reservations;
    }
    reservations
        .into_iter()
        .filter(|r| r.user_id == user.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn party_size_is_checked_before_positions() {
        assert!(matches!(validate_request(&[], 13), Err(AppError::TooManyPeople)));
        assert!(validate_request(&[1], 12).is_ok());
        assert!(matches!(validate_request(&[1], 0), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn one_or_two_positions_only() {
        assert!(matches!(validate_request(&[], 2), Err(AppError::InvalidInput(_))));
        assert!(matches!(validate_request(&[1, 2, 3], 2), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn two_positions_must_be_adjacent_in_any_order() {
        assert_eq!(validate_request(&[3, 2], 2).unwrap(), vec![2, 3]);
        assert!(matches!(validate_request(&[2, 4], 2), Err(AppError::InvalidInput(_))));
        assert!(matches!(validate_request(&[2, 2], 2), Err(AppError::InvalidInput(_))));
        assert!(matches!(
            validate_request(&[i16::MAX, i16::MAX], 2),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn phone_pattern_requires_plus_and_eleven_digits() {
        assert!(PHONE_RE.is_match("+77011234567"));
        assert!(!PHONE_RE.is_match("77011234567"));
        assert!(!PHONE_RE.is_match("+7701123456"));
        assert!(!PHONE_RE.is_match("neighbour@example.com"));
    }

    fn reservation_of(user_id: Uuid) -> CinemaReservation {
        let now = Utc::now();
        CinemaReservation {
            id: Uuid::new_v4(),
            user_id,
            start_time: now,
            end_time: now,
            people_num: 2,
            is_approved: false,
            phone_num: None,
            created_at: now,
        }
    }

    #[test]
    fn regular_users_only_see_their_own_reservations() {
        let me = User {
            id: Uuid::new_v4(),
            username: "me".into(),
            apartment_id: None,
            role: Role::Guest,
        };
        let rows = vec![reservation_of(me.id), reservation_of(Uuid::new_v4())];

        let mine = visible_to(&me, rows.clone());
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, me.id);

        let admin = User { role: Role::Admin, ..me };
        assert_eq!(visible_to(&admin, rows).len(), 2);
    }
}
