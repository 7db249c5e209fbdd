use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{ApiResponse, AppJson, AppQuery};
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::DailySlot;
use crate::services::slots::free_slot_pairs;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reservation", post(create_reservation).get(list_reservations))
        .route("/reservation/approve", patch(approve_reservation))
        .route("/reservation/free-slots", get(get_free_slots))
        .route("/reservation/free-intervals", get(get_free_intervals))
}

/* ---------- helpers ---------- */

// YYYY-MM-DD, либо RFC3339 (берётся дата в UTC)
fn parse_day(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| AppError::invalid("invalid date format (YYYY-MM-DD)"))
}

/* ---------- RESERVATIONS ---------- */

// POST /api/reservation
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservationRequest {
    pub time_slots: Vec<i16>,
    #[validate(range(min = 1))]
    pub people_num: u8,
    #[validate(length(min = 1))]
    pub date: String,
}

async fn create_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppJson(req): AppJson<CreateReservationRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()
        .map_err(|e| AppError::invalid(e.to_string()))?;
    let date = parse_day(&req.date)?;

    let outcome = state
        .reservations
        .make_reservation(
            user.user_id,
            date,
            &req.time_slots,
            req.people_num,
            user.role,
            &user.username,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(outcome))))
}

// GET /api/reservation?from=..&to=.. | ?date=..
#[derive(Debug, Deserialize)]
pub struct ListReservationsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
}

async fn list_reservations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppQuery(params): AppQuery<ListReservationsQuery>,
) -> AppResult<impl IntoResponse> {
    let (from, to) = match (params.date, params.from, params.to) {
        (Some(date), _, _) => {
            let day = parse_day(&date)?;
            (day, day)
        }
        (None, Some(from), Some(to)) => (parse_day(&from)?, parse_day(&to)?),
        (None, Some(single), None) | (None, None, Some(single)) => {
            let day = parse_day(&single)?;
            (day, day)
        }
        (None, None, None) => return Err(AppError::invalid("date or from/to is required")),
    };

    let reservations = state
        .reservations
        .get_user_reservations(user.user_id, from, to)
        .await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(reservations))))
}

// PATCH /api/reservation/approve?reservation_id=..
#[derive(Debug, Deserialize)]
pub struct ApproveQuery {
    pub reservation_id: Uuid,
}

async fn approve_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppQuery(params): AppQuery<ApproveQuery>,
) -> AppResult<StatusCode> {
    user.require_privileged()?;

    state
        .reservations
        .approve_reservation(params.reservation_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/* ---------- FREE TIME ---------- */

// GET /api/reservation/free-slots?date=..
#[derive(Debug, Deserialize)]
pub struct FreeSlotsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FreeSlotsResponse {
    pub free_slots: Vec<DailySlot>,
    pub free_pairs: Vec<[i16; 2]>,
}

async fn get_free_slots(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<FreeSlotsQuery>,
) -> AppResult<impl IntoResponse> {
    let date = params
        .date
        .as_deref()
        .ok_or_else(|| AppError::invalid("date is required"))
        .and_then(parse_day)?;

    let free_slots = state.slots.get_free_daily_slots(date).await?;
    let free_pairs = free_slot_pairs(&free_slots);

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(FreeSlotsResponse {
            free_slots,
            free_pairs,
        })),
    ))
}

// GET /api/reservation/free-intervals?from=..&to=.. (RFC3339)
#[derive(Debug, Deserialize)]
pub struct FreeIntervalsQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

async fn get_free_intervals(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<FreeIntervalsQuery>,
) -> AppResult<impl IntoResponse> {
    let free = state
        .reservations
        .get_free_intervals(params.from, params.to)
        .await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(free))))
}
