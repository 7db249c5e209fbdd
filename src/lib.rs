pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;

use axum::{
    http::StatusCode,
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use repository::{
    PgReservationRepository, PgSlotRepository, PgUserRepository, ReservationRepository,
    SlotRepository, UserRepository,
};
use services::{ReservationService, SlotService};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub slots: SlotService,
    pub reservations: ReservationService,
}

impl AppState {
    /// State backed by Postgres repositories.
    pub fn new(config: config::Config, db: &database::Database) -> Self {
        Self::with_repositories(
            config,
            Arc::new(PgSlotRepository::new(db.pool.clone())),
            Arc::new(PgReservationRepository::new(db.pool.clone())),
            Arc::new(PgUserRepository::new(db.pool.clone())),
        )
    }

    pub fn with_repositories(
        config: config::Config,
        slot_repo: Arc<dyn SlotRepository>,
        reservation_repo: Arc<dyn ReservationRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        let slots = SlotService::new(slot_repo, config.cinema.timezone);
        let reservations =
            ReservationService::new(slots.clone(), reservation_repo, user_repo, &config.cinema);
        Self {
            config,
            slots,
            reservations,
        }
    }
}

/// Full HTTP application: routes, state and middleware layers.
pub fn app(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.app.request_timeout_secs);

    Router::new()
        .route("/", get(|| async { "Cinema reservation API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        // по таймауту future запроса дропается, открытая транзакция откатывается
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(map_response(timeout_envelope))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

// TimeoutLayer answers with an empty body
async fn timeout_envelope(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return error::AppError::RequestTimeout.into_response();
    }
    response
}
