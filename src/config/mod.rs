use chrono_tz::Tz;
use std::env;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cinema: CinemaConfig,
}

// Настройки приложения
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    /// Deadline for a single HTTP request; the handler future is dropped when it expires.
    pub request_timeout_secs: u64,
}

// Настройки базы данных
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub acquire_timeout_secs: u64,
}

// Проверка JWT (токены выпускает сервис авторизации)
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

// Настройки кинозала
#[derive(Debug, Clone)]
pub struct CinemaConfig {
    /// Timezone the calendar dates of the cinema room are anchored to.
    pub timezone: Tz,
    /// Free reservations a household may hold inside one booking window.
    pub household_quota: u32,
    /// Longest window accepted by the free-interval query.
    pub max_window_hours: i64,
}

impl Default for CinemaConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            household_quota: 5,
            max_window_hours: 24 * 7,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "cinema_reservation=debug,tower_http=debug".to_string()),
                request_timeout_secs: env::var("REQUEST_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("REQUEST_TIMEOUT_SECONDS must be a valid number"),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
                pool_size: env::var("DB_POOL_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .expect("DB_POOL_SIZE must be a valid number"),
                acquire_timeout_secs: env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number"),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            },
            cinema: CinemaConfig {
                timezone: env::var("CINEMA_TIMEZONE")
                    .unwrap_or_else(|_| "UTC".to_string())
                    .parse()
                    .expect("CINEMA_TIMEZONE must be an IANA timezone name"),
                household_quota: env::var("CINEMA_HOUSEHOLD_QUOTA")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("CINEMA_HOUSEHOLD_QUOTA must be a valid number"),
                max_window_hours: env::var("CINEMA_MAX_WINDOW_HOURS")
                    .unwrap_or_else(|_| "168".to_string())
                    .parse()
                    .expect("CINEMA_MAX_WINDOW_HOURS must be a valid number"),
            },
        }
    }
}
