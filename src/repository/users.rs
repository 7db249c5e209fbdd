use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StorageResult, UserRepository};
use crate::models::User;

/// Read-only view of the users table owned by the auth service.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, apartment_id, role_id FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_apartment_id(&self, apartment_id: Uuid) -> StorageResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, apartment_id, role_id FROM users WHERE apartment_id = $1",
        )
        .bind(apartment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
