use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Guest,
    User,
    Admin,
    God,
}

impl Role {
    /// Admins and superusers see every reservation and skip approval.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Admin | Role::God)
    }
}

#[derive(Debug, Error)]
#[error("unknown role id {0}")]
pub struct UnknownRole(pub i16);

// role_id хранится в БД как smallint
impl TryFrom<i16> for Role {
    type Error = UnknownRole;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Role::Guest),
            1 => Ok(Role::User),
            2 => Ok(Role::Admin),
            3 => Ok(Role::God),
            other => Err(UnknownRole(other)),
        }
    }
}

impl From<Role> for i16 {
    fn from(role: Role) -> Self {
        match role {
            Role::Guest => 0,
            Role::User => 1,
            Role::Admin => 2,
            Role::God => 3,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub apartment_id: Option<Uuid>,
    #[sqlx(rename = "role_id", try_from = "i16")]
    pub role: Role,
}
