use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    /// Validates the registration and returns it with a trimmed name and
    /// lowercased email.
    pub fn normalized(self) -> AppResult<Self> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_lowercase();

        if name.is_empty() {
            return Err(AppError::ValidationError(
                "User name must not be empty".to_string(),
            ));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => {
                return Err(AppError::ValidationError(format!(
                    "'{}' is not a valid email address",
                    email
                )))
            }
        }

        Ok(Self { name, email })
    }

    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: Uuid::new_v4(),
            name: self.name,
            email: self.email,
            created_at: now,
            updated_at: now,
        }
    }
}
