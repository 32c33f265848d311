use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::{AppError, AppResult};

/// Matches the `NUMERIC(12, 2)` prize column.
const PRIZE_SCALE: u32 = 2;
const PRIZE_LIMIT: i64 = 10_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: String,
    pub prize: Option<Decimal>,
    pub category_id: i32,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /events` and `PUT /events/{id}`.
///
/// The owner is never read from the body; it always comes from the bearer token.
#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub prize: Option<Decimal>,
    pub category_id: i32,
}

impl EventInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Event name must not be empty".to_string(),
            ));
        }
        if self.location.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Event location must not be empty".to_string(),
            ));
        }
        if self.end_date < self.start_date {
            return Err(AppError::ValidationError(
                "end_date must not be earlier than start_date".to_string(),
            ));
        }
        if matches!(self.prize, Some(prize) if prize.is_sign_negative()) {
            return Err(AppError::ValidationError(
                "prize must not be negative".to_string(),
            ));
        }
        if let Some(prize) = self.prize {
            if prize.round_dp(PRIZE_SCALE) != prize {
                return Err(AppError::ValidationError(format!(
                    "prize must have at most {} decimal places",
                    PRIZE_SCALE
                )));
            }
            if prize >= Decimal::from(PRIZE_LIMIT) {
                return Err(AppError::ValidationError(format!(
                    "prize must be less than {}",
                    PRIZE_LIMIT
                )));
            }
        }
        Ok(())
    }

    /// Builds the row for a freshly created event owned by `owner`.
    pub fn into_event(self, owner: Uuid, now: DateTime<Utc>) -> Event {
        Event {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            location: self.location,
            prize: self.prize,
            category_id: self.category_id,
            user_id: owner,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Event {
    /// Replaces every editable field, keeping identity and ownership.
    pub fn apply(&mut self, input: EventInput, now: DateTime<Utc>) {
        self.name = input.name;
        self.description = input.description;
        self.start_date = input.start_date;
        self.end_date = input.end_date;
        self.location = input.location;
        self.prize = input.prize;
        self.category_id = input.category_id;
        self.updated_at = now;
    }
}
