use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: String,
}

/// A category that has not been persisted yet. Only the seeder creates these.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: &'static str,
    pub description: &'static str,
}
