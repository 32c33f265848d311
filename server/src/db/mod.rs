//! Persistence for events, categories and users.
//!
//! Handlers only see [`EventStore`]. [`PgStore`] backs the running server;
//! [`MemoryStore`] keeps everything in process and is used by the test suite.

mod memory;
mod postgres;
pub mod seed;

use async_trait::async_trait;
use uuid::Uuid;

use crate::filter::EventQuery;
use crate::models::{Category, Event, EventInput, NewCategory, NewUser, User};
use crate::utils::error::{AppError, AppResult};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    async fn find_category(&self, id: i32) -> AppResult<Option<Category>>;

    /// Inserts `categories` only when no category exists yet, returning
    /// whatever the table holds afterwards.
    async fn seed_categories(&self, categories: &[NewCategory]) -> AppResult<Vec<Category>>;

    /// Fails with [`AppError::Conflict`] when the email is taken.
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn list_events(&self, query: &EventQuery) -> AppResult<Vec<Event>>;

    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>>;

    /// Fails with [`AppError::NotFound`] before inserting anything when the
    /// category does not exist.
    async fn create_event(&self, owner: Uuid, input: EventInput) -> AppResult<Event>;

    /// Fails with [`AppError::NotFound`] when the event is missing, belongs to
    /// someone other than `owner`, or the new category does not exist.
    async fn update_event(&self, owner: Uuid, id: Uuid, input: EventInput) -> AppResult<Event>;

    /// Same ownership rule as [`EventStore::update_event`].
    async fn delete_event(&self, owner: Uuid, id: Uuid) -> AppResult<()>;
}

pub(crate) fn category_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Category with id {} not found", id))
}

pub(crate) fn event_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Event with id {} not found", id))
}

pub(crate) fn email_taken(email: &str) -> AppError {
    AppError::Conflict(format!("A user with email '{}' already exists", email))
}
