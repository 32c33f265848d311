use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{category_not_found, email_taken, event_not_found, EventStore};
use crate::filter::EventQuery;
use crate::models::{Category, Event, EventInput, NewCategory, NewUser, User};
use crate::utils::error::AppResult;

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    users: Vec<User>,
    events: Vec<Event>,
}

/// In-process [`EventStore`]. Rows are kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.tables.read().await.categories.clone())
    }

    async fn find_category(&self, id: i32) -> AppResult<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn seed_categories(&self, categories: &[NewCategory]) -> AppResult<Vec<Category>> {
        let mut tables = self.tables.write().await;
        if tables.categories.is_empty() {
            tables.categories = categories
                .iter()
                .zip(1..)
                .map(|(category, id)| Category {
                    id,
                    name: category.name.to_string(),
                    description: category.description.to_string(),
                })
                .collect();
        }
        Ok(tables.categories.clone())
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(email_taken(&user.email));
        }

        let user = user.into_user(Utc::now());
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_events(&self, query: &EventQuery) -> AppResult<Vec<Event>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .filter(|event| query.matches(event))
            .cloned()
            .collect())
    }

    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        let tables = self.tables.read().await;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    async fn create_event(&self, owner: Uuid, input: EventInput) -> AppResult<Event> {
        let mut tables = self.tables.write().await;
        if !tables.categories.iter().any(|c| c.id == input.category_id) {
            return Err(category_not_found(input.category_id));
        }

        let event = input.into_event(owner, Utc::now());
        tables.events.push(event.clone());
        Ok(event)
    }

    async fn update_event(&self, owner: Uuid, id: Uuid, input: EventInput) -> AppResult<Event> {
        let mut tables = self.tables.write().await;
        let category_exists = tables.categories.iter().any(|c| c.id == input.category_id);

        let event = tables
            .events
            .iter_mut()
            .find(|e| e.id == id && e.user_id == owner)
            .ok_or_else(|| event_not_found(id))?;
        if !category_exists {
            return Err(category_not_found(input.category_id));
        }

        event.apply(input, Utc::now());
        Ok(event.clone())
    }

    async fn delete_event(&self, owner: Uuid, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let position = tables
            .events
            .iter()
            .position(|e| e.id == id && e.user_id == owner)
            .ok_or_else(|| event_not_found(id))?;

        tables.events.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed::DEFAULT_CATEGORIES;
    use crate::utils::error::AppError;
    use chrono::TimeZone;

    fn input(category_id: i32) -> EventInput {
        EventInput {
            name: "Hackathon".to_string(),
            description: "48h".to_string(),
            start_date: Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 3, 17, 9, 0, 0).unwrap(),
            location: "Lima".to_string(),
            prize: None,
            category_id,
        }
    }

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let store = MemoryStore::new();
        let first = store.seed_categories(DEFAULT_CATEGORIES).await.unwrap();
        let second = store.seed_categories(&DEFAULT_CATEGORIES[..1]).await.unwrap();
        assert_eq!(first.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_category_inserts_nothing() {
        let store = MemoryStore::new();
        store.seed_categories(DEFAULT_CATEGORIES).await.unwrap();

        let result = store.create_event(Uuid::new_v4(), input(42)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(store
            .list_events(&EventQuery::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_mutations_require_ownership() {
        let store = MemoryStore::new();
        store.seed_categories(DEFAULT_CATEGORIES).await.unwrap();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let event = store.create_event(owner, input(1)).await.unwrap();

        let update = store.update_event(stranger, event.id, input(2)).await;
        assert!(matches!(update, Err(AppError::NotFound(_))));
        let delete = store.delete_event(stranger, event.id).await;
        assert!(matches!(delete, Err(AppError::NotFound(_))));

        let updated = store.update_event(owner, event.id, input(2)).await.unwrap();
        assert_eq!(updated.category_id, 2);
        assert_eq!(updated.created_at, event.created_at);

        store.delete_event(owner, event.id).await.unwrap();
        assert!(store.find_event(event.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let new_user = NewUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        store.create_user(new_user.clone()).await.unwrap();
        let result = store.create_user(new_user).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
