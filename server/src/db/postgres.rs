use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{category_not_found, email_taken, event_not_found, EventStore};
use crate::filter::EventQuery;
use crate::models::{Category, Event, EventInput, NewCategory, NewUser, User};
use crate::utils::error::{AppError, AppResult};

const EVENT_COLUMNS: &str = "id, name, description, start_date, end_date, location, prize, \
                             category_id, user_id, created_at, updated_at";

const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn ensure_category(conn: &mut PgConnection, id: i32) -> AppResult<()> {
    let found: Option<i32> = sqlx::query_scalar("SELECT id FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    found.map(|_| ()).ok_or_else(|| category_not_found(id))
}

#[async_trait]
impl EventStore for PgStore {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn find_category(&self, id: i32) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn seed_categories(&self, categories: &[NewCategory]) -> AppResult<Vec<Category>> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&mut *tx)
            .await?;

        if existing == 0 {
            for category in categories {
                sqlx::query("INSERT INTO categories (name, description) VALUES ($1, $2)")
                    .bind(category.name)
                    .bind(category.description)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        self.list_categories().await
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let user = user.into_user(Utc::now());

        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    email_taken(&user.email)
                }
                other => AppError::from(other),
            })
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list_events(&self, query: &EventQuery) -> AppResult<Vec<Event>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events WHERE TRUE"));

        if let Some(category_id) = query.category_id {
            builder.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(owner) = query.owner {
            builder.push(" AND user_id = ").push_bind(owner);
        }
        if let Some(window) = query.window {
            builder
                .push(" AND start_date >= ")
                .push_bind(window.start)
                .push(" AND start_date < ")
                .push_bind(window.end);
        }

        let events = builder
            .build_query_as::<Event>()
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn create_event(&self, owner: Uuid, input: EventInput) -> AppResult<Event> {
        let mut tx = self.pool.begin().await?;

        // An early return drops `tx`, which rolls it back.
        ensure_category(&mut *tx, input.category_id).await?;

        let event = input.into_event(owner, Utc::now());
        let sql = format!(
            "INSERT INTO events ({EVENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(event.id)
            .bind(&event.name)
            .bind(&event.description)
            .bind(event.start_date)
            .bind(event.end_date)
            .bind(&event.location)
            .bind(event.prize)
            .bind(event.category_id)
            .bind(event.user_id)
            .bind(event.created_at)
            .bind(event.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(event)
    }

    async fn update_event(&self, owner: Uuid, id: Uuid, input: EventInput) -> AppResult<Event> {
        let mut tx = self.pool.begin().await?;

        let sql =
            format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND user_id = $2 FOR UPDATE");
        let mut event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| event_not_found(id))?;

        ensure_category(&mut *tx, input.category_id).await?;

        event.apply(input, Utc::now());
        let sql = format!(
            "UPDATE events SET name = $1, description = $2, start_date = $3, end_date = $4, \
             location = $5, prize = $6, category_id = $7, updated_at = $8 \
             WHERE id = $9 RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(&event.name)
            .bind(&event.description)
            .bind(event.start_date)
            .bind(event.end_date)
            .bind(&event.location)
            .bind(event.prize)
            .bind(event.category_id)
            .bind(event.updated_at)
            .bind(event.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(event)
    }

    async fn delete_event(&self, owner: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(event_not_found(id));
        }
        Ok(())
    }
}
