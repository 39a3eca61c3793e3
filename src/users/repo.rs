use async_trait::async_trait;
use sqlx::PgPool;

use crate::users::repo_types::{NewUser, ProfileUpdate, User};

/// Raised by a store when a UNIQUE constraint (email/username) rejects a write.
#[derive(Debug, thiserror::Error)]
#[error("unique constraint violated")]
pub struct UniqueViolation;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn create(&self, user: NewUser) -> anyhow::Result<User>;
    async fn update_password(&self, id: i64, hashed_password: &str) -> anyhow::Result<()>;
    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> anyhow::Result<()>;
    async fn update_phone_number(&self, id: i64, phone_number: &str) -> anyhow::Result<()>;
}

const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, hashed_password, is_active, role, phone_number";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_unique(e: sqlx::Error) -> anyhow::Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => UniqueViolation.into(),
        _ => e.into(),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (email, username, first_name, last_name, hashed_password, is_active, role, phone_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.hashed_password)
        .bind(user.is_active)
        .bind(&user.role)
        .bind(&user.phone_number)
        .fetch_one(&self.db)
        .await
        .map_err(map_unique)?;
        Ok(created)
    }

    async fn update_password(&self, id: i64, hashed_password: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET hashed_password = $2 WHERE id = $1")
            .bind(id)
            .bind(hashed_password)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET email = $2, username = $3, first_name = $4, last_name = $5,
                is_active = $6, role = $7, phone_number = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.email)
        .bind(&update.username)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(update.is_active)
        .bind(&update.role)
        .bind(&update.phone_number)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn update_phone_number(&self, id: i64, phone_number: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET phone_number = $2 WHERE id = $1")
            .bind(id)
            .bind(phone_number)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
