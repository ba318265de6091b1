use super::{RepoResult, UserRepositoryTrait};
use crate::models::User;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = r#"
    user_id, username, pin_hash, first_name, last_name, email, phone,
    street_address, city, state, zip_code, country, biometric_enabled, created_at
"#;

/// PostgreSQL repository for user data access
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for PgUserRepository {
    /// Insert a new user
    async fn create(&self, user: &User) -> RepoResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (
                user_id, username, pin_hash, first_name, last_name, email, phone,
                street_address, city, state, zip_code, country, biometric_enabled, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let created = sqlx::query_as::<_, User>(&sql)
            .bind(user.user_id)
            .bind(&user.username)
            .bind(&user.pin_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.street_address)
            .bind(&user.city)
            .bind(&user.state)
            .bind(&user.zip_code)
            .bind(&user.country)
            .bind(user.biometric_enabled)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// Find a user by id
    async fn find_by_id(&self, user_id: Uuid) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE user_id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Find a user by username (exact match)
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Overwrite personal info and flags
    async fn update(&self, user: &User) -> RepoResult<User> {
        let sql = format!(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, phone = $5,
                street_address = $6, city = $7, state = $8, zip_code = $9,
                country = $10, biometric_enabled = $11
            WHERE user_id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let updated = sqlx::query_as::<_, User>(&sql)
            .bind(user.user_id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.street_address)
            .bind(&user.city)
            .bind(&user.state)
            .bind(&user.zip_code)
            .bind(&user.country)
            .bind(user.biometric_enabled)
            .fetch_one(&self.pool)
            .await?;

        Ok(updated)
    }
}
