//! User repository implementation

use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{NewUser, User};
use crate::utils::errors::{ChekwasError, Result};

#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with an already hashed password
    pub async fn create(&self, new_user: &NewUser, password_hash: &str) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, date_of_birth, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(password_hash)
        .bind(new_user.date_of_birth)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ChekwasError::from_unique_violation(e, "User already exists with this email"))
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find user by normalized email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Persist the profile fields of `user`
    pub async fn update_profile(&self, user: &User) -> Result<User> {
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2,
                date_of_birth = $3,
                allergies = $4,
                medical_conditions = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(user.date_of_birth)
        .bind(&user.allergies)
        .bind(Json(&user.medical_conditions))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or(ChekwasError::UserNotFound { user_id: user.id })
    }

    /// Mark the account inactive. Returns false when nothing changed.
    pub async fn deactivate(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET is_active = FALSE, updated_at = $2 WHERE id = $1 AND is_active",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
