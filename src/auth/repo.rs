use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::error;

use crate::auth::password::verify_password;
use crate::auth::roles::Role;
use crate::error::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub contact: String,
    pub country: Option<String>,
    pub city: Option<String>,
    role: i16,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Normalized role; the raw column value never leaves this module.
    pub fn role(&self) -> Role {
        Role::from_i16(self.role)
    }
}

pub struct NewUser<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub contact: &'a str,
    pub country: Option<&'a str>,
    pub city: Option<&'a str>,
    pub role: Role,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, contact, country, city, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn create(db: &PgPool, new: &NewUser<'_>) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, password_hash, contact, country, city, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, full_name, email, password_hash, contact, country, city, role, created_at
            "#,
        )
        .bind(new.full_name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.contact)
        .bind(new.country)
        .bind(new.city)
        .bind(new.role.as_i16())
        .fetch_one(db)
        .await
    }

    /// Looks up by email and verifies the password against the stored hash.
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn verify_credentials(
        db: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let Some(user) = Self::find_by_email(db, email).await? else {
            return Ok(None);
        };
        let ok = verify_password(password, &user.password_hash).map_err(|e| {
            error!(error = %e, "password verification failed");
            AppError::Internal
        })?;
        Ok(if ok { Some(user) } else { None })
    }
}
