use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::warn;

/// Uniqueness of `(user_id, lower(name))` is enforced case-insensitively,
/// both by the pre-write checks here and by the schema unique index that is
/// authoritative under concurrent writes.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: OffsetDateTime,
}

/// Store-layer name bounds; the HTTP boundary applies the stricter minimum
/// of two characters.
fn within_store_bounds(name: &str) -> bool {
    let len = name.chars().count();
    (1..=100).contains(&len)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|d| d.code())
        .as_deref()
        == Some("23505")
}

impl Category {
    /// Inserts a category for `owner_id`. Returns `None` (a failure
    /// indicator, not an error) when the name is out of store bounds or a
    /// duplicate exists at write time; the re-check here is authoritative.
    pub async fn add(db: &PgPool, owner_id: i64, name: &str) -> sqlx::Result<Option<Category>> {
        let name = name.trim();
        if !within_store_bounds(name) {
            return Ok(None);
        }
        if Self::name_exists(db, owner_id, name, None).await? {
            return Ok(None);
        }

        let inserted = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .fetch_one(db)
        .await;

        match inserted {
            Ok(row) => Ok(Some(row)),
            // Lost the race between the pre-check and the insert.
            Err(e) if is_unique_violation(&e) => {
                warn!(owner_id, name, "duplicate category insert blocked by index");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Newest-created first.
    pub async fn list_by_owner(db: &PgPool, owner_id: i64) -> sqlx::Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, created_at
            FROM categories
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(db)
        .await
    }

    /// When `owner_id` is given the lookup is ownership-scoped; this is the
    /// sole authorization mechanism for per-category operations.
    pub async fn get_by_id(
        db: &PgPool,
        category_id: i64,
        owner_id: Option<i64>,
    ) -> sqlx::Result<Option<Category>> {
        match owner_id {
            Some(owner) => {
                sqlx::query_as::<_, Category>(
                    r#"
                    SELECT id, user_id, name, created_at
                    FROM categories
                    WHERE id = $1 AND user_id = $2
                    "#,
                )
                .bind(category_id)
                .bind(owner)
                .fetch_optional(db)
                .await
            }
            None => {
                sqlx::query_as::<_, Category>(
                    r#"
                    SELECT id, user_id, name, created_at
                    FROM categories
                    WHERE id = $1
                    "#,
                )
                .bind(category_id)
                .fetch_optional(db)
                .await
            }
        }
    }

    /// Renames a category. False when the new name is out of bounds, a
    /// duplicate exists for the owner (excluding the row itself), or the
    /// update matched zero rows (id/owner mismatch).
    pub async fn update(
        db: &PgPool,
        category_id: i64,
        owner_id: i64,
        new_name: &str,
    ) -> sqlx::Result<bool> {
        let new_name = new_name.trim();
        if !within_store_bounds(new_name) {
            return Ok(false);
        }
        if Self::name_exists(db, owner_id, new_name, Some(category_id)).await? {
            return Ok(false);
        }

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = $1
            WHERE id = $2 AND user_id = $3
            "#,
        )
        .bind(new_name)
        .bind(category_id)
        .bind(owner_id)
        .execute(db)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(e) if is_unique_violation(&e) => {
                warn!(owner_id, category_id, "duplicate category rename blocked by index");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Physical delete. False when the row does not exist under that owner.
    pub async fn delete(db: &PgPool, category_id: i64, owner_id: i64) -> sqlx::Result<bool> {
        let done = sqlx::query(
            r#"
            DELETE FROM categories
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(category_id)
        .bind(owner_id)
        .execute(db)
        .await?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn count(db: &PgPool, owner_id: i64) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM categories WHERE user_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(db)
        .await
    }

    /// Case-insensitive substring match on the name, sorted by name.
    pub async fn search(db: &PgPool, owner_id: i64, term: &str) -> sqlx::Result<Vec<Category>> {
        let pattern = format!("%{}%", escape_like(term));
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, created_at
            FROM categories
            WHERE user_id = $1 AND name ILIKE $2 ESCAPE '\'
            ORDER BY name ASC
            "#,
        )
        .bind(owner_id)
        .bind(pattern)
        .fetch_all(db)
        .await
    }

    /// Case-insensitive per-owner duplicate probe; `exclude_id` skips the
    /// row being updated.
    pub async fn name_exists(
        db: &PgPool,
        owner_id: i64,
        name: &str,
        exclude_id: Option<i64>,
    ) -> sqlx::Result<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM categories
            WHERE user_id = $1
              AND lower(name) = lower($2)
              AND ($3::BIGINT IS NULL OR id <> $3)
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(db)
        .await?;
        Ok(found > 0)
    }
}

/// `_` and `%` are valid name characters, so a search term must not act as
/// LIKE metacharacters.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
