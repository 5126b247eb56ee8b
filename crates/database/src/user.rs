//! User CRUD operations.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::User;

const USER_COLUMNS: &str =
    "id, name, username, email, password_hash, created_at, updated_at";

/// Create a user with an already-hashed password.
pub async fn create_user(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User> {
    let now = Utc::now().naive_utc();

    sqlx::query(
        r#"
        INSERT INTO users (id, name, username, email, password_hash, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "User",
                    id: username.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    get_user(pool, id).await
}

/// Fetch a user by id.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    user.ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Find a user by login string: matched against email when the string
/// contains '@', against username otherwise.
pub async fn find_by_login(pool: &SqlitePool, login: &str) -> Result<Option<User>> {
    let field = if login.contains('@') { "email" } else { "username" };

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE {field} = ?"
    ))
    .bind(login)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Update the profile fields of a user.
pub async fn update_profile(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    username: &str,
    email: &str,
) -> Result<User> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = ?, username = ?, email = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(username)
    .bind(email)
    .bind(Utc::now().naive_utc())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "User",
                    id: username.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    get_user(pool, id).await
}

/// Replace a user's password hash.
pub async fn update_password(pool: &SqlitePool, id: &str, password_hash: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET password_hash = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(password_hash)
    .bind(Utc::now().naive_utc())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn create_and_find_by_login() {
        let db = test_db().await;

        create_user(db.pool(), "u1", "Admin", "admin", "admin@example.com", "hash")
            .await
            .unwrap();

        let by_username = find_by_login(db.pool(), "admin").await.unwrap();
        assert!(by_username.is_some());

        let by_email = find_by_login(db.pool(), "admin@example.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, "u1");

        let missing = find_by_login(db.pool(), "nobody").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let db = test_db().await;

        create_user(db.pool(), "u1", "A", "admin", "a@example.com", "h").await.unwrap();
        let result = create_user(db.pool(), "u2", "B", "admin", "b@example.com", "h").await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn update_profile_and_password() {
        let db = test_db().await;

        create_user(db.pool(), "u1", "A", "admin", "a@example.com", "h").await.unwrap();

        let updated = update_profile(db.pool(), "u1", "Alice", "alice", "alice@example.com")
            .await
            .unwrap();
        assert_eq!(updated.username, "alice");

        update_password(db.pool(), "u1", "new-hash").await.unwrap();
        let user = get_user(db.pool(), "u1").await.unwrap();
        assert_eq!(user.password_hash, "new-hash");
    }
}
