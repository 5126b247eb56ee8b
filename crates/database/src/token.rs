//! API access token storage.
//!
//! Tokens are stored as sha256 hex digests; the caller hashes the plaintext
//! and only ever hands the digest to this module.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::User;

/// Store a token digest for a user.
pub async fn create_token(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    name: &str,
    token_hash: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO access_tokens (id, user_id, name, token_hash, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(name)
    .bind(token_hash)
    .bind(Utc::now().naive_utc())
    .execute(pool)
    .await?;

    Ok(())
}

/// Resolve a token digest to its owning user, if the token exists.
pub async fn find_user_by_token(pool: &SqlitePool, token_hash: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.name, u.username, u.email, u.password_hash,
               u.created_at, u.updated_at
        FROM users u
        INNER JOIN access_tokens t ON t.user_id = u.id
        WHERE t.token_hash = ?
        "#,
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Delete the token with the given digest (logout).
pub async fn revoke_token(pool: &SqlitePool, token_hash: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM access_tokens WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "AccessToken",
            id: token_hash.to_string(),
        });
    }

    Ok(())
}
