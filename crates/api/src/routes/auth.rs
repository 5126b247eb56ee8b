//! Authentication and profile routes.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_token, hash_token, CurrentUser};
use crate::error::{ApiError, FieldErrors, Result};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginPayload {
    pub login: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/login — exchange credentials for a bearer token. The login
/// string is matched against email or username.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<serde_json::Value>> {
    let mut errors = FieldErrors::new();
    let login = required(&mut errors, "login", payload.login.as_deref());
    let password = required(&mut errors, "password", payload.password.as_deref());
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let user = database::user::find_by_login(state.db.pool(), &login).await?;
    let Some(user) = user else {
        return Err(ApiError::InvalidCredentials(
            "Email/Username atau password salah".to_string(),
        ));
    };

    let valid = bcrypt::verify(&password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        return Err(ApiError::InvalidCredentials(
            "Email/Username atau password salah".to_string(),
        ));
    }

    let token = generate_token();
    database::token::create_token(
        state.db.pool(),
        &Uuid::new_v4().to_string(),
        &user.id,
        "API Token",
        &hash_token(&token),
    )
    .await?;

    tracing::info!(user = %user.username, "login");

    Ok(Json(json!({
        "success": true,
        "message": "Login berhasil",
        "data": { "user": user, "token": token },
    })))
}

/// POST /auth/logout — revoke the presented token.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<serde_json::Value>> {
    database::token::revoke_token(state.db.pool(), &current.token_hash).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Logout berhasil",
    })))
}

/// GET /auth/profile — the authenticated user.
pub async fn profile(Extension(current): Extension<CurrentUser>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": current.user,
    }))
}

#[derive(Deserialize)]
pub struct UpdateProfilePayload {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

/// PUT /auth/profile — update name, username, and email.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<serde_json::Value>> {
    let mut errors = FieldErrors::new();
    let name = required(&mut errors, "name", payload.name.as_deref());
    let username = required(&mut errors, "username", payload.username.as_deref());
    let email = required(&mut errors, "email", payload.email.as_deref());
    if !email.is_empty() && !email.contains('@') {
        errors
            .entry("email".to_string())
            .or_default()
            .push("Format email tidak valid.".to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let user = database::user::update_profile(
        state.db.pool(),
        &current.user.id,
        &name,
        &username,
        &email,
    )
    .await
    .map_err(|e| match e {
        database::DatabaseError::AlreadyExists { .. } => {
            ApiError::validation("username", "Username atau email sudah digunakan.")
        }
        other => ApiError::Database(other),
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "Profil berhasil diperbarui",
        "data": user,
    })))
}

#[derive(Deserialize)]
pub struct ChangePasswordPayload {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// PUT /auth/change-password — verify the current password and replace it.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<Json<serde_json::Value>> {
    let mut errors = FieldErrors::new();
    let current_password =
        required(&mut errors, "current_password", payload.current_password.as_deref());
    let new_password = required(&mut errors, "new_password", payload.new_password.as_deref());
    if !new_password.is_empty() && new_password.len() < 8 {
        errors
            .entry("new_password".to_string())
            .or_default()
            .push("Password baru minimal 8 karakter.".to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let valid = bcrypt::verify(&current_password, &current.user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        return Err(ApiError::BadRequest("Password saat ini salah".to_string()));
    }

    let new_hash = bcrypt::hash(&new_password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    database::user::update_password(state.db.pool(), &current.user.id, &new_hash).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Password berhasil diubah",
    })))
}

/// Create the initial admin user when the users table is empty. Returns
/// the created username, if any.
pub async fn seed_initial_user(
    db: &database::Database,
    password: &str,
) -> Result<Option<String>> {
    if database::user::find_by_login(db.pool(), "admin").await?.is_some() {
        return Ok(None);
    }

    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let user = database::user::create_user(
        db.pool(),
        &Uuid::new_v4().to_string(),
        "Admin",
        "admin",
        "admin@example.com",
        &hash,
    )
    .await?;

    Ok(Some(user.username))
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => {
            errors
                .entry(field.to_string())
                .or_default()
                .push(format!("The {field} field is required."));
            String::new()
        }
    }
}
