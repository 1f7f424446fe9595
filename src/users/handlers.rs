use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::auth::extractors::AuthUser;
use crate::auth::password;
use crate::error::ApiError;
use crate::media::{store_image, UploadItem};
use crate::state::AppState;
use crate::users::dto::{PublicUser, UpdateAccountRequest};
use crate::users::repo_types::{NewUser, User};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/current-user", get(current_user))
        .route("/account", patch(update_account))
        .route("/avatar", patch(update_avatar))
        .route("/cover-image", patch(update_cover_image))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn any_blank(fields: &[&str]) -> bool {
    fields.iter().any(|f| f.trim().is_empty())
}

/// POST /register (multipart)
/// Text fields: fullName, email, username, password.
/// Files: avatar (required), coverImage (optional).
#[instrument(skip(state, mp))]
pub async fn register(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let mut full_name = String::new();
    let mut email = String::new();
    let mut username = String::new();
    let mut password_field = String::new();
    let mut avatar: Option<UploadItem> = None;
    let mut cover_image: Option<UploadItem> = None;

    while let Some(field) = mp.next_field().await.map_err(malformed_form)? {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("fullName") => full_name = field.text().await.map_err(malformed_form)?,
            Some("email") => email = field.text().await.map_err(malformed_form)?,
            Some("username") => username = field.text().await.map_err(malformed_form)?,
            Some("password") => password_field = field.text().await.map_err(malformed_form)?,
            Some("avatar") => avatar = Some(read_file(field).await?),
            Some("coverImage") => cover_image = Some(read_file(field).await?),
            _ => {}
        }
    }

    if any_blank(&[
        full_name.as_str(),
        email.as_str(),
        username.as_str(),
        password_field.as_str(),
    ]) {
        return Err(ApiError::Validation("All fields are required".into()));
    }

    let full_name = full_name.trim().to_string();
    let email = email.trim().to_lowercase();
    let username = username.trim().to_lowercase();

    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }

    if User::find_by_username_or_email(&state.db, Some(&username), Some(&email))
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "User with email or username already exists".into(),
        ));
    }

    let avatar = avatar.ok_or_else(|| ApiError::Validation("Avatar file is required".into()))?;

    let avatar_url = store_image(&state, "avatars", &username, avatar)
        .await
        .map_err(|e| {
            warn!(error = %e, "avatar upload failed");
            ApiError::Upload("Avatar upload failed".into())
        })?;

    // Cover image is optional end to end: a failed upload degrades to none.
    let cover_image_url = match cover_image {
        Some(item) => match store_image(&state, "covers", &username, item).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, "cover image upload failed");
                None
            }
        },
        None => None,
    };

    let password_hash = password::hash_password(&password_field)?;
    let created = User::create(
        &state.db,
        NewUser {
            username: &username,
            email: &email,
            full_name: &full_name,
            password_hash: &password_hash,
            avatar_url: &avatar_url,
            cover_image_url: cover_image_url.as_deref(),
        },
    )
    .await?;

    // Read the row back; a missing row here is a failed post-condition.
    let created = User::find_by_id(&state.db, created.id)
        .await?
        .ok_or_else(|| {
            ApiError::Internal("Something went wrong while registering the user".into())
        })?;

    info!(user_id = %created.id, username = %created.username, "user registered");
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[instrument(skip(user))]
pub async fn current_user(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(user.into())
}

#[instrument(skip(state, user, payload))]
pub async fn update_account(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let full_name = payload.full_name.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    if full_name.is_empty() || email.is_empty() {
        return Err(ApiError::Validation("All fields are required".into()));
    }

    let updated = User::update_profile(&state.db, user.id, &full_name, &email).await?;
    info!(user_id = %updated.id, "account details updated");
    Ok(Json(updated.into()))
}

#[instrument(skip(state, user, mp))]
pub async fn update_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut mp: Multipart,
) -> Result<Json<PublicUser>, ApiError> {
    let file = first_file(&mut mp, "avatar")
        .await?
        .ok_or_else(|| ApiError::Validation("Avatar file is missing".into()))?;

    // The previous avatar object stays on the media host.
    let url = store_image(&state, "avatars", &user.username, file)
        .await
        .map_err(|e| {
            warn!(error = %e, "avatar upload failed");
            ApiError::Upload("Error while uploading avatar".into())
        })?;

    let updated = User::set_avatar_url(&state.db, user.id, &url).await?;
    info!(user_id = %updated.id, "avatar updated");
    Ok(Json(updated.into()))
}

#[instrument(skip(state, user, mp))]
pub async fn update_cover_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut mp: Multipart,
) -> Result<Json<PublicUser>, ApiError> {
    let file = first_file(&mut mp, "coverImage")
        .await?
        .ok_or_else(|| ApiError::Validation("Cover image file is missing".into()))?;

    let url = store_image(&state, "covers", &user.username, file)
        .await
        .map_err(|e| {
            warn!(error = %e, "cover image upload failed");
            ApiError::Upload("Error while uploading cover image".into())
        })?;

    let updated = User::set_cover_image_url(&state.db, user.id, &url).await?;
    info!(user_id = %updated.id, "cover image updated");
    Ok(Json(updated.into()))
}

async fn first_file(mp: &mut Multipart, name: &str) -> Result<Option<UploadItem>, ApiError> {
    while let Some(field) = mp.next_field().await.map_err(malformed_form)? {
        if field.name() == Some(name) {
            return Ok(Some(read_file(field).await?));
        }
    }
    Ok(None)
}

async fn read_file(field: Field<'_>) -> Result<UploadItem, ApiError> {
    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "application/octet-stream".into());
    let body = field.bytes().await.map_err(malformed_form)?;
    Ok(UploadItem { body, content_type })
}

fn malformed_form(_: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::Validation("Malformed multipart form".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@example.com"));
    }

    #[test]
    fn any_blank_catches_whitespace_only_fields() {
        assert!(any_blank(&["Alice", "", "alice", "pw"]));
        assert!(any_blank(&["Alice", "a@b.c", "   ", "pw"]));
        assert!(!any_blank(&["Alice", "a@b.c", "alice", "pw"]));
    }
}
