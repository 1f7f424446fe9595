use axum::{
    extract::{FromRef, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::cookies::{self, REFRESH_COOKIE};
use crate::auth::dto::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, RefreshRequest, TokenPair,
};
use crate::auth::extractors::AuthUser;
use crate::auth::jwt::JwtKeys;
use crate::auth::{password, tokens};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo_types::User;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh-token", post(refresh_token))
        .route("/change-password", post(change_password))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let username = normalize_identifier(payload.username.as_deref());
    let email = normalize_identifier(payload.email.as_deref());

    if username.is_none() && email.is_none() {
        return Err(ApiError::Validation("Username or email is required".into()));
    }

    let user =
        User::find_by_username_or_email(&state.db, username.as_deref(), email.as_deref())
            .await?
            .ok_or_else(|| ApiError::NotFound("User does not exist".into()))?;

    let ok = password::verify_password(&payload.password, &user.password_hash)?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Auth("Invalid user credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let pair = tokens::issue_pair(&state.db, &keys, user.id).await?;
    info!(user_id = %user.id, username = %user.username, "user logged in");

    let headers = cookies::token_headers(&keys, &pair);
    let TokenPair {
        access_token,
        refresh_token,
    } = pair;
    Ok((
        headers,
        Json(LoginResponse {
            user: user.into(),
            access_token,
            refresh_token,
        }),
    ))
}

#[instrument(skip(state, user))]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<(HeaderMap, Json<MessageResponse>), ApiError> {
    tokens::revoke(&state.db, user.id).await?;
    info!(user_id = %user.id, "user logged out");
    Ok((
        cookies::clear_headers(),
        Json(MessageResponse {
            message: "User logged out".into(),
        }),
    ))
}

#[instrument(skip(state, headers, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Option<Json<RefreshRequest>>,
) -> Result<(HeaderMap, Json<TokenPair>), ApiError> {
    let presented = cookies::get_cookie(&headers, REFRESH_COOKIE)
        .or_else(|| payload.and_then(|Json(body)| body.refresh_token))
        .ok_or_else(|| ApiError::Auth("Unauthorized request".into()))?;

    let keys = JwtKeys::from_ref(&state);
    let user = tokens::verify_refresh_token(&state.db, &keys, &presented).await?;

    // Rotation: the pair just issued supersedes the presented token.
    let pair = tokens::issue_pair(&state.db, &keys, user.id).await?;
    info!(user_id = %user.id, "refresh token rotated");

    let set_cookies = cookies::token_headers(&keys, &pair);
    Ok((set_cookies, Json(pair)))
}

#[instrument(skip(state, user, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let ok = password::verify_password(&payload.old_password, &user.password_hash)?;
    if !ok {
        warn!(user_id = %user.id, "change password with invalid old password");
        return Err(ApiError::Auth("Invalid old password".into()));
    }

    User::set_password(&state.db, user.id, &payload.new_password).await?;
    info!(user_id = %user.id, "password changed");
    Ok(Json(MessageResponse {
        message: "Password changed successfully".into(),
    }))
}

fn normalize_identifier(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim().to_lowercase();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
