use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::auth::extractors::OptionalAuthUser;
use crate::channel::dto::ChannelProfile;
use crate::channel::repo;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo_types::User;

pub fn channel_routes() -> Router<AppState> {
    Router::new().route("/channel/:username", get(channel_profile))
}

/// GET /channel/:username — public, viewer-aware when authenticated.
#[instrument(skip(state, viewer))]
pub async fn channel_profile(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(username): Path<String>,
) -> Result<Json<ChannelProfile>, ApiError> {
    let username = username.trim().to_lowercase();
    if username.is_empty() {
        return Err(ApiError::Validation("Username is missing".into()));
    }

    let user = User::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| ApiError::NotFound("Channel does not exist".into()))?;

    let subscribers_count = repo::subscriber_count(&state.db, user.id).await?;
    let channels_subscribed_to_count = repo::subscribed_to_count(&state.db, user.id).await?;
    let is_subscribed = match &viewer {
        Some(viewer) => repo::is_subscribed(&state.db, user.id, viewer.id).await?,
        None => false,
    };

    Ok(Json(ChannelProfile {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        email: user.email,
        avatar_url: user.avatar_url,
        cover_image_url: user.cover_image_url,
        subscribers_count,
        channels_subscribed_to_count,
        is_subscribed,
    }))
}
