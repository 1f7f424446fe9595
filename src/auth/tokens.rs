//! Token lifecycle: issue the access/refresh pair, verify a presented
//! refresh token against the stored copy, revoke on logout.
//!
//! Only one refresh token is live per user: issuing a pair overwrites the
//! stored value, which silently invalidates every earlier refresh token.

use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::auth::dto::TokenPair;
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::users::repo_types::User;

/// Sign both tokens and persist the refresh token on the user row.
///
/// Every failure inside collapses to one opaque `Internal` error; the
/// cause is logged, not surfaced.
pub async fn issue_pair(db: &PgPool, keys: &JwtKeys, user_id: Uuid) -> Result<TokenPair, ApiError> {
    match try_issue_pair(db, keys, user_id).await {
        Ok(pair) => Ok(pair),
        Err(e) => {
            error!(error = %e, user_id = %user_id, "token pair generation failed");
            Err(ApiError::Internal(
                "Something went wrong while generating tokens".into(),
            ))
        }
    }
}

async fn try_issue_pair(db: &PgPool, keys: &JwtKeys, user_id: Uuid) -> anyhow::Result<TokenPair> {
    let access_token = keys.sign_access(user_id)?;
    let refresh_token = keys.sign_refresh(user_id)?;
    User::set_refresh_token(db, user_id, Some(&refresh_token)).await?;
    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Full refresh-token check: signature and expiry, then the referenced user
/// must still exist and its stored token must equal the presented one.
pub async fn verify_refresh_token(
    db: &PgPool,
    keys: &JwtKeys,
    presented: &str,
) -> Result<User, ApiError> {
    let claims = keys
        .verify_refresh(presented)
        .map_err(|_| ApiError::Auth("Invalid refresh token".into()))?;

    let user = User::find_by_id(db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Auth("Invalid refresh token".into()))?;

    ensure_current(user.refresh_token.as_deref(), presented)?;
    Ok(user)
}

/// The single-active-refresh-token rule. A mismatch means the token was
/// rotated out or the user logged out.
fn ensure_current(stored: Option<&str>, presented: &str) -> Result<(), ApiError> {
    match stored {
        Some(stored) if stored == presented => Ok(()),
        _ => Err(ApiError::Auth("Refresh token is expired or used".into())),
    }
}

/// Clear the stored refresh token; every previously issued refresh token
/// fails `ensure_current` afterwards.
pub async fn revoke(db: &PgPool, user_id: Uuid) -> Result<(), ApiError> {
    User::set_refresh_token(db, user_id, None).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_token_passes() {
        assert!(ensure_current(Some("tok-1"), "tok-1").is_ok());
    }

    #[test]
    fn rotated_out_token_is_rejected() {
        // After a refresh the store holds tok-2; the superseded tok-1 fails.
        let err = ensure_current(Some("tok-2"), "tok-1").unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
        assert_eq!(err.to_string(), "Refresh token is expired or used");
    }

    #[test]
    fn logged_out_user_rejects_every_token() {
        let err = ensure_current(None, "tok-1").unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
    }
}
