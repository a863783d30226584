use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Identity resolved from a live session cookie; rejects with 401 otherwise.
///
/// Take `Option<AuthContext>` on routes that also serve anonymous clients.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub user_name: String,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(&state.config.session.cookie_name)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                debug!("no session cookie");
                AppError::Unauthorized("Not logged in".into())
            })?;

        let session = state.sessions.resolve(&token).await.ok_or_else(|| {
            debug!("unknown or expired session");
            AppError::Unauthorized("Session is invalid or expired, please log in again".into())
        })?;

        Ok(AuthContext {
            user_id: session.user_id,
            user_name: session.user_name,
            token,
        })
    }
}
