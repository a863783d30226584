use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MeResponse, MessageResponse, RegisterRequest},
        extractors::AuthContext,
        password::{hash_password, verify_password, verify_unknown_account},
        session::{removal_cookie, session_cookie},
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

/// Same answer for an unknown email and a wrong password.
fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".into())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let input = payload.validate().map_err(|e| {
        warn!(error = %e, "registration rejected");
        e
    })?;

    // Rechecked under the write lock by `UserRepository::create`.
    if state.users.find_by_email(&input.email).await?.is_some() {
        warn!(email = %input.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&input.password)?;
    let user = state.users.create(&input.name, &input.email, hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Registration successful")),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".into()));
    }

    let Some(user) = state.users.find_by_email(&email).await? else {
        verify_unknown_account(&payload.password);
        warn!(%email, "login unknown email");
        return Err(invalid_credentials());
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(invalid_credentials());
    }

    // Logging in again from the same client replaces its previous session.
    if let Some(previous) = jar.get(&state.config.session.cookie_name) {
        state.sessions.destroy(previous.value()).await;
    }

    let session = state.sessions.create(user.id, user.name.clone()).await;
    let jar = jar.add(session_cookie(&state.config.session, session.token));

    info!(user_id = %user.id, "user logged in");
    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".into(),
            name: user.name,
        }),
    ))
}

#[instrument(skip(state, auth, jar))]
pub async fn logout(
    State(state): State<AppState>,
    auth: Option<AuthContext>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    if let Some(ctx) = auth {
        state.sessions.destroy(&ctx.token).await;
        info!(user_id = %ctx.user_id, "user logged out");
    }
    let jar = jar.remove(removal_cookie(&state.config.session));
    (jar, Json(MessageResponse::new("Logged out")))
}

#[instrument(skip(auth))]
pub async fn get_me(auth: Option<AuthContext>) -> Json<MeResponse> {
    Json(match auth {
        Some(ctx) => MeResponse {
            logged_in: true,
            user_id: Some(ctx.user_id),
            user_name: Some(ctx.user_name),
        },
        None => MeResponse {
            logged_in: false,
            user_id: None,
            user_name: None,
        },
    })
}
