use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use validator::Validate;

use crate::{
    auth::{jwt, LoginRequest, SelectProfile, SessionContext, SessionResponse},
    error::AppError,
    remote::RemoteClient,
    response::ApiResponse,
};

/// POST /api/session/login
pub async fn login(
    State(remote): State<RemoteClient>,
    State(session): State<SessionContext>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    let token = remote.login(&payload.email, &payload.password).await?;
    session.sign_in(token);

    Ok(ApiResponse::success(describe(&session)))
}

/// Adopts a token obtained elsewhere
/// POST /api/session/token
pub async fn adopt_token(
    State(session): State<SessionContext>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<impl IntoResponse, AppError> {
    session.sign_in(bearer.token().to_string());
    Ok(ApiResponse::success(describe(&session)))
}

/// PUT /api/session/profile
pub async fn select_profile(
    State(session): State<SessionContext>,
    Json(payload): Json<SelectProfile>,
) -> Result<impl IntoResponse, AppError> {
    session
        .select_profile(payload.pet_id)
        .map_err(|_| AppError::Unauthorized)?;
    Ok(ApiResponse::success(describe(&session)))
}

/// GET /api/session
pub async fn get_session(State(session): State<SessionContext>) -> impl IntoResponse {
    ApiResponse::success(describe(&session))
}

/// The account behind the session token
/// GET /api/session/me
pub async fn get_me(State(remote): State<RemoteClient>) -> Result<impl IntoResponse, AppError> {
    let responsible = remote.current_responsible().await?;
    Ok(ApiResponse::success(responsible))
}

/// DELETE /api/session
pub async fn sign_out(State(session): State<SessionContext>) -> impl IntoResponse {
    session.sign_out();
    ApiResponse::ok("Signed out".to_string())
}

fn describe(session: &SessionContext) -> SessionResponse {
    let snapshot = session.snapshot();
    SessionResponse {
        signed_in: snapshot.token.is_some(),
        user_id: snapshot
            .token
            .as_deref()
            .and_then(jwt::decode_claims)
            .map(|claims| claims.user_id),
        active_profile_id: snapshot.active_profile,
    }
}
