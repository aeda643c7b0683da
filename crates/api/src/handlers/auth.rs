//! Handlers for the `/auth` resource (register, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;
use warden_core::types::UserId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register` and `POST /auth/login`.
#[derive(Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(
        length(min = 1, message = "email is required"),
        email(message = "invalid email format")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account. Returns 201 with the new user id, 409 if the email is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<RegisterResponse>>)> {
    input.validate()?;

    let user_id = state.auth.register(&input.email, &input.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RegisterResponse { user_id },
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Exchange email + password for a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    input.validate()?;

    let token = state.auth.login(&input.email, &input.password).await?;

    Ok(Json(DataResponse {
        data: LoginResponse { token },
    }))
}
