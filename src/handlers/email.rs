use axum::{Json, extract::State};
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::extract::{JsonOrForm, require};
use crate::handlers::response::ApiResponse;
use crate::state::AppState;

// === 確認コード発行 ===

#[derive(Debug, Deserialize)]
pub struct EmailVerificationRequest {
    #[serde(default)]
    pub username: String,
}

/// POST /api/v1/email/verify/request
///
/// 確認コードを発行する（リセットコードと同じ枠を上書き）
pub async fn request_email_verification(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<EmailVerificationRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require("username", &request.username)?;

    state
        .account_service
        .request_email_verification(&request.username)
        .await?;

    Ok(Json(ApiResponse::message(
        "Verification code has been sent (simulated)",
    )))
}

// === 確認コード照合 ===

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub token: String,
}

/// POST /api/v1/email/verify
///
/// コードを照合するのみで、保留中コードは削除しない
pub async fn verify_email(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<VerifyEmailRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require("username", &request.username)?;
    require("token", &request.token)?;

    state
        .account_service
        .verify_email(&request.username, &request.token)
        .await?;

    Ok(Json(ApiResponse::message("Email verified")))
}
