use axum::{Json, extract::State, http::HeaderMap};
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::extract::{JsonOrForm, bearer_token, require};
use crate::handlers::response::ApiResponse;
use crate::state::AppState;

// === リセットコード発行 ===

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub username: String,
}

/// POST /api/v1/password/forgot
///
/// アカウントが存在すればコードを発行し、常に成功を返す（送信はシミュレーション）
pub async fn forgot_password(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require("username", &request.username)?;

    state
        .account_service
        .forgot_password(&request.username)
        .await?;

    Ok(Json(ApiResponse::message(
        "Password reset code has been sent (simulated)",
    )))
}

// === パスワードリセット実行 ===

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

/// POST /api/v1/password/reset
///
/// # Security
/// - token, new_password はログに出力しない
pub async fn reset_password(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    validate_reset_password_request(&request)?;

    state
        .account_service
        .reset_password(&request.username, &request.token, &request.new_password)
        .await?;

    Ok(Json(ApiResponse::message(
        "Password has been reset successfully",
    )))
}

// === パスワード変更 ===

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// POST /api/v1/password/change
///
/// Authorization: Bearer <access_token> が必須
pub async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonOrForm(request): JsonOrForm<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let token = bearer_token(&headers)?;
    validate_change_password_request(&request)?;

    state
        .account_service
        .change_password(token, &request.old_password, &request.new_password)
        .await?;

    Ok(Json(ApiResponse::message("Password has been changed")))
}

/// リセットリクエストのバリデーション
fn validate_reset_password_request(request: &ResetPasswordRequest) -> Result<(), AppError> {
    require("username", &request.username)?;
    require("token", &request.token)?;
    if request.new_password.is_empty() {
        return Err(AppError::Validation("new_password is required".to_string()));
    }
    Ok(())
}

/// 変更リクエストのバリデーション
fn validate_change_password_request(request: &ChangePasswordRequest) -> Result<(), AppError> {
    if request.old_password.is_empty() {
        return Err(AppError::Validation("old_password is required".to_string()));
    }
    if request.new_password.is_empty() {
        return Err(AppError::Validation("new_password is required".to_string()));
    }
    Ok(())
}
