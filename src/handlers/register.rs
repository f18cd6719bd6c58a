use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::extract::{JsonOrForm, require};
use crate::handlers::response::ApiResponse;
use crate::models::Profile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String, // SecretBox不要（Deserialize後すぐハッシュ化）
}

/// ユーザー登録ハンドラー
///
/// POST /api/v1/register
///
/// # Security
/// - パスワードはログに出力しない
/// - パスワードは即座にハッシュ化
pub async fn register(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Profile>>), AppError> {
    validate_register_request(&request)?;

    let account = state
        .account_service
        .register(&request.username, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            status: true,
            data: Some(account.profile()),
            message: Some("User registered successfully.".to_string()),
        }),
    ))
}

/// 登録リクエストのバリデーション
fn validate_register_request(request: &RegisterRequest) -> Result<(), AppError> {
    require("username", &request.username)?;
    if request.password.is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }
    Ok(())
}
