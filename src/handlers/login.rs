use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppError;
use crate::handlers::extract::{JsonOrForm, require};
use crate::handlers::response::ApiResponse;
use crate::models::Profile;
use crate::state::AppState;

/// ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// ログインレスポンス
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub profile: Profile,
}

/// ログインハンドラー
///
/// POST /api/v1/login
///
/// 処理フロー:
/// 1. リクエストバリデーション
/// 2. ユーザー認証（DB照合）
/// 3. セッショントークン発行
pub async fn login(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    validate_login_request(&request)?;

    let outcome = state
        .account_service
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(ApiResponse::data(LoginResponse {
        access_token: outcome.access_token,
        expires_at: outcome.expires_at,
        profile: outcome.profile,
    })))
}

/// ログインリクエストのバリデーション
fn validate_login_request(request: &LoginRequest) -> Result<(), AppError> {
    require("username", &request.username)?;
    if request.password.is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::http::StatusCode;

    fn request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_validate_empty_username() {
        assert!(validate_login_request(&request("", "pw1")).is_err());
    }

    #[test]
    fn test_validate_empty_password() {
        assert!(validate_login_request(&request("alice", "")).is_err());
    }

    #[tokio::test]
    async fn test_login_returns_token_and_profile() {
        let state = test_state().await;
        state.account_service.register("alice", "pw1").await.unwrap();

        let Json(body) = login(State(state), JsonOrForm(request("alice", "pw1")))
            .await
            .unwrap();
        let data = body.data.unwrap();
        assert!(!data.access_token.is_empty());
        assert_eq!(data.profile.username, "alice");
        assert!(data.expires_at > OffsetDateTime::now_utc());
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let state = test_state().await;
        state.account_service.register("alice", "pw1").await.unwrap();

        let err = login(State(state.clone()), JsonOrForm(request("alice", "wrong")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err = login(State(state), JsonOrForm(request("bob", "pw1")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
