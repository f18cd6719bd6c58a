use axum::{Json, extract::State};
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::extract::{JsonOrForm, require};
use crate::handlers::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// アカウント削除ハンドラー
///
/// DELETE /api/v1/user/delete
///
/// パスワードによる再認証が必要。削除は物理削除で取り消し不可。
pub async fn delete_account(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<DeleteAccountRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require("username", &request.username)?;
    if request.password.is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }

    state
        .account_service
        .delete_account(&request.username, &request.password)
        .await?;

    Ok(Json(ApiResponse::message("Account deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::http::StatusCode;

    fn request(username: &str, password: &str) -> DeleteAccountRequest {
        DeleteAccountRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_delete_account_statuses() {
        let state = test_state().await;
        state.account_service.register("alice", "pw1").await.unwrap();

        let err = delete_account(State(state.clone()), JsonOrForm(request("alice", "")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = delete_account(State(state.clone()), JsonOrForm(request("alice", "wrong")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let Json(body) = delete_account(State(state.clone()), JsonOrForm(request("alice", "pw1")))
            .await
            .unwrap();
        assert!(body.status);

        let err = delete_account(State(state), JsonOrForm(request("alice", "pw1")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
