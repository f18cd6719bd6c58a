use axum::{Json, extract::State, http::HeaderMap};
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::handlers::extract::bearer_token;
use crate::handlers::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// トークンリフレッシュハンドラー
///
/// POST /api/v1/refresh
///
/// - 期限内: 同じトークンを返す
/// - 期限切れ（猶予内）: 新しいトークンを返す
/// - 猶予超過: 401、トークン不正: 400
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<RefreshResponse>>, AppError> {
    let token = bearer_token(&headers)?;

    let outcome = state.refresh_service.refresh(token)?;

    Ok(Json(ApiResponse::data(RefreshResponse {
        access_token: outcome.access_token,
        expires_at: outcome.expires_at,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::http::{HeaderValue, StatusCode, header};

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_refresh_after_login() {
        let state = test_state().await;
        state.account_service.register("alice", "pw1").await.unwrap();
        let token = state
            .account_service
            .login("alice", "pw1")
            .await
            .unwrap()
            .access_token;

        let Json(body) = refresh(State(state), bearer(&token)).await.unwrap();
        assert_eq!(body.data.unwrap().access_token, token);
    }

    #[tokio::test]
    async fn test_refresh_missing_and_malformed() {
        let state = test_state().await;

        let err = refresh(State(state.clone()), HeaderMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err = refresh(State(state), bearer("abc.def.ghi"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
