use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("認証エラー: {0}")]
    Authentication(String),

    #[error("バリデーションエラー: {0}")]
    Validation(String),

    #[error("データベースエラー")]
    Database(#[from] sqlx::Error),

    #[error("内部エラー")]
    Internal(#[from] anyhow::Error),

    #[error("このユーザー名は既に使用されています")]
    UsernameTaken,

    #[error("アカウントが見つかりません")]
    AccountNotFound,

    #[error("リセット／確認コードが無効です")]
    InvalidCode,

    #[error("セッショントークンの形式が不正です")]
    MalformedToken,

    #[error("セッショントークンの期限切れ")]
    TokenExpired,

    #[error("Bearer トークンがありません")]
    MissingBearer,
}

/// エラーレスポンス（status は常に false）
#[derive(Serialize)]
struct ErrorResponse {
    status: bool,
    error: String,
}

impl AppError {
    /// HTTP ステータスコード
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Authentication(_) | Self::TokenExpired | Self::MissingBearer => {
                StatusCode::UNAUTHORIZED
            }
            Self::Validation(_) | Self::MalformedToken => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UsernameTaken => StatusCode::CONFLICT,
            Self::AccountNotFound => StatusCode::NOT_FOUND,
            Self::InvalidCode => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Authentication(reason) => {
                tracing::debug!(reason = %reason, "認証失敗レスポンス");
                "Invalid credentials".to_string()
            }
            Self::MissingBearer => "Unauthorized: Bearer token missing or malformed".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::Database(e) => {
                tracing::error!(error = ?e, "データベースエラー");
                "Internal server error".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = ?e, "内部エラー");
                "Internal server error".to_string()
            }
            Self::UsernameTaken => "User already exists!".to_string(),
            Self::AccountNotFound => "User not found!".to_string(),
            Self::InvalidCode => "Invalid or expired reset token".to_string(),
            Self::MalformedToken => "Bearer token malformed".to_string(),
            Self::TokenExpired => "Token expired, please log in again".to_string(),
        };

        (
            self.status_code(),
            Json(ErrorResponse {
                status: false,
                error: message,
            }),
        )
            .into_response()
    }
}
