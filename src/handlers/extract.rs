use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request},
    http::{HeaderMap, header},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON / application/x-www-form-urlencoded / multipart/form-data のボディを受け付けるエクストラクター
///
/// Content-Type が form または multipart の場合はそれぞれとして解釈し、それ以外は JSON として扱う。
/// multipart はテキストフィールドのみを対象とし、ファイルパートは無視する。
#[derive(Debug)]
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state).await.map_err(|e| {
                tracing::debug!(error = %e, "フォームボディのパース失敗");
                AppError::Validation(e.body_text())
            })?;
            return Ok(Self(value));
        }

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await.map_err(|e| {
                tracing::debug!(error = %e, "multipart ボディのパース失敗");
                AppError::Validation(e.body_text())
            })?;
            return multipart_fields(multipart).await.map(Self);
        }

        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "JSONボディのパース失敗");
            AppError::Validation(e.body_text())
        })?;
        Ok(Self(value))
    }
}

/// multipart のテキストフィールドを集めて `T` にデシリアライズ
async fn multipart_fields<T: DeserializeOwned>(mut multipart: Multipart) -> Result<T, AppError> {
    let mut fields = serde_json::Map::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!(error = %e, "multipart フィールドの読み込み失敗");
        AppError::Validation(e.body_text())
    })? {
        let name = field
            .name()
            .filter(|_| field.file_name().is_none())
            .map(str::to_string);
        let text = field.text().await.map_err(|e| {
            tracing::debug!(error = %e, "multipart フィールドの読み込み失敗");
            AppError::Validation(e.body_text())
        })?;
        // ファイルパートは読み捨てる
        if let Some(name) = name {
            fields.insert(name, serde_json::Value::String(text));
        }
    }

    serde_json::from_value(serde_json::Value::Object(fields)).map_err(|e| {
        tracing::debug!(error = %e, "multipart フィールドの変換失敗");
        AppError::Validation(format!("Failed to deserialize form body: {e}"))
    })
}

/// Authorization ヘッダーから Bearer トークンを取り出す
///
/// スキーム名は大文字小文字を区別しない。
/// ヘッダーがない、または Bearer 形式でない場合は認証エラー
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim_start().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            tracing::debug!("Bearer トークンなし");
            AppError::MissingBearer
        })
}

/// 必須フィールドのバリデーション（空文字・空白のみは不可）
pub fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}
