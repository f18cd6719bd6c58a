use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::AppError;

/// セッショントークンのクレーム
///
/// iat / exp は絶対時刻（UNIX 秒）。検証はトークンと現在時刻だけで完結する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// アカウントID
    pub sub: i64,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now.unix_timestamp() >= self.exp
    }

    /// 期限切れからの経過秒数（期限内なら 0 以下）
    pub fn seconds_since_expiry(&self, now: OffsetDateTime) -> i64 {
        now.unix_timestamp() - self.exp
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// 署名不正・構造不正
    #[error("invalid session token")]
    Invalid,

    /// 署名は正しいが期限切れ
    #[error("session token expired")]
    Expired,
}

/// 発行済みトークン
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

/// セッショントークン発行・検証サービス（HS256）
///
/// # Security
/// - 署名キーは設定から注入する（ハードコード禁止）
/// - トークン全文はログに出力しない
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// 新しい TokenService を作成
    ///
    /// # Arguments
    /// * `secret` - HS256 署名キー
    /// * `ttl_secs` - 発行するトークンの有効期間（秒）
    pub fn new(secret: &str, ttl_secs: i64) -> Result<Self, AppError> {
        if secret.is_empty() {
            tracing::error!("JWT署名キーが空");
            return Err(AppError::Internal(anyhow::anyhow!("jwt secret must not be empty")));
        }
        if ttl_secs <= 0 {
            tracing::error!(ttl_secs, "トークン有効期間が不正");
            return Err(AppError::Internal(anyhow::anyhow!("token ttl must be positive")));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 現在時刻でトークンを発行
    pub fn issue(&self, account_id: i64, username: &str) -> Result<IssuedToken, AppError> {
        self.issue_at(account_id, username, OffsetDateTime::now_utc())
    }

    /// 指定時刻を発行時刻としてトークンを発行
    pub fn issue_at(
        &self,
        account_id: i64,
        username: &str,
        issued_at: OffsetDateTime,
    ) -> Result<IssuedToken, AppError> {
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: account_id,
            username: username.to_string(),
            iat: issued_at.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!(error = ?e, "トークン署名エラー");
                AppError::Internal(anyhow::anyhow!("token encoding error"))
            })?;

        Ok(IssuedToken {
            token,
            // UNIX 秒に丸めた値をクライアントへ返す
            expires_at: OffsetDateTime::from_unix_timestamp(claims.exp).unwrap_or(expires_at),
        })
    }

    /// 署名と構造のみを検証（有効期限は見ない）
    pub fn decode_unchecked_expiry(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = ?e, "トークンのデコード失敗");
                TokenError::Invalid
            })
    }

    /// 現在時刻でトークンを検証
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// 指定時刻でトークンを検証
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, TokenError> {
        let claims = self.decode_unchecked_expiry(token)?;
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
pub(crate) fn test_token_service() -> TokenService {
    TokenService::new("test-secret-key-for-testing-only", 3600).unwrap()
}
