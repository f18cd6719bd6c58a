use time::OffsetDateTime;

use crate::error::AppError;
use crate::services::token::TokenService;

/// リフレッシュ結果
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub access_token: String,
    pub expires_at: OffsetDateTime,
    /// 新規発行した場合 true（期限内トークンはそのまま返す）
    pub reissued: bool,
}

/// セッショントークンのリフレッシュ（ステートレスなスライディング有効期限）
///
/// 署名のみを信頼し、失効リストは持たない。
#[derive(Clone)]
pub struct RefreshService {
    token_service: TokenService,
    grace_secs: i64,
}

impl RefreshService {
    /// 新しい RefreshService を作成
    ///
    /// # Arguments
    /// * `grace_secs` - 期限切れ後にリフレッシュを許可する猶予（秒）
    pub fn new(token_service: TokenService, grace_secs: i64) -> Self {
        Self {
            token_service,
            grace_secs,
        }
    }

    pub fn refresh(&self, bearer_token: &str) -> Result<RefreshOutcome, AppError> {
        self.refresh_at(bearer_token, OffsetDateTime::now_utc())
    }

    /// 指定時刻を現在時刻としてリフレッシュ
    ///
    /// 1. 署名・構造を検証（期限は無視）。不正なら MalformedToken
    /// 2. 期限内ならトークンをそのまま返す
    /// 3. 期限切れが猶予内なら同じ subject で再発行、猶予超過なら TokenExpired
    pub fn refresh_at(
        &self,
        bearer_token: &str,
        now: OffsetDateTime,
    ) -> Result<RefreshOutcome, AppError> {
        let claims = self
            .token_service
            .decode_unchecked_expiry(bearer_token)
            .map_err(|_| {
                tracing::warn!("リフレッシュ失敗: トークン不正");
                AppError::MalformedToken
            })?;

        if !claims.is_expired_at(now) {
            tracing::debug!(account_id = claims.sub, "リフレッシュ: 期限内のため再発行なし");
            return Ok(RefreshOutcome {
                access_token: bearer_token.to_string(),
                expires_at: OffsetDateTime::from_unix_timestamp(claims.exp).map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("invalid exp claim: {e}"))
                })?,
                reissued: false,
            });
        }

        let since_expiry = claims.seconds_since_expiry(now);
        if since_expiry > self.grace_secs {
            tracing::warn!(
                account_id = claims.sub,
                since_expiry,
                "リフレッシュ失敗: 猶予期間超過"
            );
            return Err(AppError::TokenExpired);
        }

        let issued = self
            .token_service
            .issue_at(claims.sub, &claims.username, now)?;

        tracing::info!(account_id = claims.sub, "セッショントークン再発行");

        Ok(RefreshOutcome {
            access_token: issued.token,
            expires_at: issued.expires_at,
            reissued: true,
        })
    }
}
