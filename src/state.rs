use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::AppError;
use crate::repositories::AccountRepository;
use crate::services::{
    AccountService, EmailService, PasswordService, RefreshService, TokenService,
};

/// アプリケーション共有状態
///
/// axum の State として全ハンドラーで共有される。
/// Clone は必須（axum が内部で clone するため）。
#[derive(Clone)]
pub struct AppState {
    /// SQLite コネクションプール
    pub db_pool: SqlitePool,
    /// アプリケーション設定（Arc で共有）
    pub config: Arc<Config>,
    /// アカウントサービス
    pub account_service: AccountService,
    /// リフレッシュサービス
    pub refresh_service: RefreshService,
}

impl AppState {
    /// 新しい AppState を作成
    pub fn new(db_pool: SqlitePool, config: Config) -> Result<Self, AppError> {
        let config = Arc::new(config);

        let account_repo = AccountRepository::new(db_pool.clone());
        let password_service = PasswordService::new(
            config.password_hash_memory_kib,
            config.password_hash_iterations,
            config.password_hash_parallelism,
        )?;
        let token_service = TokenService::new(
            config.jwt_secret.expose_secret(),
            config.access_token_ttl_secs,
        )?;
        let email_service = EmailService::new(config.dev_log_codes);

        if config.dev_log_codes {
            tracing::warn!("DEV_LOG_CODES 有効: 発行コードがログに出力されます");
        }

        let account_service = AccountService::new(
            account_repo,
            password_service,
            token_service.clone(),
            email_service,
            config.pending_token_ttl_secs,
        );
        let refresh_service = RefreshService::new(token_service, config.refresh_grace_secs);

        Ok(Self {
            db_pool,
            config,
            account_service,
            refresh_service,
        })
    }
}

#[cfg(test)]
pub(crate) async fn test_state() -> AppState {
    let config: Config = envy::from_iter([
        ("JWT_SECRET".to_string(), "test-secret-key-for-testing-only".to_string()),
        ("PASSWORD_HASH_MEMORY_KIB".to_string(), "1024".to_string()),
        ("PASSWORD_HASH_ITERATIONS".to_string(), "1".to_string()),
    ])
    .unwrap();

    let pool = crate::db::connect("sqlite::memory:", 1).await.unwrap();
    crate::db::init_schema(&pool).await.unwrap();

    AppState::new(pool, config).unwrap()
}
