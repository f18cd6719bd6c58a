use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use time::{Duration, OffsetDateTime};

use crate::error::AppError;
use crate::models::{Account, Profile};
use crate::repositories::{AccountRepository, is_duplicate_username};
use crate::services::email::{CodePurpose, EmailService};
use crate::services::password::PasswordService;
use crate::services::token::TokenService;

/// ログイン結果
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub expires_at: OffsetDateTime,
    pub profile: Profile,
}

/// アカウントサービス
///
/// 登録・ログイン・パスワードリセット／変更・削除・メール確認を扱う。
///
/// # Security
/// - パスワード・コード・トークンはログに出力しない
/// - コードは固定値ではなくアカウントごとの保留中コードと照合する
#[derive(Clone)]
pub struct AccountService {
    account_repo: AccountRepository,
    password_service: PasswordService,
    token_service: TokenService,
    email_service: EmailService,
    pending_token_ttl: Duration,
}

impl AccountService {
    /// 新しい AccountService を作成
    pub fn new(
        account_repo: AccountRepository,
        password_service: PasswordService,
        token_service: TokenService,
        email_service: EmailService,
        pending_token_ttl_secs: i64,
    ) -> Self {
        Self {
            account_repo,
            password_service,
            token_service,
            email_service,
            pending_token_ttl: Duration::seconds(pending_token_ttl_secs),
        }
    }

    /// アカウント登録
    ///
    /// 重複チェックは DB の UNIQUE 制約に任せる（同時登録でも成功は 1 件のみ）
    pub async fn register(&self, username: &str, password: &str) -> Result<Account, AppError> {
        let password_hash = self
            .password_service
            .hash_blocking(password.to_string())
            .await?;

        let account = self
            .account_repo
            .create(username, &password_hash)
            .await
            .map_err(|e| {
                if is_duplicate_username(&e) {
                    tracing::info!(username = %username, "登録失敗: ユーザー名重複");
                    return AppError::UsernameTaken;
                }
                AppError::Database(e)
            })?;

        tracing::info!(account_id = account.id, username = %username, "アカウント登録成功");

        Ok(account)
    }

    /// ログイン
    ///
    /// タイミング攻撃対策: アカウントが存在しない場合もダミーのパスワード検証を実行
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let account = self.authenticate(username, password).await?;

        let issued = self.token_service.issue(account.id, &account.username)?;

        tracing::info!(account_id = account.id, "ログイン成功");

        Ok(LoginOutcome {
            access_token: issued.token,
            expires_at: issued.expires_at,
            profile: account.profile(),
        })
    }

    /// パスワードリセットコードを発行
    ///
    /// 既存の保留中コードは上書きされる。
    pub async fn forgot_password(&self, username: &str) -> Result<(), AppError> {
        tracing::info!(username = %username, "パスワードリセットリクエスト");
        self.issue_code(username, CodePurpose::PasswordReset).await
    }

    /// メール確認コードを発行
    ///
    /// リセットコードと同じ保留中コード枠を使う。
    pub async fn request_email_verification(&self, username: &str) -> Result<(), AppError> {
        tracing::info!(username = %username, "メール確認リクエスト");
        self.issue_code(username, CodePurpose::EmailVerification).await
    }

    /// コードを使ってパスワードをリセット
    ///
    /// 成功時に保留中コードを削除する。
    pub async fn reset_password(
        &self,
        username: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let account = self.find_existing(username).await?;
        self.check_pending_code(&account, code, OffsetDateTime::now_utc())?;

        let password_hash = self
            .password_service
            .hash_blocking(new_password.to_string())
            .await?;

        if !self
            .account_repo
            .update_password_hash(username, &password_hash)
            .await?
        {
            return Err(AppError::AccountNotFound);
        }
        self.account_repo.clear_pending_token(username).await?;

        tracing::info!(account_id = account.id, "パスワードリセット完了");

        Ok(())
    }

    /// セッショントークンで本人確認したうえでパスワードを変更
    pub async fn change_password(
        &self,
        bearer_token: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let claims = self.token_service.verify(bearer_token).map_err(|e| {
            tracing::warn!(error = %e, "パスワード変更: セッション無効");
            AppError::Authentication("invalid_session".to_string())
        })?;

        // 同名で再作成されたアカウントには古いトークンを適用しない
        let account = match self.account_repo.find_by_username(&claims.username).await? {
            Some(account) if account.id == claims.sub => account,
            _ => {
                tracing::warn!(account_id = claims.sub, "パスワード変更: アカウント不在");
                return Err(AppError::Authentication("unknown_account".to_string()));
            }
        };

        if !self
            .password_service
            .verify_blocking(old_password.to_string(), account.password_hash.clone())
            .await?
        {
            tracing::warn!(account_id = account.id, "パスワード変更: 現在のパスワード不一致");
            return Err(AppError::Authentication("password_mismatch".to_string()));
        }

        let password_hash = self
            .password_service
            .hash_blocking(new_password.to_string())
            .await?;

        if !self
            .account_repo
            .update_password_hash(&account.username, &password_hash)
            .await?
        {
            return Err(AppError::Authentication("unknown_account".to_string()));
        }
        self.account_repo
            .clear_pending_token(&account.username)
            .await?;

        tracing::info!(account_id = account.id, "パスワード変更完了");

        Ok(())
    }

    /// パスワード再認証のうえアカウントを物理削除
    pub async fn delete_account(&self, username: &str, password: &str) -> Result<(), AppError> {
        let account = self.find_existing(username).await?;

        if !self
            .password_service
            .verify_blocking(password.to_string(), account.password_hash.clone())
            .await?
        {
            tracing::warn!(account_id = account.id, "アカウント削除: パスワード不一致");
            return Err(AppError::Authentication("password_mismatch".to_string()));
        }

        if !self.account_repo.delete(username).await? {
            return Err(AppError::AccountNotFound);
        }

        tracing::info!(account_id = account.id, "アカウント削除完了");

        Ok(())
    }

    /// 確認コードを照合（状態は変更しない）
    pub async fn verify_email(&self, username: &str, code: &str) -> Result<(), AppError> {
        let account = self.find_existing(username).await?;
        self.check_pending_code(&account, code, OffsetDateTime::now_utc())?;

        tracing::info!(account_id = account.id, "メール確認成功");

        Ok(())
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<Account, AppError> {
        match self.account_repo.find_by_username(username).await? {
            Some(account) => {
                if self
                    .password_service
                    .verify_blocking(password.to_string(), account.password_hash.clone())
                    .await?
                {
                    Ok(account)
                } else {
                    tracing::warn!(username = %username, "認証失敗: パスワード不一致");
                    Err(AppError::Authentication("password_mismatch".to_string()))
                }
            }
            None => {
                self.password_service
                    .verify_dummy_blocking(password.to_string())
                    .await?;
                tracing::warn!(username = %username, "認証失敗: アカウント不在");
                Err(AppError::Authentication("unknown_account".to_string()))
            }
        }
    }

    async fn find_existing(&self, username: &str) -> Result<Account, AppError> {
        self.account_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| {
                tracing::info!(username = %username, "アカウント不在");
                AppError::AccountNotFound
            })
    }

    async fn issue_code(&self, username: &str, purpose: CodePurpose) -> Result<(), AppError> {
        self.find_existing(username).await?;

        let code = generate_code();
        let stored = self
            .account_repo
            .set_pending_token(username, &hash_code(&code), OffsetDateTime::now_utc())
            .await?;
        if !stored {
            return Err(AppError::AccountNotFound);
        }

        self.email_service.send_code(username, &code, purpose).await
    }

    fn check_pending_code(
        &self,
        account: &Account,
        code: &str,
        now: OffsetDateTime,
    ) -> Result<(), AppError> {
        let (Some(stored), Some(issued_at)) =
            (&account.pending_token, account.pending_token_issued_at)
        else {
            tracing::warn!(account_id = account.id, "保留中コードなし");
            return Err(AppError::InvalidCode);
        };

        if now - issued_at > self.pending_token_ttl {
            tracing::warn!(account_id = account.id, "期限切れコード");
            return Err(AppError::InvalidCode);
        }

        let submitted = hash_code(code);
        if !bool::from(stored.as_bytes().ct_eq(submitted.as_bytes())) {
            tracing::warn!(account_id = account.id, "コード不一致");
            return Err(AppError::InvalidCode);
        }

        Ok(())
    }
}

/// 6桁の数字コードを生成
fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32))
}

/// コードをSHA256でハッシュ化
fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}
