use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::models::Account;

/// アカウントストア
///
/// 全操作は一意な username をキーとする。
/// 更新系は対象行が存在したかどうかを bool で返す（false = アカウント不在）。
#[derive(Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 新しいアカウントを作成
    ///
    /// # Errors
    /// - UNIQUE制約違反時: `sqlx::Error::Database`
    ///   呼び出し側で `is_duplicate_username` により `AppError::UsernameTaken` に変換すること
    pub async fn create(&self, username: &str, password_hash: &str) -> Result<Account, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (username, password_hash, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, pending_token, pending_token_issued_at, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.pool)
        .await
    }

    /// ユーザー名でアカウントを検索
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password_hash, pending_token, pending_token_issued_at, created_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    /// パスワードハッシュを更新
    ///
    /// # Note
    /// password_hash はログに出力しないこと
    pub async fn update_password_hash(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $2
            WHERE username = $1
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 保留中コードを設定（既存のコードは上書き）
    ///
    /// # Arguments
    /// * `token_digest` - コードの SHA256 ダイジェスト
    /// * `issued_at` - 発行時刻（有効期限判定に使用）
    pub async fn set_pending_token(
        &self,
        username: &str,
        token_digest: &str,
        issued_at: OffsetDateTime,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET pending_token = $2, pending_token_issued_at = $3
            WHERE username = $1
            "#,
        )
        .bind(username)
        .bind(token_digest)
        .bind(issued_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 保留中コードを削除
    pub async fn clear_pending_token(&self, username: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET pending_token = NULL, pending_token_issued_at = NULL
            WHERE username = $1
            "#,
        )
        .bind(username)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// アカウントを物理削除
    pub async fn delete(&self, username: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// username の UNIQUE 制約違反かどうか
pub fn is_duplicate_username(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
