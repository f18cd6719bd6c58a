use crate::error::AppError;

/// コードの用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePurpose {
    PasswordReset,
    EmailVerification,
}

impl CodePurpose {
    fn as_str(self) -> &'static str {
        match self {
            Self::PasswordReset => "password_reset",
            Self::EmailVerification => "email_verification",
        }
    }
}

/// コード送信サービス（開発環境: スタブ実装）
///
/// このシステムでは username をメールアドレスの代替として扱う。
#[derive(Clone)]
pub struct EmailService {
    log_codes: bool,
}

impl EmailService {
    /// 新しい EmailService を作成
    ///
    /// # Arguments
    /// * `log_codes` - true の場合、送信したコードをログに出力する（開発用）
    pub fn new(log_codes: bool) -> Self {
        Self { log_codes }
    }

    /// リセット／確認コードを送信（開発環境: ログ出力のみ）
    pub async fn send_code(
        &self,
        to: &str,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<(), AppError> {
        tracing::info!(
            to = %to,
            purpose = purpose.as_str(),
            "コード送信（開発モード）"
        );

        if self.log_codes {
            tracing::warn!(to = %to, code = %code, "DEV_LOG_CODES 有効: コードを出力");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_code_succeeds() {
        let service = EmailService::new(false);
        service
            .send_code("alice", "123456", CodePurpose::PasswordReset)
            .await
            .unwrap();

        let service = EmailService::new(true);
        service
            .send_code("alice", "654321", CodePurpose::EmailVerification)
            .await
            .unwrap();
    }
}
