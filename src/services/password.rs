use std::sync::{Arc, OnceLock};

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use crate::error::AppError;

/// ダミー検証用ハッシュの生成に失敗したときに使う固定ダイジェスト（どのパスワードとも一致しない）
const FALLBACK_DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// パスワードハッシュサービス（argon2id）
///
/// # Security
/// - 平文パスワードはログに出力しない
/// - ハッシュ計算は CPU 負荷が高いため、非同期コンテキストからは `*_blocking` を使うこと
#[derive(Clone)]
pub struct PasswordService {
    params: Params,
    dummy_hash: Arc<OnceLock<String>>,
}

impl PasswordService {
    /// 新しい PasswordService を作成
    ///
    /// # Arguments
    /// * `memory_kib` - メモリコスト（KiB）
    /// * `iterations` - 反復回数
    /// * `parallelism` - 並列度
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AppError> {
        let params = Params::new(memory_kib, iterations, parallelism, None).map_err(|e| {
            tracing::error!(error = ?e, "argon2 パラメータが不正");
            AppError::Internal(anyhow::anyhow!("invalid argon2 params: {e}"))
        })?;

        Ok(Self {
            params,
            dummy_hash: Arc::new(OnceLock::new()),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// パスワードをハッシュ化（呼び出しごとにランダムソルト）
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(error = ?e, "パスワードハッシュ生成エラー");
                AppError::Internal(anyhow::anyhow!("password hash error"))
            })?;
        Ok(hash.to_string())
    }

    /// パスワードを検証
    ///
    /// 不正な形式のダイジェストはエラーにせず false を返す。
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        let parsed_hash = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = ?e, "パスワードハッシュのパースエラー");
                return false;
            }
        };

        // パラメータはダイジェスト側に埋め込まれたものが使われる
        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// タイミング攻撃対策: 存在しないアカウントでも同等のコストで検証を行う
    pub fn verify_dummy(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_init(|| match self.hash("tvgate-dummy-password") {
                Ok(hash) => hash,
                Err(e) => {
                    tracing::error!(error = ?e, "ダミーハッシュの生成に失敗、固定ダイジェストを使用");
                    FALLBACK_DUMMY_HASH.to_string()
                }
            });
        let _ = self.verify(password, dummy);
    }

    /// `hash` をブロッキングスレッドプールで実行
    pub async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hash task failed: {e}")))?
    }

    /// `verify` をブロッキングスレッドプールで実行
    pub async fn verify_blocking(&self, password: String, digest: String) -> Result<bool, AppError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify(&password, &digest))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("verify task failed: {e}")))
    }

    /// `verify_dummy` をブロッキングスレッドプールで実行
    pub async fn verify_dummy_blocking(&self, password: String) -> Result<(), AppError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify_dummy(&password))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("verify task failed: {e}")))
    }
}

#[cfg(test)]
pub(crate) fn test_password_service() -> PasswordService {
    // テスト用の低コストパラメータ
    PasswordService::new(1024, 1, 1).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = test_password_service();
        let hash = service.hash("password123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify("password123", &hash));
        assert!(!service.verify("password124", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let service = test_password_service();
        let first = service.hash("password123").unwrap();
        let second = service.hash("password123").unwrap();

        assert_ne!(first, second);
        assert!(service.verify("password123", &first));
        assert!(service.verify("password123", &second));
    }

    #[test]
    fn test_verify_malformed_digest() {
        let service = test_password_service();
        assert!(!service.verify("password123", "invalid_hash_format"));
        assert!(!service.verify("password123", ""));
    }

    #[test]
    fn test_verify_with_other_params() {
        // 異なるコスト設定で作成したハッシュも検証できる
        let strong = PasswordService::new(2048, 2, 1).unwrap();
        let weak = test_password_service();
        let hash = strong.hash("password123").unwrap();
        assert!(weak.verify("password123", &hash));
    }

    #[test]
    fn test_fallback_dummy_hash_is_valid_digest() {
        let parsed = PasswordHash::new(FALLBACK_DUMMY_HASH).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");

        let service = test_password_service();
        assert!(!service.verify("tvgate-dummy-password", FALLBACK_DUMMY_HASH));
        assert!(!service.verify("", FALLBACK_DUMMY_HASH));
    }

    #[test]
    fn test_invalid_params() {
        assert!(PasswordService::new(0, 0, 0).is_err());
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let service = test_password_service();
        let hash = service.hash_blocking("secret-pw".to_string()).await.unwrap();

        assert!(
            service
                .verify_blocking("secret-pw".to_string(), hash.clone())
                .await
                .unwrap()
        );
        assert!(
            !service
                .verify_blocking("other-pw".to_string(), hash)
                .await
                .unwrap()
        );
        service
            .verify_dummy_blocking("whatever".to_string())
            .await
            .unwrap();
    }
}
