use secrecy::SecretBox;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_url")]
    pub database_url: SecretBox<String>,
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    // セッショントークン設定
    /// HS256 署名キー（必須）
    pub jwt_secret: SecretBox<String>,
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: i64,
    /// 期限切れ後もリフレッシュを許可する猶予（秒）
    #[serde(default = "default_refresh_grace_secs")]
    pub refresh_grace_secs: i64,

    // リセット／確認コード設定
    #[serde(default = "default_pending_token_ttl_secs")]
    pub pending_token_ttl_secs: i64,
    /// 開発用: 発行したコードをログに出力する
    #[serde(default)]
    pub dev_log_codes: bool,

    // argon2 コスト設定
    #[serde(default = "default_password_hash_memory_kib")]
    pub password_hash_memory_kib: u32,
    #[serde(default = "default_password_hash_iterations")]
    pub password_hash_iterations: u32,
    #[serde(default = "default_password_hash_parallelism")]
    pub password_hash_parallelism: u32,
}

const DEFAULT_DATABASE_URL: &str = "sqlite:tvgate.db";
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 3600;
const DEFAULT_REFRESH_GRACE_SECS: i64 = 86_400;
const DEFAULT_PENDING_TOKEN_TTL_SECS: i64 = 900;
const DEFAULT_PASSWORD_HASH_MEMORY_KIB: u32 = 19_456;
const DEFAULT_PASSWORD_HASH_ITERATIONS: u32 = 2;
const DEFAULT_PASSWORD_HASH_PARALLELISM: u32 = 1;

fn default_database_url() -> SecretBox<String> {
    SecretBox::new(Box::new(DEFAULT_DATABASE_URL.to_string()))
}

fn default_database_max_connections() -> u32 {
    DEFAULT_DATABASE_MAX_CONNECTIONS
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_access_token_ttl_secs() -> i64 {
    DEFAULT_ACCESS_TOKEN_TTL_SECS
}

fn default_refresh_grace_secs() -> i64 {
    DEFAULT_REFRESH_GRACE_SECS
}

fn default_pending_token_ttl_secs() -> i64 {
    DEFAULT_PENDING_TOKEN_TTL_SECS
}

fn default_password_hash_memory_kib() -> u32 {
    DEFAULT_PASSWORD_HASH_MEMORY_KIB
}

fn default_password_hash_iterations() -> u32 {
    DEFAULT_PASSWORD_HASH_ITERATIONS
}

fn default_password_hash_parallelism() -> u32 {
    DEFAULT_PASSWORD_HASH_PARALLELISM
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
