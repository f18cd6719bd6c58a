use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// アカウント（唯一の永続エンティティ）
///
/// pending_token は平文コードではなく SHA256 ダイジェストを保持する。
/// 同時に保持できるコードは 1 つだけ（新規発行で上書き）。
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(skip)]
    pub pending_token: Option<String>,
    #[serde(skip)]
    pub pending_token_issued_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Account {
    /// クライアントへ返すプロフィール
    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id,
            username: self.username.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_skips_secrets() {
        let account = Account {
            id: 1,
            username: "alice".to_string(),
            password_hash: "$argon2id$...".to_string(),
            pending_token: Some("digest".to_string()),
            pending_token_issued_at: Some(OffsetDateTime::UNIX_EPOCH),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };

        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["created_at"], "1970-01-01T00:00:00Z");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("pending_token").is_none());
        assert!(json.get("pending_token_issued_at").is_none());
    }
}
