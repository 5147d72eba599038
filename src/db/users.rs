// ユーザーCRUD操作

use crate::common::auth::{User, UserRole};
use crate::common::error::BankError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// ユーザーを作成
///
/// emailは呼び出し側で正規化（小文字化・trim）済みであることを前提とする。
///
/// # Arguments
/// * `pool` - データベース接続プール
/// * `email` - メールアドレス
/// * `password_hash` - bcryptハッシュ化されたパスワード
/// * `first_name` - 名（任意）
/// * `last_name` - 姓（任意）
/// * `role` - ユーザーロール
///
/// # Returns
/// * `Ok(User)` - 作成されたユーザー
/// * `Err(BankError::Conflict)` - メールアドレス重複
/// * `Err(BankError::Database)` - その他の失敗
pub async fn create(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    role: UserRole,
) -> Result<User, BankError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO users (id, email, password_hash, first_name, last_name, role, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(email)
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(role.as_str())
    .bind(now.to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            BankError::Conflict(
                "An account with this email already exists. Please login instead.".to_string(),
            )
        } else {
            BankError::Database(format!("Failed to create user: {}", e))
        }
    })?;

    Ok(User {
        id,
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        first_name: first_name.map(str::to_string),
        last_name: last_name.map(str::to_string),
        role,
        created_at: now,
        updated_at: now,
    })
}

/// メールアドレスでユーザーを検索
///
/// # Returns
/// * `Ok(Some(User))` - ユーザーが見つかった
/// * `Ok(None)` - ユーザーが見つからなかった
/// * `Err(BankError)` - 検索失敗
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, BankError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, first_name, last_name, role, created_at, updated_at
         FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to find user: {}", e)))?;

    row.map(|r| r.into_user()).transpose()
}

/// IDでユーザーを検索
///
/// # Returns
/// * `Ok(Some(User))` - ユーザーが見つかった
/// * `Ok(None)` - ユーザーが見つからなかった
/// * `Err(BankError)` - 検索失敗
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, BankError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, first_name, last_name, role, created_at, updated_at
         FROM users WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to find user: {}", e)))?;

    row.map(|r| r.into_user()).transpose()
}

// SQLiteからの行取得用の内部型
#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    role: String,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn into_user(self) -> Result<User, BankError> {
        Ok(User {
            id: parse_uuid(&self.id)?,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            role: UserRole::from_str_or_default(&self.role),
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, BankError> {
    Uuid::parse_str(raw).map_err(|e| BankError::Database(format!("Invalid stored id: {}", e)))
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, BankError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| BankError::Database(format!("Invalid stored timestamp: {}", e)))
}
