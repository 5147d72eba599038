// AIプロファイルの永続化

use crate::common::error::BankError;
use crate::common::types::AiProfile;
use crate::db::users::{parse_timestamp, parse_uuid};
use crate::engine::GeneratedProfile;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

/// プロファイルを挿入
///
/// シードトランザクション内から呼ばれる。UNIQUE(user_id, label)に
/// 衝突した場合はINSERT OR IGNOREにより黙ってスキップされ、`Ok(None)`を返す
/// （同時シード競合時の重複防止）。
pub async fn insert(
    conn: &mut SqliteConnection,
    generated: &GeneratedProfile,
) -> Result<Option<AiProfile>, BankError> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    let result = sqlx::query(
        "INSERT OR IGNORE INTO ai_profiles (id, user_id, label, confidence, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(generated.user_id.to_string())
    .bind(&generated.label)
    .bind(generated.confidence)
    .bind(created_at.to_rfc3339())
    .execute(conn)
    .await
    .map_err(|e| BankError::Database(format!("Failed to create AI profile: {}", e)))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    Ok(Some(AiProfile {
        id,
        user_id: generated.user_id,
        label: generated.label.clone(),
        confidence: generated.confidence,
        created_at,
    }))
}

/// ユーザーのプロファイル一覧を取得（作成日時降順）
pub async fn list_by_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<AiProfile>, BankError> {
    let rows = sqlx::query_as::<_, ProfileRow>(
        "SELECT id, user_id, label, confidence, created_at
         FROM ai_profiles WHERE user_id = ? ORDER BY created_at DESC, id",
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to list AI profiles: {}", e)))?;

    rows.into_iter().map(|r| r.into_profile()).collect()
}

/// 指定ユーザーが所有するプロファイルを1件検索
///
/// 所有者でないプロファイルは存在しないものとして扱う
/// （訂正リクエストの所有権チェックに使用）。
pub async fn find_owned(
    pool: &SqlitePool,
    user_id: Uuid,
    profile_id: Uuid,
) -> Result<Option<AiProfile>, BankError> {
    let row = sqlx::query_as::<_, ProfileRow>(
        "SELECT id, user_id, label, confidence, created_at
         FROM ai_profiles WHERE id = ? AND user_id = ?",
    )
    .bind(profile_id.to_string())
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to find AI profile: {}", e)))?;

    row.map(|r| r.into_profile()).transpose()
}

/// トランザクション内でのプロファイル件数取得（シード判定用）
pub async fn count_by_user(
    conn: &mut SqliteConnection,
    user_id: Uuid,
) -> Result<i64, BankError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM ai_profiles WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_one(conn)
        .await
        .map_err(|e| BankError::Database(format!("Failed to count AI profiles: {}", e)))
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: String,
    user_id: String,
    label: String,
    confidence: i64,
    created_at: String,
}

impl ProfileRow {
    fn into_profile(self) -> Result<AiProfile, BankError> {
        Ok(AiProfile {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            label: self.label,
            confidence: self.confidence,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}
