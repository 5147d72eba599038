// AI判定の永続化

use crate::common::error::BankError;
use crate::common::types::{AiDecision, DecisionType};
use crate::db::users::{parse_timestamp, parse_uuid};
use crate::engine::GeneratedDecision;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

/// 判定を挿入
///
/// シードトランザクション内から呼ばれる。UNIQUE(user_id, decision_type)に
/// 衝突した場合はINSERT OR IGNOREによりスキップされ、`Ok(None)`を返す。
pub async fn insert(
    conn: &mut SqliteConnection,
    generated: &GeneratedDecision,
) -> Result<Option<AiDecision>, BankError> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    let result = sqlx::query(
        "INSERT OR IGNORE INTO ai_decisions
         (id, user_id, decision_type, decision_text, explanation, model_version, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(generated.user_id.to_string())
    .bind(generated.decision_type.as_str())
    .bind(&generated.decision_text)
    .bind(&generated.explanation)
    .bind(&generated.model_version)
    .bind(created_at.to_rfc3339())
    .execute(conn)
    .await
    .map_err(|e| BankError::Database(format!("Failed to create AI decision: {}", e)))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    Ok(Some(AiDecision {
        id,
        user_id: generated.user_id,
        decision_type: generated.decision_type,
        decision_text: generated.decision_text.clone(),
        explanation: generated.explanation.clone(),
        model_version: generated.model_version.clone(),
        created_at,
    }))
}

/// ユーザーの判定一覧を取得（作成日時降順）
pub async fn list_by_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<AiDecision>, BankError> {
    let rows = sqlx::query_as::<_, DecisionRow>(
        "SELECT id, user_id, decision_type, decision_text, explanation, model_version, created_at
         FROM ai_decisions WHERE user_id = ? ORDER BY created_at DESC, id",
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to list AI decisions: {}", e)))?;

    rows.into_iter().map(|r| r.into_decision()).collect()
}

/// トランザクション内での判定件数取得（シード判定用）
pub async fn count_by_user(
    conn: &mut SqliteConnection,
    user_id: Uuid,
) -> Result<i64, BankError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM ai_decisions WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_one(conn)
        .await
        .map_err(|e| BankError::Database(format!("Failed to count AI decisions: {}", e)))
}

#[derive(sqlx::FromRow)]
struct DecisionRow {
    id: String,
    user_id: String,
    decision_type: String,
    decision_text: String,
    explanation: String,
    model_version: String,
    created_at: String,
}

impl DecisionRow {
    fn into_decision(self) -> Result<AiDecision, BankError> {
        let decision_type = DecisionType::parse(&self.decision_type).ok_or_else(|| {
            BankError::Database(format!("Invalid stored decision type: {}", self.decision_type))
        })?;
        Ok(AiDecision {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            decision_type,
            decision_text: self.decision_text,
            explanation: self.explanation,
            model_version: self.model_version,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}
