// 判定監査ログの永続化（追記専用）
//
// このモジュールは挿入と読み取りのみを公開する。
// 更新・削除操作は存在せず、今後も追加しないこと。

use crate::common::error::BankError;
use crate::common::types::DecisionAuditLog;
use crate::db::users::{parse_timestamp, parse_uuid};
use sqlx::{SqliteConnection, SqlitePool};

/// 監査ログエントリを挿入
///
/// 判定シードと同一トランザクション内から呼ばれる。
/// UNIQUE(ai_decision_id)により判定1件につきログ1件が保証される。
pub async fn insert(
    conn: &mut SqliteConnection,
    entry: &DecisionAuditLog,
) -> Result<(), BankError> {
    let raw = serde_json::to_string(&entry.raw_explainability)
        .map_err(|e| BankError::Internal(format!("Failed to serialize explainability: {}", e)))?;

    sqlx::query(
        "INSERT INTO decision_audit_logs
         (id, ai_decision_id, user_id, model_version, features_hash, raw_explainability, customer_appealed, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(entry.id.to_string())
    .bind(entry.ai_decision_id.to_string())
    .bind(entry.user_id.to_string())
    .bind(&entry.model_version)
    .bind(&entry.features_hash)
    .bind(raw)
    .bind(entry.customer_appealed as i32)
    .bind(entry.created_at.to_rfc3339())
    .execute(conn)
    .await
    .map_err(|e| BankError::Database(format!("Failed to create audit log: {}", e)))?;

    Ok(())
}

/// すべての監査ログを取得（作成日時降順、管理コンソール用）
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<DecisionAuditLog>, BankError> {
    let rows = sqlx::query_as::<_, AuditLogRow>(
        "SELECT id, ai_decision_id, user_id, model_version, features_hash, raw_explainability, customer_appealed, created_at
         FROM decision_audit_logs ORDER BY created_at DESC, id",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to list audit logs: {}", e)))?;

    rows.into_iter().map(|r| r.into_entry()).collect()
}

/// 判定IDで監査ログを検索（テスト・検証用）
pub async fn find_by_decision(
    pool: &SqlitePool,
    ai_decision_id: uuid::Uuid,
) -> Result<Option<DecisionAuditLog>, BankError> {
    let row = sqlx::query_as::<_, AuditLogRow>(
        "SELECT id, ai_decision_id, user_id, model_version, features_hash, raw_explainability, customer_appealed, created_at
         FROM decision_audit_logs WHERE ai_decision_id = ?",
    )
    .bind(ai_decision_id.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to find audit log: {}", e)))?;

    row.map(|r| r.into_entry()).transpose()
}

#[derive(sqlx::FromRow)]
struct AuditLogRow {
    id: String,
    ai_decision_id: String,
    user_id: String,
    model_version: String,
    features_hash: String,
    raw_explainability: String,
    customer_appealed: i64,
    created_at: String,
}

impl AuditLogRow {
    fn into_entry(self) -> Result<DecisionAuditLog, BankError> {
        let raw_explainability = serde_json::from_str(&self.raw_explainability)
            .map_err(|e| BankError::Database(format!("Invalid stored explainability: {}", e)))?;
        Ok(DecisionAuditLog {
            id: parse_uuid(&self.id)?,
            ai_decision_id: parse_uuid(&self.ai_decision_id)?,
            user_id: parse_uuid(&self.user_id)?,
            model_version: self.model_version,
            features_hash: self.features_hash,
            raw_explainability,
            customer_appealed: self.customer_appealed != 0,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}
