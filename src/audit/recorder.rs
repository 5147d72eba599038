use crate::common::error::BankError;
use crate::common::types::{AiDecision, DecisionAuditLog};
use crate::db::audit_log;
use crate::engine;
use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

/// 判定に対応する監査ログエントリを生成して書き込む
///
/// features_hashと説明可能性テーブルはこの時点で確定し、以後変更されない。
/// customer_appealedはfalseで初期化される。
///
/// # Arguments
/// * `conn` - 判定シードと同じトランザクションの接続
/// * `decision` - 直前に挿入された判定
///
/// # Returns
/// 書き込んだ監査ログエントリ
pub async fn record(
    conn: &mut SqliteConnection,
    decision: &AiDecision,
) -> Result<DecisionAuditLog, BankError> {
    let entry = DecisionAuditLog {
        id: Uuid::new_v4(),
        ai_decision_id: decision.id,
        user_id: decision.user_id,
        model_version: decision.model_version.clone(),
        features_hash: engine::features_hash(decision.user_id, decision.decision_type),
        raw_explainability: engine::raw_explainability(decision.decision_type),
        customer_appealed: false,
        created_at: Utc::now(),
    };

    audit_log::insert(conn, &entry).await?;
    Ok(entry)
}
