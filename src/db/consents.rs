// データ同意設定の永続化

use crate::common::error::BankError;
use crate::common::types::DataConsent;
use crate::db::users::{parse_timestamp, parse_uuid};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// ユーザーの同意設定を取得
pub async fn find_by_user(
    pool: &SqlitePool,
    user_id: Uuid,
) -> Result<Option<DataConsent>, BankError> {
    let row = sqlx::query_as::<_, ConsentRow>(
        "SELECT id, user_id, fraud_detection, marketing_offers, financial_advice, updated_at
         FROM data_consents WHERE user_id = ?",
    )
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to find consent: {}", e)))?;

    row.map(|r| r.into_consent()).transpose()
}

/// 同意設定を全フラグtrueのデフォルトで作成
///
/// 初回読み取り時のデフォルト作成に使用。既に行が存在する場合は
/// ON CONFLICTで既存行を保持し、既存の内容を返す。
pub async fn create_default(pool: &SqlitePool, user_id: Uuid) -> Result<DataConsent, BankError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO data_consents (id, user_id, fraud_detection, marketing_offers, financial_advice, updated_at)
         VALUES (?, ?, 1, 1, 1, ?)
         ON CONFLICT(user_id) DO NOTHING",
    )
    .bind(id.to_string())
    .bind(user_id.to_string())
    .bind(now.to_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to create consent: {}", e)))?;

    find_by_user(pool, user_id)
        .await?
        .ok_or_else(|| BankError::Internal("Consent row missing after create".to_string()))
}

/// 同意設定を更新
///
/// fraud_detectionは呼び出し側で既存値を引き継ぐこと（この関数は
/// 渡された値をそのまま書くだけで、ロック不変条件はハンドラー層が守る）。
pub async fn update(
    pool: &SqlitePool,
    user_id: Uuid,
    fraud_detection: bool,
    marketing_offers: bool,
    financial_advice: bool,
) -> Result<DataConsent, BankError> {
    let now = Utc::now();

    let result = sqlx::query(
        "UPDATE data_consents
         SET fraud_detection = ?, marketing_offers = ?, financial_advice = ?, updated_at = ?
         WHERE user_id = ?",
    )
    .bind(fraud_detection as i32)
    .bind(marketing_offers as i32)
    .bind(financial_advice as i32)
    .bind(now.to_rfc3339())
    .bind(user_id.to_string())
    .execute(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to update consent: {}", e)))?;

    if result.rows_affected() == 0 {
        return Err(BankError::NotFound("Consent settings not found".to_string()));
    }

    find_by_user(pool, user_id)
        .await?
        .ok_or_else(|| BankError::Internal("Consent row missing after update".to_string()))
}

#[derive(sqlx::FromRow)]
struct ConsentRow {
    id: String,
    user_id: String,
    fraud_detection: i64,
    marketing_offers: i64,
    financial_advice: i64,
    updated_at: String,
}

impl ConsentRow {
    fn into_consent(self) -> Result<DataConsent, BankError> {
        Ok(DataConsent {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            fraud_detection: self.fraud_detection != 0,
            marketing_offers: self.marketing_offers != 0,
            financial_advice: self.financial_advice != 0,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}
