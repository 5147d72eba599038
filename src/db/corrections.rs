// 訂正リクエストの永続化と状態遷移

use crate::common::error::BankError;
use crate::common::types::{CorrectionRequest, CorrectionStatus};
use crate::db::users::{parse_timestamp, parse_uuid};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// 訂正リクエストをpending状態で作成
///
/// incorrect_labelはユーザー提出時点のプロファイルラベルのスナップショット。
/// 後からプロファイルが変わっても申請内容は不変に保つ。
pub async fn create(
    pool: &SqlitePool,
    user_id: Uuid,
    ai_profile_id: Uuid,
    incorrect_label: &str,
    requested_label: Option<&str>,
) -> Result<CorrectionRequest, BankError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO correction_requests
         (id, user_id, ai_profile_id, incorrect_label, requested_label, status, admin_notes, created_at, processed_at)
         VALUES (?, ?, ?, ?, ?, 'pending', NULL, ?, NULL)",
    )
    .bind(id.to_string())
    .bind(user_id.to_string())
    .bind(ai_profile_id.to_string())
    .bind(incorrect_label)
    .bind(requested_label)
    .bind(now.to_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to create correction request: {}", e)))?;

    Ok(CorrectionRequest {
        id,
        user_id,
        ai_profile_id,
        incorrect_label: incorrect_label.to_string(),
        requested_label: requested_label.map(|s| s.to_string()),
        status: CorrectionStatus::Pending,
        admin_notes: None,
        created_at: now,
        processed_at: None,
    })
}

/// 全訂正リクエストを新しい順に取得（管理者向け）
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<CorrectionRequest>, BankError> {
    let rows = sqlx::query_as::<_, CorrectionRow>(
        "SELECT id, user_id, ai_profile_id, incorrect_label, requested_label, status, admin_notes, created_at, processed_at
         FROM correction_requests ORDER BY created_at DESC, id",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to list correction requests: {}", e)))?;

    rows.into_iter().map(|r| r.into_request()).collect()
}

/// IDで訂正リクエストを取得
pub async fn find_by_id(
    pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<CorrectionRequest>, BankError> {
    let row = sqlx::query_as::<_, CorrectionRow>(
        "SELECT id, user_id, ai_profile_id, incorrect_label, requested_label, status, admin_notes, created_at, processed_at
         FROM correction_requests WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to find correction request: {}", e)))?;

    row.map(|r| r.into_request()).transpose()
}

/// pending状態のリクエストを承認/却下に遷移させる
///
/// 終端状態（approved / rejected）のリクエストは再処理できず、
/// InvalidStateを返す。WHERE句でstatus='pending'を条件にすることで
/// 同一リクエストへの並行処理も片方だけが成功する。
pub async fn transition(
    pool: &SqlitePool,
    id: Uuid,
    new_status: CorrectionStatus,
    admin_notes: &str,
) -> Result<CorrectionRequest, BankError> {
    let current = find_by_id(pool, id)
        .await?
        .ok_or_else(|| BankError::NotFound("Correction request not found".to_string()))?;

    if current.status.is_terminal() {
        return Err(BankError::InvalidState(format!(
            "Correction request {} has already been processed",
            id
        )));
    }

    let now = Utc::now();
    let result = sqlx::query(
        "UPDATE correction_requests
         SET status = ?, admin_notes = ?, processed_at = ?
         WHERE id = ? AND status = 'pending'",
    )
    .bind(new_status.as_str())
    .bind(admin_notes)
    .bind(now.to_rfc3339())
    .bind(id.to_string())
    .execute(pool)
    .await
    .map_err(|e| BankError::Database(format!("Failed to update correction request: {}", e)))?;

    if result.rows_affected() == 0 {
        // 読み取りと更新の間に別の処理が先行した
        return Err(BankError::InvalidState(format!(
            "Correction request {} has already been processed",
            id
        )));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| BankError::Internal("Correction request missing after update".to_string()))
}

#[derive(sqlx::FromRow)]
struct CorrectionRow {
    id: String,
    user_id: String,
    ai_profile_id: String,
    incorrect_label: String,
    requested_label: Option<String>,
    status: String,
    admin_notes: Option<String>,
    created_at: String,
    processed_at: Option<String>,
}

impl CorrectionRow {
    fn into_request(self) -> Result<CorrectionRequest, BankError> {
        let processed_at: Option<DateTime<Utc>> = self
            .processed_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;
        Ok(CorrectionRequest {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            ai_profile_id: parse_uuid(&self.ai_profile_id)?,
            incorrect_label: self.incorrect_label,
            requested_label: self.requested_label,
            status: CorrectionStatus::parse(&self.status).ok_or_else(|| {
                BankError::Database(format!("Unknown correction status: {}", self.status))
            })?,
            admin_notes: self.admin_notes,
            created_at: parse_timestamp(&self.created_at)?,
            processed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::profiles;
    use crate::db::test_utils::{test_db_pool, test_user};
    use crate::engine::GeneratedProfile;

    async fn seeded_profile(pool: &SqlitePool, user_id: Uuid) -> Uuid {
        let mut conn = pool.acquire().await.unwrap();
        let profile = profiles::insert(
            &mut conn,
            &GeneratedProfile {
                user_id,
                label: "High Spender".to_string(),
                confidence: 80,
            },
        )
        .await
        .unwrap()
        .unwrap();
        profile.id
    }

    #[tokio::test]
    async fn test_create_is_pending() {
        let pool = test_db_pool().await;
        let user = test_user(&pool, "cr@example.com").await;
        let profile_id = seeded_profile(&pool, user.id).await;

        let request = create(&pool, user.id, profile_id, "High Spender", Some("Saver"))
            .await
            .unwrap();
        assert_eq!(request.status, CorrectionStatus::Pending);
        assert_eq!(request.incorrect_label, "High Spender");
        assert_eq!(request.requested_label.as_deref(), Some("Saver"));
        assert!(request.admin_notes.is_none());
        assert!(request.processed_at.is_none());
    }

    #[tokio::test]
    async fn test_requested_label_is_optional() {
        let pool = test_db_pool().await;
        let user = test_user(&pool, "cr1@example.com").await;
        let profile_id = seeded_profile(&pool, user.id).await;

        let request = create(&pool, user.id, profile_id, "High Spender", None)
            .await
            .unwrap();
        let stored = find_by_id(&pool, request.id).await.unwrap().unwrap();
        assert!(stored.requested_label.is_none());
    }

    #[tokio::test]
    async fn test_approve_sets_notes_and_timestamp() {
        let pool = test_db_pool().await;
        let user = test_user(&pool, "cr2@example.com").await;
        let profile_id = seeded_profile(&pool, user.id).await;
        let request = create(&pool, user.id, profile_id, "High Spender", None)
            .await
            .unwrap();

        let approved = transition(
            &pool,
            request.id,
            CorrectionStatus::Approved,
            "Correction approved",
        )
        .await
        .unwrap();
        assert_eq!(approved.status, CorrectionStatus::Approved);
        assert_eq!(approved.admin_notes.as_deref(), Some("Correction approved"));
        assert!(approved.processed_at.is_some());
    }

    #[tokio::test]
    async fn test_terminal_request_cannot_be_reprocessed() {
        let pool = test_db_pool().await;
        let user = test_user(&pool, "cr3@example.com").await;
        let profile_id = seeded_profile(&pool, user.id).await;
        let request = create(&pool, user.id, profile_id, "High Spender", None)
            .await
            .unwrap();

        transition(
            &pool,
            request.id,
            CorrectionStatus::Rejected,
            "Correction rejected",
        )
        .await
        .unwrap();

        let err = transition(
            &pool,
            request.id,
            CorrectionStatus::Approved,
            "Correction approved",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BankError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_transition_missing_request_is_not_found() {
        let pool = test_db_pool().await;
        let err = transition(
            &pool,
            Uuid::new_v4(),
            CorrectionStatus::Approved,
            "Correction approved",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BankError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_all_returns_everything() {
        let pool = test_db_pool().await;
        let user = test_user(&pool, "cr4@example.com").await;
        let profile_id = seeded_profile(&pool, user.id).await;

        create(&pool, user.id, profile_id, "High Spender", None)
            .await
            .unwrap();
        create(&pool, user.id, profile_id, "High Spender", Some("Planner"))
            .await
            .unwrap();

        let all = list_all(&pool).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
