//! 管理者API
//!
//! 監査ログ閲覧と訂正リクエストキューの処理。
//! ルーター側で`require_admin`が適用済み。

use crate::common::error::BankError;
use crate::common::types::{CorrectionRequest, CorrectionStatus, DecisionAuditLog};
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::error::AppError;

/// GET /api/admin/audit-log - 全監査ログ取得
pub async fn get_audit_log(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<DecisionAuditLog>>, AppError> {
    let logs = crate::db::audit_log::list_all(&app_state.db_pool).await?;
    Ok(Json(logs))
}

/// GET /api/admin/corrections - 全訂正リクエスト取得
pub async fn get_corrections(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<CorrectionRequest>>, AppError> {
    let corrections = crate::db::corrections::list_all(&app_state.db_pool).await?;
    Ok(Json(corrections))
}

/// POST /api/admin/corrections/:id/approve - 訂正リクエスト承認
///
/// # Returns
/// * `200 OK` - 更新後のリクエスト
/// * `404 Not Found` - 不明なID
/// * `409 Conflict` - 既に処理済み
pub async fn approve_correction(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CorrectionRequest>, AppError> {
    process_correction(&app_state, &id, CorrectionStatus::Approved, "Correction approved").await
}

/// POST /api/admin/corrections/:id/reject - 訂正リクエスト却下
pub async fn reject_correction(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CorrectionRequest>, AppError> {
    process_correction(&app_state, &id, CorrectionStatus::Rejected, "Correction rejected").await
}

async fn process_correction(
    app_state: &AppState,
    raw_id: &str,
    new_status: CorrectionStatus,
    notes: &str,
) -> Result<Json<CorrectionRequest>, AppError> {
    let id = Uuid::parse_str(raw_id)
        .map_err(|_| BankError::NotFound("Correction request not found".to_string()))?;

    let updated =
        crate::db::corrections::transition(&app_state.db_pool, id, new_status, notes).await?;

    tracing::info!(
        correction_id = %id,
        status = new_status.as_str(),
        "Correction request processed"
    );

    Ok(Json(updated))
}
