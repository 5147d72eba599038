//! AI判定API
//!
//! 遅延シード付きの判定一覧取得。シード時は同一トランザクションで
//! 監査ログも書き込む。

use crate::audit;
use crate::common::auth::Claims;
use crate::common::error::BankError;
use crate::common::types::AiDecision;
use crate::engine;
use crate::AppState;
use axum::{extract::State, Extension, Json};
use uuid::Uuid;

use super::auth::parse_subject;
use super::error::AppError;

/// 初回アクセス時にシードする判定数
const DECISION_SEED_COUNT: usize = 3;

/// GET /api/decisions - 判定一覧取得（遅延シード）
///
/// 初回アクセス時は固定テンプレート3種の判定を生成し、各判定の監査ログを
/// 同一トランザクションで書き込む。判定だけ存在して監査ログが無い状態は
/// コミット境界上も発生しない。
///
/// # Returns
/// * `200 OK` - 判定一覧
pub async fn get_decisions(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<AiDecision>>, AppError> {
    let user_id = parse_subject(&claims)?;

    let decisions = crate::db::decisions::list_by_user(&app_state.db_pool, user_id).await?;
    if !decisions.is_empty() {
        return Ok(Json(decisions));
    }

    seed_decisions(&app_state, user_id).await?;

    let decisions = crate::db::decisions::list_by_user(&app_state.db_pool, user_id).await?;
    Ok(Json(decisions))
}

async fn seed_decisions(app_state: &AppState, user_id: Uuid) -> Result<(), BankError> {
    let mut conn = crate::db::begin_immediate(&app_state.db_pool).await?;

    let seeded = match insert_decision_batch(&mut conn, user_id).await {
        Ok(seeded) => seeded,
        Err(e) => {
            crate::db::rollback(&mut conn).await;
            return Err(e);
        }
    };
    crate::db::commit(&mut conn).await?;

    if seeded {
        tracing::info!(user_id = %user_id, count = DECISION_SEED_COUNT, "Seeded AI decisions");
    }
    Ok(())
}

async fn insert_decision_batch(
    conn: &mut sqlx::SqliteConnection,
    user_id: Uuid,
) -> Result<bool, BankError> {
    // 書き込みロック獲得後の再チェック。並行シードの後着側はここで抜ける
    if crate::db::decisions::count_by_user(conn, user_id).await? > 0 {
        return Ok(false);
    }

    let generated = engine::generate_decisions(user_id, DECISION_SEED_COUNT);
    for item in &generated {
        if let Some(decision) = crate::db::decisions::insert(conn, item).await? {
            audit::record(conn, &decision).await?;
        }
    }
    Ok(true)
}
