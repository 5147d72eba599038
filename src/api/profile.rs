//! AIプロファイルAPI
//!
//! 遅延シード付きのプロファイル取得と訂正リクエスト提出

use crate::common::auth::Claims;
use crate::common::error::BankError;
use crate::common::types::AiProfile;
use crate::engine;
use crate::AppState;
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::auth::parse_subject;
use super::error::AppError;

/// 初回アクセス時にシードするプロファイル数
const PROFILE_SEED_COUNT: usize = 3;

/// 訂正リクエスト提出ボディ
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionSubmission {
    /// 異議対象のプロファイルID
    pub profile_id: Option<Uuid>,
    /// 希望する置換ラベル（自由記述、任意）
    pub requested_label: Option<String>,
}

/// GET /api/profile - プロファイル一覧取得（遅延シード）
///
/// 初回アクセス時は`BEGIN IMMEDIATE`トランザクション内で3件を生成する。
/// 並行する初回アクセスは書き込みロックで直列化され、後着側はロック獲得後の
/// 空チェックで勝者の行を観測し、何も挿入せずそのまま返す。
///
/// # Returns
/// * `200 OK` - プロファイル一覧
pub async fn get_profiles(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<AiProfile>>, AppError> {
    let user_id = parse_subject(&claims)?;

    let profiles = crate::db::profiles::list_by_user(&app_state.db_pool, user_id).await?;
    if !profiles.is_empty() {
        return Ok(Json(profiles));
    }

    seed_profiles(&app_state, user_id).await?;

    let profiles = crate::db::profiles::list_by_user(&app_state.db_pool, user_id).await?;
    Ok(Json(profiles))
}

async fn seed_profiles(app_state: &AppState, user_id: Uuid) -> Result<(), BankError> {
    let mut conn = crate::db::begin_immediate(&app_state.db_pool).await?;

    let seeded = match insert_profile_batch(&mut conn, user_id).await {
        Ok(seeded) => seeded,
        Err(e) => {
            crate::db::rollback(&mut conn).await;
            return Err(e);
        }
    };
    crate::db::commit(&mut conn).await?;

    if seeded {
        tracing::info!(user_id = %user_id, count = PROFILE_SEED_COUNT, "Seeded AI profiles");
    }
    Ok(())
}

async fn insert_profile_batch(
    conn: &mut sqlx::SqliteConnection,
    user_id: Uuid,
) -> Result<bool, BankError> {
    // 書き込みロック獲得後の再チェック。並行シードの後着側はここで抜ける
    if crate::db::profiles::count_by_user(conn, user_id).await? > 0 {
        return Ok(false);
    }

    let generated = engine::generate_profiles(user_id, PROFILE_SEED_COUNT);
    for profile in &generated {
        crate::db::profiles::insert(conn, profile).await?;
    }
    Ok(true)
}

/// POST /api/profile/correct - 訂正リクエスト提出
///
/// 対象プロファイルは呼び出しユーザー自身のものに限る。
/// 他ユーザーのプロファイルIDは存在チェックで弾かれ404になる。
///
/// # Returns
/// * `200 OK` - 提出完了メッセージ
/// * `400 Bad Request` - profileId欠落
/// * `404 Not Found` - プロファイルが存在しないか他ユーザー所有
pub async fn submit_correction(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(submission): Json<CorrectionSubmission>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = parse_subject(&claims)?;

    let profile_id = submission
        .profile_id
        .ok_or_else(|| BankError::Validation("Profile ID is required".to_string()))?;

    let profile = crate::db::profiles::find_owned(&app_state.db_pool, user_id, profile_id)
        .await?
        .ok_or_else(|| BankError::NotFound("Profile not found".to_string()))?;

    let request = crate::db::corrections::create(
        &app_state.db_pool,
        user_id,
        profile.id,
        &profile.label,
        submission.requested_label.as_deref(),
    )
    .await?;

    tracing::info!(
        user_id = %user_id,
        correction_id = %request.id,
        "Correction request submitted"
    );

    Ok(Json(json!({ "message": "Correction request submitted" })))
}
