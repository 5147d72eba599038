//! ユーザーAPI

use crate::common::auth::Claims;
use crate::common::error::BankError;
use crate::AppState;
use axum::{extract::State, Extension, Json};

use super::auth::parse_subject;
use super::error::AppError;

/// GET /api/auth/user - ログイン中ユーザーの取得
///
/// # Returns
/// * `200 OK` - ユーザー情報（パスワードハッシュは含まない）
/// * `404 Not Found` - ユーザーが削除済み
pub async fn get_current_user(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<crate::common::auth::User>, AppError> {
    let user_id = parse_subject(&claims)?;

    let user = crate::db::users::find_by_id(&app_state.db_pool, user_id)
        .await?
        .ok_or_else(|| BankError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
