//! 初回起動時の管理者アカウント作成
//!
//! 環境変数から管理者を作成する。対話入力は行わない。

use crate::auth::password::hash_password;
use crate::common::auth::{User, UserRole};
use crate::common::error::BankError;
use crate::config::{get_env, get_env_or};
use crate::db;

/// 環境変数から管理者を作成
///
/// # Environment Variables
/// * `CLEARBANK_ADMIN_EMAIL` - 管理者メールアドレス（省略時: "admin@clearbank.local"）
/// * `CLEARBANK_ADMIN_PASSWORD` - 管理者パスワード（必須）
///
/// # Returns
/// * `Ok(Some(email))` - 管理者作成成功（メールアドレスを返す）
/// * `Ok(None)` - CLEARBANK_ADMIN_PASSWORDが未設定（作成しない）
/// * `Err(BankError)` - 作成失敗
pub async fn create_admin_from_env(pool: &sqlx::SqlitePool) -> Result<Option<String>, BankError> {
    let password = match get_env("CLEARBANK_ADMIN_PASSWORD") {
        Some(p) => p,
        None => {
            tracing::debug!("CLEARBANK_ADMIN_PASSWORD not set, skipping admin creation from env");
            return Ok(None);
        }
    };

    let email = get_env_or("CLEARBANK_ADMIN_EMAIL", "admin@clearbank.local").to_lowercase();

    let password_hash = hash_password(&password)?;

    match db::users::create(pool, &email, &password_hash, None, None, UserRole::Admin).await {
        Ok(User { email, .. }) => {
            tracing::info!("Created admin user from env: email={}", email);
            Ok(Some(email))
        }
        Err(BankError::Conflict(_)) => {
            tracing::warn!("Admin user {} already exists, skipping creation", email);
            Ok(Some(email))
        }
        Err(e) => {
            tracing::error!("Failed to create admin user from env: {}", e);
            Err(e)
        }
    }
}

/// 初回起動時の管理者作成処理
///
/// `CLEARBANK_ADMIN_PASSWORD` が設定されていれば管理者を作成する。
/// 既に同じメールアドレスのユーザーが存在する場合は何もしない。
/// 未設定の場合はスキップする（管理者なしでも顧客向けAPIは動作する）。
pub async fn ensure_admin_exists(pool: &sqlx::SqlitePool) -> Result<(), BankError> {
    match create_admin_from_env(pool).await? {
        Some(email) => {
            tracing::info!("Admin account ready: {}", email);
        }
        None => {
            tracing::info!("No admin credentials configured, admin endpoints will be unreachable");
        }
    }
    Ok(())
}
