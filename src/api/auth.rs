//! 認証API
//!
//! サインアップ、ログイン、認証情報確認

use crate::auth::{jwt, password};
use crate::common::auth::{Claims, User, UserRole};
use crate::common::error::BankError;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::error::AppError;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile"));

/// パスワード最小文字数
const MIN_PASSWORD_LENGTH: usize = 6;

/// サインアップリクエスト
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// メールアドレス
    pub email: String,
    /// パスワード（平文、保存前にハッシュ化）
    pub password: String,
    /// 名
    pub first_name: Option<String>,
    /// 姓
    pub last_name: Option<String>,
}

/// ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// メールアドレス
    pub email: String,
    /// パスワード
    pub password: String,
}

/// 認証レスポンス（signup / login共通）
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// 処理成功フラグ
    pub success: bool,
    /// 表示用メッセージ
    pub message: String,
    /// ユーザー情報（パスワードハッシュは含まない）
    pub user: User,
    /// JWTトークン
    pub token: String,
}

fn validate_signup(request: &SignupRequest) -> Result<(), BankError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(BankError::Validation(
            "Please provide both email and password".to_string(),
        ));
    }
    if !EMAIL_REGEX.is_match(request.email.trim()) {
        return Err(BankError::Validation(
            "Please provide a valid email address".to_string(),
        ));
    }
    if request.password.len() < MIN_PASSWORD_LENGTH {
        return Err(BankError::Validation(
            "Password must be at least 6 characters long".to_string(),
        ));
    }
    Ok(())
}

/// POST /auth/signup - アカウント作成
///
/// # Returns
/// * `201 Created` - 作成成功（user + token）
/// * `400 Bad Request` - バリデーションエラー
/// * `409 Conflict` - メールアドレス重複
pub async fn signup(
    State(app_state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_signup(&request)?;

    let email = request.email.trim().to_lowercase();

    // 先にチェックし、競合時はUNIQUE制約が最終防衛線になる
    if crate::db::users::find_by_email(&app_state.db_pool, &email)
        .await?
        .is_some()
    {
        return Err(AppError(BankError::Conflict(
            "An account with this email already exists. Please login instead.".to_string(),
        )));
    }

    let password_hash = password::hash_password(&request.password)?;

    let user = crate::db::users::create(
        &app_state.db_pool,
        &email,
        &password_hash,
        request.first_name.as_deref().map(str::trim),
        request.last_name.as_deref().map(str::trim),
        UserRole::Customer,
    )
    .await?;

    let token = jwt::issue_token(&user.id.to_string(), user.role, &app_state.jwt_secret)?;

    tracing::info!(user_id = %user.id, "New account created");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Account created successfully".to_string(),
            user,
            token,
        }),
    ))
}

/// POST /auth/login - ログイン
///
/// 存在しないユーザー、パスワード不一致のいずれもクライアントには
/// 同一の"Invalid credentials"を返す。内訳はサーバーログでのみ区別する。
///
/// # Returns
/// * `200 OK` - ログイン成功（user + token）
/// * `400 Bad Request` - email/password欠落
/// * `401 Unauthorized` - 認証失敗
pub async fn login(
    State(app_state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError(BankError::Validation(
            "Please provide both email and password".to_string(),
        )));
    }

    let email = request.email.trim().to_lowercase();

    let user = match crate::db::users::find_by_email(&app_state.db_pool, &email).await? {
        Some(user) => user,
        None => {
            tracing::warn!("Login attempt for unknown email");
            return Err(AppError(BankError::Authentication(
                "Invalid credentials".to_string(),
            )));
        }
    };

    if user.password_hash.is_empty() {
        tracing::error!(user_id = %user.id, "User has no password hash set");
        return Err(AppError(BankError::Authentication(
            "Invalid credentials".to_string(),
        )));
    }

    if !password::verify_password(&request.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Password mismatch");
        return Err(AppError(BankError::Authentication(
            "Invalid credentials".to_string(),
        )));
    }

    let token = jwt::issue_token(&user.id.to_string(), user.role, &app_state.jwt_secret)?;

    tracing::info!(user_id = %user.id, "Login successful");

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        user,
        token,
    }))
}

/// GET /auth/me - トークン検証と現在ユーザー取得
///
/// # Returns
/// * `200 OK` - `{success, user}`
/// * `404 Not Found` - トークンのユーザーが既に削除済み
pub async fn me(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_subject(&claims)?;

    let user = crate::db::users::find_by_id(&app_state.db_pool, user_id)
        .await?
        .ok_or_else(|| {
            BankError::NotFound("The user associated with this token no longer exists".to_string())
        })?;

    Ok(Json(json!({
        "success": true,
        "user": user,
    })))
}

/// Claimsのsubをユーザーへ解決するためのUUIDパース
pub(crate) fn parse_subject(claims: &Claims) -> Result<Uuid, BankError> {
    Uuid::parse_str(&claims.sub)
        .map_err(|_| BankError::InvalidToken("Token subject is not a valid user id".to_string()))
}
