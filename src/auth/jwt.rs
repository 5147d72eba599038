// JWT生成と検証（jsonwebtoken実装）

use crate::common::auth::{Claims, UserRole};
use crate::common::error::BankError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};

/// JWT有効期限（7日）。リフレッシュ機構はなく、期限切れは再ログイン。
const JWT_EXPIRATION_DAYS: i64 = 7;

/// JWTトークンを生成
///
/// # Arguments
/// * `user_id` - ユーザーID
/// * `role` - ユーザーロール
/// * `secret` - JWTシークレットキー
///
/// # Returns
/// * `Ok(String)` - JWTトークン（3つのドット区切り部分）
/// * `Err(BankError)` - 生成失敗
pub fn issue_token(user_id: &str, role: UserRole, secret: &str) -> Result<String, BankError> {
    let expiration = Utc::now()
        .checked_add_signed(chrono::Duration::days(JWT_EXPIRATION_DAYS))
        .ok_or_else(|| BankError::Jwt("Failed to calculate expiration time".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| BankError::Jwt(format!("Failed to create JWT: {}", e)))
}

/// JWTトークンを検証
///
/// 署名不正と期限切れはエラー種別で区別する（どちらも401にマップされるが
/// クライアント向けメッセージが異なる）。
///
/// # Arguments
/// * `token` - 検証するJWTトークン
/// * `secret` - JWTシークレットキー
///
/// # Returns
/// * `Ok(Claims)` - 検証済みクレーム
/// * `Err(BankError::TokenExpired)` - 有効期限切れ
/// * `Err(BankError::InvalidToken)` - 署名不正・形式不正
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, BankError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => {
            BankError::TokenExpired("Your session has expired. Please login again.".to_string())
        }
        _ => BankError::InvalidToken(format!("Failed to verify JWT: {}", e)),
    })
}
