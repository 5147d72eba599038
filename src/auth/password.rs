// bcryptによる資格情報保護。平文パスワードはこのモジュールの外に出さない

use crate::common::error::BankError;
use bcrypt::{hash, verify};

/// bcryptコストファクタ（2^12ラウンド）
const HASH_COST: u32 = 12;

/// 平文パスワードをソルト付きbcryptハッシュに変換する
///
/// ソルトは呼び出しごとにランダム生成されるため、同一パスワードでも
/// 返るハッシュ文字列は毎回異なる。
pub fn hash_password(password: &str) -> Result<String, BankError> {
    hash(password, HASH_COST)
        .map_err(|e| BankError::PasswordHash(format!("Failed to hash password: {}", e)))
}

/// 平文パスワードを格納済みハッシュと照合する
///
/// # Returns
/// * `Ok(true)` - 一致
/// * `Ok(false)` - 不一致
/// * `Err(BankError::PasswordHash)` - ハッシュ文字列がbcrypt形式でない
pub fn verify_password(password: &str, hash: &str) -> Result<bool, BankError> {
    verify(password, hash)
        .map_err(|e| BankError::PasswordHash(format!("Failed to verify password: {}", e)))
}
