//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! `BankError`は`external_message()`と`status_code()`を提供し、
//! クライアント向けの安全なJSONエラーレスポンスを生成できる。
//! 内部詳細（SQL文、接続先など）はサーバーログにのみ出力する。

use axum::http::StatusCode;
use thiserror::Error;

/// banking portal error type
#[derive(Debug, Error)]
pub enum BankError {
    /// Malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate resource
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid credentials or missing authentication
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Token signature malformed or wrong
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token past expiry
    #[error("Token expired: {0}")]
    TokenExpired(String),

    /// Authenticated but not permitted
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// State machine violation (e.g. re-processing a terminal correction)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Persistence store failure
    #[error("Database error: {0}")]
    Database(String),

    /// Password hash error
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// JWT issuance error
    #[error("JWT error: {0}")]
    Jwt(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BankError {
    /// Returns a safe error message for external clients.
    ///
    /// Internal details (SQL statements, bcrypt output, token contents)
    /// stay in the server logs; only the `Display` of variants whose
    /// payload is already a client-facing sentence is echoed by handlers.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation error",
            Self::Conflict(_) => "Conflict",
            Self::Authentication(_) => "Authentication failed",
            Self::InvalidToken(_) => "Invalid token",
            Self::TokenExpired(_) => "Token expired",
            Self::Authorization(_) => "Access denied",
            Self::NotFound(_) => "Not found",
            Self::InvalidState(_) => "Invalid state",
            Self::Database(_) => "Service temporarily unavailable",
            Self::PasswordHash(_) => "Internal server error",
            Self::Jwt(_) => "Internal server error",
            Self::Internal(_) => "Internal server error",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Self::TokenExpired(_) => StatusCode::UNAUTHORIZED,
            Self::Authorization(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Jwt(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias
pub type BankResult<T> = Result<T, BankError>;
