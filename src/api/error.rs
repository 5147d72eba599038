//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::common::error::BankError;
use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub BankError);

impl From<BankError> for AppError {
    fn from(err: BankError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();

        // detailsにはクライアント向けの文面のみを入れる。
        // Database/Internal系はSQL文や接続先を含みうるため、
        // 内部メッセージはログに出し、クライアントには定型文を返す。
        let details = match &self.0 {
            BankError::Validation(msg)
            | BankError::Conflict(msg)
            | BankError::Authentication(msg)
            | BankError::InvalidToken(msg)
            | BankError::TokenExpired(msg)
            | BankError::Authorization(msg)
            | BankError::NotFound(msg)
            | BankError::InvalidState(msg) => msg.clone(),
            BankError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                "The service is temporarily unavailable. Please try again later.".to_string()
            }
            BankError::PasswordHash(msg) | BankError::Jwt(msg) | BankError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An unexpected error occurred.".to_string()
            }
        };

        let payload = json!({
            "error": self.0.external_message(),
            "details": details,
        });

        (status, Json(payload)).into_response()
    }
}
