// 認証ミドルウェア実装

use crate::common::auth::{Claims, UserRole};
use crate::common::error::BankError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::error::AppError;

/// JWT認証ミドルウェア
///
/// Authorizationヘッダーから "Bearer {token}" を抽出してJWT検証を行う。
/// 成功時は検証済み`Claims`をrequestの拡張データに格納し、
/// 下流ハンドラーが型付きで参照できるようにする。
///
/// # Arguments
/// * `State(jwt_secret)` - JWT署名検証用のシークレットキー
/// * `request` - HTTPリクエスト
/// * `next` - 次のミドルウェア/ハンドラー
///
/// # Returns
/// * `Ok(Response)` - 認証成功、requestにClaimsを追加
/// * `Err(Response)` - 認証失敗、401 Unauthorized
pub async fn jwt_auth(
    State(jwt_secret): State<String>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            AppError(BankError::Authentication(
                "Authentication required".to_string(),
            ))
            .into_response()
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError(BankError::Authentication(
            "Authorization header should be 'Bearer <token>'".to_string(),
        ))
        .into_response()
    })?;

    // JWTを検証（署名不正と期限切れはメッセージで区別、どちらも401）
    let claims = crate::auth::jwt::verify_token(token, &jwt_secret).map_err(|e| {
        tracing::warn!("JWT verification failed: {}", e);
        AppError(e).into_response()
    })?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// 管理者ロールを要求するミドルウェア
///
/// `jwt_auth`の後段に配置し、注入済みClaimsのロールを検査する。
///
/// # Returns
/// * `Ok(Response)` - 管理者として認可
/// * `Err(Response)` - 403 Forbidden
pub async fn require_admin(request: Request, next: Next) -> Result<Response, Response> {
    let claims = request.extensions().get::<Claims>().ok_or_else(|| {
        AppError(BankError::Authentication(
            "Authentication required".to_string(),
        ))
        .into_response()
    })?;

    if claims.role != UserRole::Admin {
        return Err(AppError(BankError::Authorization(
            "Admin access required".to_string(),
        ))
        .into_response());
    }

    Ok(next.run(request).await)
}
