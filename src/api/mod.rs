//! HTTP APIレイヤー
//!
//! ルーター構築とハンドラー群。公開ルート（signup/login/health）、
//! bearer認証ルート、管理者専用ルートの三層で構成する。

/// 管理者API（監査ログ・訂正キュー）
pub mod admin;

/// 認証API（signup / login / me）
pub mod auth;

/// データ同意API
pub mod consent;

/// AI判定API
pub mod decisions;

/// APIエラーレスポンス型
pub mod error;

/// AIプロファイルAPI
pub mod profile;

/// システムAPI（ヘルスチェック）
pub mod system;

/// ユーザーAPI
pub mod users;

use crate::auth::middleware::{jwt_auth, require_admin};
use crate::AppState;
use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// アプリケーションルーターを構築
///
/// # Arguments
/// * `state` - アプリケーション状態（DBプール、JWTシークレット）
///
/// # Returns
/// 全ルートとレイヤーを組み込んだ`Router`
pub fn create_app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/health", get(system::health));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/api/auth/user", get(users::get_current_user))
        .route("/api/profile", get(profile::get_profiles))
        .route("/api/profile/correct", post(profile::submit_correction))
        .route("/api/consent", get(consent::get_consent))
        .route("/api/consent/update", post(consent::update_consent))
        .route("/api/decisions", get(decisions::get_decisions))
        .layer(middleware::from_fn_with_state(
            state.jwt_secret.clone(),
            jwt_auth,
        ));

    let admin_routes = Router::new()
        .route("/api/admin/audit-log", get(admin::get_audit_log))
        .route("/api/admin/corrections", get(admin::get_corrections))
        .route(
            "/api/admin/corrections/:id/approve",
            post(admin::approve_correction),
        )
        .route(
            "/api/admin/corrections/:id/reject",
            post(admin::reject_correction),
        )
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(
            state.jwt_secret.clone(),
            jwt_auth,
        ));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
