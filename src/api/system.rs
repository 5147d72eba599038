//! システムAPI（ヘルスチェック）

use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

/// ヘルスチェックレスポンス
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 稼働状態（常に"ok"）
    pub status: &'static str,
    /// 応答時刻（RFC 3339）
    pub timestamp: String,
    /// デプロイ環境名
    pub environment: String,
}

/// GET /health - ヘルスチェック
///
/// 認証不要。DBには触れない。
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        environment: state.environment.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_app;
    use crate::db::test_utils::test_db_pool;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_requires_no_auth() {
        let pool = test_db_pool().await;
        let app = create_app(AppState {
            db_pool: pool,
            jwt_secret: "test-secret".to_string(),
            environment: "test".to_string(),
        });

        let res = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["environment"], "test");
        assert!(body["timestamp"].as_str().unwrap().contains('T'));
    }
}
