//! データ同意API

use crate::common::auth::Claims;
use crate::common::error::BankError;
use crate::common::types::DataConsent;
use crate::AppState;
use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use super::auth::parse_subject;
use super::error::AppError;

/// 同意更新ボディ
///
/// fraudDetectionは受け付けない。常にサーバー側の既存値を引き継ぐ。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentUpdate {
    /// マーケティング情報の利用同意
    pub marketing_offers: Option<bool>,
    /// 資産アドバイスへの利用同意
    pub financial_advice: Option<bool>,
}

/// GET /api/consent - 同意設定の取得
///
/// 行が無ければ全フラグtrueのデフォルトを作成して返す。
pub async fn get_consent(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DataConsent>, AppError> {
    let user_id = parse_subject(&claims)?;

    let consent = match crate::db::consents::find_by_user(&app_state.db_pool, user_id).await? {
        Some(consent) => consent,
        None => crate::db::consents::create_default(&app_state.db_pool, user_id).await?,
    };

    Ok(Json(consent))
}

/// POST /api/consent/update - 同意設定の更新
///
/// # Returns
/// * `200 OK` - 更新後の同意設定
/// * `404 Not Found` - 同意行が未作成
pub async fn update_consent(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(update): Json<ConsentUpdate>,
) -> Result<Json<DataConsent>, AppError> {
    let user_id = parse_subject(&claims)?;

    let existing = crate::db::consents::find_by_user(&app_state.db_pool, user_id)
        .await?
        .ok_or_else(|| BankError::NotFound("Consent settings not found".to_string()))?;

    let updated = crate::db::consents::update(
        &app_state.db_pool,
        user_id,
        // fraud_detectionはリクエストからは決して更新しない
        existing.fraud_detection,
        update.marketing_offers.unwrap_or(existing.marketing_offers),
        update.financial_advice.unwrap_or(existing.financial_advice),
    )
    .await?;

    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_app;
    use crate::auth::jwt;
    use crate::common::auth::UserRole;
    use crate::db::test_utils::{test_db_pool, test_user};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn app_and_token(email: &str) -> (axum::Router, String) {
        let pool = test_db_pool().await;
        let user = test_user(&pool, email).await;
        let app = create_app(AppState {
            db_pool: pool,
            jwt_secret: "test-secret".to_string(),
            environment: "test".to_string(),
        });
        let token =
            jwt::issue_token(&user.id.to_string(), UserRole::Customer, "test-secret").unwrap();
        (app, token)
    }

    fn get_request(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    fn post_request(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_first_read_creates_defaults() {
        let (app, token) = app_and_token("cons1@example.com").await;

        let res = app
            .oneshot(get_request("/api/consent", &token))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = response_json(res).await;
        assert_eq!(body["fraud_detection"], true);
        assert_eq!(body["marketing_offers"], true);
        assert_eq!(body["financial_advice"], true);
    }

    #[tokio::test]
    async fn test_update_before_read_is_not_found() {
        let (app, token) = app_and_token("cons2@example.com").await;

        let res = app
            .oneshot(post_request(
                "/api/consent/update",
                &token,
                serde_json::json!({"marketingOffers": false}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_fraud_detection_cannot_be_disabled() {
        let (app, token) = app_and_token("cons3@example.com").await;

        // 先に行を作成
        app.clone()
            .oneshot(get_request("/api/consent", &token))
            .await
            .unwrap();

        // fraudDetectionを含めても無視される
        let res = app
            .clone()
            .oneshot(post_request(
                "/api/consent/update",
                &token,
                serde_json::json!({"fraudDetection": false, "marketingOffers": false}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = response_json(res).await;
        assert_eq!(body["fraud_detection"], true);
        assert_eq!(body["marketing_offers"], false);
    }

    #[tokio::test]
    async fn test_partial_update_preserves_other_flags() {
        let (app, token) = app_and_token("cons4@example.com").await;

        app.clone()
            .oneshot(get_request("/api/consent", &token))
            .await
            .unwrap();

        app.clone()
            .oneshot(post_request(
                "/api/consent/update",
                &token,
                serde_json::json!({"marketingOffers": false}),
            ))
            .await
            .unwrap();

        let res = app
            .oneshot(post_request(
                "/api/consent/update",
                &token,
                serde_json::json!({"financialAdvice": false}),
            ))
            .await
            .unwrap();
        let body = response_json(res).await;
        assert_eq!(body["marketing_offers"], false);
        assert_eq!(body["financial_advice"], false);
        assert_eq!(body["fraud_detection"], true);
    }
}
