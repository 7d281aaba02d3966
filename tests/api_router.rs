mod common;

use airbnb_serve::{
    api::{create_router, AppState},
    Predictor,
};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn router(csv: &str, labels: &[(usize, &str)]) -> Router {
    let predictor = Predictor::new(Arc::new(common::context(csv, labels)), Some(11));
    create_router(AppState::new(Arc::new(predictor)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn index_and_refresh_render_a_prediction() {
    let app = router("signup_method,age\nfacebook,20\n", &[(0, "NDF"), (1, "US")]);

    for uri in ["/", "/refresh"] {
        let (status, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<pre>"));
        assert!(body.contains("facebook"));
        assert!(body.contains(r#"<span class="label">NDF</span>"#));
    }
}

#[tokio::test]
async fn unknown_class_is_a_server_error() {
    // age 90 makes class 1 win, which has no label.
    let app = router("signup_method,age\nbasic,90\n", &[(0, "NDF")]);

    let (status, body) = get(app, "/refresh").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("UnknownClass"));
}

#[tokio::test]
async fn unseen_category_is_a_server_error() {
    let app = router("signup_method,age\nweibo,30\n", &[(0, "NDF"), (1, "US")]);

    let (status, _) = get(app, "/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn healthz_reports_loaded_artifacts() {
    let app = router(
        "signup_method,age\nbasic,30\nfacebook,40\n",
        &[(0, "NDF"), (1, "US")],
    );

    let (status, body) = get(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["rows"], 2);
    assert_eq!(json["classes"], 2);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = router("signup_method,age\nbasic,30\n", &[(0, "NDF"), (1, "US")]);
    let (status, _) = get(app, "/predict").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
