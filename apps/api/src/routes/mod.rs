pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::intake::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Intake API
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/turns", post(handlers::handle_turn))
        .route(
            "/api/v1/sessions/:id/export",
            post(handlers::handle_retry_export),
        )
        .route(
            "/api/v1/sessions/:id/summary",
            get(handlers::handle_download_summary),
        )
        .route("/api/v1/candidates", get(handlers::handle_list_candidates))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::intake::testing::{test_state, ScriptedModel};

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn create_session(router: &Router) -> String {
        let (status, body) = send(router, Method::POST, "/api/v1/sessions", Some(json!({}))).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    async fn say(router: &Router, id: &str, message: &str) -> (StatusCode, Value) {
        send(
            router,
            Method::POST,
            &format!("/api/v1/sessions/{id}/turns"),
            Some(json!({ "message": message })),
        )
        .await
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(Arc::new(ScriptedModel::new()), dir.path()));
        let (status, body) = send(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_full_interview_over_http() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(Arc::new(ScriptedModel::new()), dir.path()));
        let id = create_session(&router).await;

        let (status, body) = say(&router, &id, "hello").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], json!({"state": "collecting_slot", "index": 1}));
        assert_eq!(body["messages"][0]["speaker"], "user");
        assert_eq!(body["messages"][2]["text"], "Can you please tell me your Full Name?");

        say(&router, &id, "Ada Lovelace").await;
        say(&router, &id, "ada@example.com").await;
        let (_, body) = say(&router, &id, "Python + Django").await;
        assert_eq!(body["phase"], json!({"state": "answering_question", "index": 0}));

        let mut last = Value::Null;
        for i in 0..5 {
            let (status, body) = say(&router, &id, &format!("My detailed answer {i}")).await;
            assert_eq!(status, StatusCode::OK);
            last = body;
        }
        assert_eq!(last["ended"], true);
        assert_eq!(last["end_reason"], "completed");
        assert_eq!(last["export"]["status"], "ready");

        let (status, candidates) = send(&router, Method::GET, "/api/v1/candidates", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(candidates[0]["Full Name"], "Ada Lovelace");
        assert_eq!(candidates[0]["Technical Answers"].as_array().unwrap().len(), 5);

        let summary = router
            .clone()
            .oneshot(
                Request::get(format!("/api/v1/sessions/{id}/summary"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(summary.status(), StatusCode::OK);
        assert!(summary.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("attachment;"));

        let (status, body) = say(&router, &id, "one more thing").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_upstream_outage_is_503_and_retryable() {
        let dir = tempfile::tempdir().unwrap();
        let model = ScriptedModel::new().validation_replies(&[None]);
        let router = build_router(test_state(Arc::new(model), dir.path()));
        let id = create_session(&router).await;

        for input in ["hi", "Ada", "ada@example.com"] {
            say(&router, &id, input).await;
        }
        let (status, body) = say(&router, &id, "Rust").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");

        let (status, body) = say(&router, &id, "Rust").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"]["state"], "answering_question");
    }

    #[tokio::test]
    async fn test_session_lifecycle_routes() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(Arc::new(ScriptedModel::new()), dir.path()));
        let id = create_session(&router).await;

        let (status, body) = say(&router, &id, "   ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        say(&router, &id, "hi").await;
        let (status, body) = send(&router, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transcript"].as_array().unwrap().len(), 1);
        assert_eq!(body["export"]["status"], "not_ready");

        let (status, _) = send(&router, Method::POST, &format!("/api/v1/sessions/{id}/export"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&router, Method::DELETE, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = say(&router, &id, "hello?").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_session_without_body_and_with_language() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(Arc::new(ScriptedModel::new()), dir.path()));

        let (status, body) = send(&router, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["phase"]["state"], "not_started");
        assert_eq!(body["language"], Value::Null);

        let (_, body) = send(&router, Method::POST, "/api/v1/sessions", Some(json!({"language": "es"}))).await;
        assert_eq!(body["language"], "es");

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/sessions",
            Some(json!({"language": "{text} and more"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
