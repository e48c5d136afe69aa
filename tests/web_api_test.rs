//! HTTP surface tests driven through the router with `tower::ServiceExt::oneshot`.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common::{repository_with, UnavailableStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use titan_logistics::persistence::InMemoryBookingRepository;
use titan_logistics::services::StatusTransitionService;
use titan_logistics::web::{self, AppState, IdentitySource, JwtAuthenticator};
use tower::ServiceExt;

const SECRET: &str = "web-test-secret";

fn app(repository: &InMemoryBookingRepository) -> Router {
    web::router(
        AppState::from_repository(repository.clone()),
        IdentitySource::bearer_token(SECRET),
    )
}

fn token_for(secret: &str, role: &str) -> String {
    JwtAuthenticator::from_secret(secret)
        .generate_token(11, role, Duration::from_secs(3600))
        .unwrap()
}

fn patch_status(id: &str, role: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::PATCH)
        .uri(format!("/bookings/{id}/status"))
        .header("content-type", "application/json");
    if let Some(role) = role {
        builder = builder.header(
            "authorization",
            format!("Bearer {}", token_for(SECRET, role)),
        );
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_history(id: &str, role: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/bookings/{id}/history"))
        .header(
            "authorization",
            format!("Bearer {}", token_for(SECRET, role)),
        )
        .body(Body::empty())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let repository = repository_with(&[]);
    // No token: the health check stays public
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(app(&repository), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_update_status_success() {
    let repository = repository_with(&[(5, Some("CONFIRMED"))]);

    let (status, body) = send(
        app(&repository),
        patch_status("5", Some("OPERATIONS"), json!({"status": "in-transit"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"id": 5, "from": "CONFIRMED", "to": "IN_TRANSIT", "changed": true})
    );
    let records = repository.audit_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].performed_by, Some(11));
}

#[tokio::test]
async fn test_next_status_alias_and_reason() {
    let repository = repository_with(&[(5, Some("ARRIVED"))]);

    let (status, body) = send(
        app(&repository),
        patch_status(
            "5",
            Some("administrator"),
            json!({"nextStatus": "delivered", "reason": "signed by recipient"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["to"], json!("DELIVERED"));
    let metadata = repository.audit_records()[0].status_change_metadata().unwrap();
    assert_eq!(metadata.reason.as_deref(), Some("signed by recipient"));
}

#[tokio::test]
async fn test_idempotent_request_reports_unchanged() {
    let repository = repository_with(&[(5, Some("CONFIRMED"))]);

    let (status, body) = send(
        app(&repository),
        patch_status("5", Some("ADMIN"), json!({"status": "CONFIRMED"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], json!(false));
    assert!(repository.audit_records().is_empty());
}

#[tokio::test]
async fn test_authorization() {
    let repository = repository_with(&[(5, Some("CREATED"))]);

    let (status, body) = send(
        app(&repository),
        patch_status("5", None, json!({"status": "CONFIRMED"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!("AUTHENTICATION_FAILED"));

    let (status, body) = send(
        app(&repository),
        patch_status("5", Some("CLIENT"), json!({"status": "CONFIRMED"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], json!("FORBIDDEN"));

    assert_eq!(repository.stored_status(5), Some(Some("CREATED".to_string())));
}

#[tokio::test]
async fn test_client_errors() {
    let repository = repository_with(&[(5, Some("CREATED"))]);

    let cases = [
        ("abc", json!({"status": "CONFIRMED"}), StatusCode::BAD_REQUEST, "INVALID_ID"),
        ("5", json!({"reason": "none"}), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        ("5", json!({"status": "flying"}), StatusCode::BAD_REQUEST, "INVALID_STATUS"),
        ("5", json!({"status": "ARRIVED"}), StatusCode::BAD_REQUEST, "INVALID_TRANSITION"),
        ("404", json!({"status": "CONFIRMED"}), StatusCode::NOT_FOUND, "BOOKING_NOT_FOUND"),
    ];

    for (id, body, expected_status, expected_code) in cases {
        let (status, response) =
            send(app(&repository), patch_status(id, Some("ADMIN"), body)).await;
        assert_eq!(status, expected_status, "{id} {response}");
        assert_eq!(response["code"], json!(expected_code));
        assert!(response["error"].is_string());
    }
}

#[tokio::test]
async fn test_missing_status_message() {
    let repository = repository_with(&[(5, Some("CREATED"))]);

    let (status, body) = send(
        app(&repository),
        patch_status("5", Some("ADMIN"), json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("status is required"));
}

#[tokio::test]
async fn test_storage_failure_hides_details() {
    let service = StatusTransitionService::new(
        Arc::new(UnavailableStore),
        Arc::new(InMemoryBookingRepository::new()),
    );
    let app = web::router(
        AppState::new(Arc::new(service)),
        IdentitySource::bearer_token(SECRET),
    );

    let (status, body) = send(
        app,
        patch_status("5", Some("ADMIN"), json!({"status": "CONFIRMED"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "Internal server error", "code": "STORAGE_ERROR"})
    );
}

#[tokio::test]
async fn test_history_is_ordered_oldest_first() {
    let repository = repository_with(&[(8, Some("CREATED"))]);

    for target in ["CONFIRMED", "IN_TRANSIT"] {
        let (status, _) = send(
            app(&repository),
            patch_status("8", Some("OPERATIONS"), json!({"status": target})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(app(&repository), get_history("8", "OPERATIONS")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookingId"], json!(8));
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["metadata"]["to"], json!("CONFIRMED"));
    assert_eq!(history[1]["metadata"]["to"], json!("IN_TRANSIT"));
    assert_eq!(history[0]["entityType"], json!("BOOKING"));
    assert_eq!(history[0]["performedBy"], json!(11));
}

#[tokio::test]
async fn test_history_requires_manager_role() {
    let repository = repository_with(&[(8, Some("CREATED"))]);

    let (status, _) = send(app(&repository), get_history("8", "USER")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(app(&repository), get_history("0", "ADMIN")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("INVALID_ID"));
}

#[tokio::test]
async fn test_bearer_token_is_required() {
    let repository = repository_with(&[(5, Some("CREATED"))]);

    let malformed = Request::builder()
        .method(Method::PATCH)
        .uri("/bookings/5/status")
        .header("content-type", "application/json")
        .header("authorization", "Token abc")
        .body(Body::from(json!({"status": "CONFIRMED"}).to_string()))
        .unwrap();
    let (status, body) = send(app(&repository), malformed).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Authorization header missing or malformed"));

    let history = Request::builder()
        .uri("/bookings/5/history")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(&repository), history).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_another_secret_is_rejected() {
    let repository = repository_with(&[(5, Some("CREATED"))]);
    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/bookings/5/status")
        .header("content-type", "application/json")
        .header(
            "authorization",
            format!("Bearer {}", token_for("some-other-secret", "ADMIN")),
        )
        .body(Body::from(json!({"status": "CONFIRMED"}).to_string()))
        .unwrap();

    let (status, body) = send(app(&repository), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!("AUTHENTICATION_FAILED"));
    assert_eq!(body["error"], json!("Invalid or expired token"));
    assert_eq!(repository.stored_status(5), Some(Some("CREATED".to_string())));
}

#[tokio::test]
async fn test_operations_token_is_accepted() {
    let repository = repository_with(&[(5, Some("CREATED"))]);

    let (status, body) = send(
        app(&repository),
        patch_status("5", Some("OPERATIONS"), json!({"status": "CONFIRMED"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["to"], json!("CONFIRMED"));
}

#[tokio::test]
async fn test_gateway_headers_are_ignored_without_opt_in() {
    let repository = repository_with(&[(5, Some("CREATED"))]);
    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/bookings/5/status")
        .header("content-type", "application/json")
        .header("x-user-id", "999")
        .header("x-user-role", "ADMIN")
        .body(Body::from(json!({"status": "CONFIRMED"}).to_string()))
        .unwrap();

    let (status, _) = send(app(&repository), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(repository.stored_status(5), Some(Some("CREATED".to_string())));
    assert!(repository.audit_records().is_empty());
}

#[tokio::test]
async fn test_gateway_headers_when_trusted() {
    let repository = repository_with(&[(5, Some("CREATED"))]);
    let app = web::router(
        AppState::from_repository(repository.clone()),
        IdentitySource::GatewayHeaders,
    );
    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/bookings/5/status")
        .header("content-type", "application/json")
        .header("x-user-id", "21")
        .header("x-user-role", "OPERATIONS")
        .body(Body::from(json!({"status": "CONFIRMED"}).to_string()))
        .unwrap();

    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(repository.audit_records()[0].performed_by, Some(21));
}

#[tokio::test]
async fn test_unknown_role_is_forbidden() {
    let repository = repository_with(&[(5, Some("CREATED"))]);

    let (status, body) = send(
        app(&repository),
        patch_status("5", Some("DRIVER"), json!({"status": "CONFIRMED"})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], json!("FORBIDDEN"));
}

#[tokio::test]
async fn test_missing_status_reported_before_bad_id() {
    let repository = repository_with(&[]);

    let (status, body) = send(
        app(&repository),
        patch_status("abc", Some("ADMIN"), json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("status is required"));
}
