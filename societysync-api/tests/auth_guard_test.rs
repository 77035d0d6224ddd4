/// Integration tests for the router's authentication and role guards
///
/// These tests exercise the middleware stack end-to-end: bearer token
/// extraction, JWT validation, and the admin role guard. The pool is
/// created lazily and never connected, so every request here must be
/// rejected before any handler touches the database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use societysync_api::{
    app::{build_router, AppState},
    config::{AdminConfig, ApiConfig, Config, DatabaseConfig, JwtConfig},
};
use societysync_shared::{
    auth::jwt::{create_token, Claims, TokenType},
    models::user::Role,
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt as _;
use uuid::Uuid;

const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

fn test_app() -> axum::Router {
    let config = Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://localhost/societysync_test".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
        admin: AdminConfig {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        },
    };

    // Lazy pool: valid handle, no connection attempted until first query
    let db = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy("postgresql://localhost/societysync_test")
        .unwrap();

    build_router(AppState::new(db, config))
}

fn bearer_for(role: Role) -> String {
    let claims = Claims::new(Uuid::new_v4(), role, TokenType::Access);
    format!("Bearer {}", create_token(&claims, JWT_SECRET).unwrap())
}

#[tokio::test]
async fn test_admin_route_requires_auth_header() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/admin/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_bearer_is_bad_request() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/admin/stats")
                .header("authorization", "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/admin/stats")
                .header("authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_rejected_on_protected_route() {
    let app = test_app();

    let claims = Claims::new(Uuid::new_v4(), Role::Admin, TokenType::Refresh);
    let token = create_token(&claims, JWT_SECRET).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/admin/stats")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_owner_cannot_reach_admin_routes() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/admin/stats")
                .header("authorization", bearer_for(Role::Owner))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_tenant_cannot_create_users() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/admin/users")
                .header("authorization", bearer_for(Role::Tenant))
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_tenant_without_owner_rejected() {
    let app = test_app();

    // Validation rejects the missing owner before any database access
    let body = r#"{"name":"New Renter","flat_number":"B202","profile":{"role":"tenant"}}"#;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/admin/users")
                .header("authorization", bearer_for(Role::Admin))
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let details = error["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d["field"] == "owner_id"));
}

#[tokio::test]
async fn test_resident_routes_require_auth() {
    let app = test_app();

    for uri in ["/v1/bills", "/v1/complaints", "/v1/notifications", "/v1/polls"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
