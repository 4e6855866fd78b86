//! Integration tests for rate limiting middleware.
//!
//! These tests verify the HTTP-level behavior of rate limiting,
//! including 429 responses and proper integration with the middleware stack.
//!
//! This test requires the `sqlite` feature flag.

#![cfg(feature = "sqlite")]

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode},
};
use checkout_hex::{
    CheckoutService,
    inbound::{HttpServer, RateLimiterState},
};
use checkout_repo::SqliteRepo;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Helper to create a test server with a very low rate limit.
async fn create_test_server(requests_per_minute: u32) -> HttpServer<SqliteRepo> {
    // Use in-memory SQLite for tests
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let service = CheckoutService::new(repo);
    HttpServer::with_rate_limit(service, requests_per_minute)
}

/// Helper to make a health check request.
fn health_request() -> Request<Body> {
    Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap()
}

/// Helper to bootstrap and get API key.
fn bootstrap_request() -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/bootstrap")
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"name": "test-key"}"#))
        .unwrap()
}

/// Helper to make an authenticated admin request.
fn admin_request(api_key: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/transactions")
        .header("Authorization", format!("Bearer {}", api_key))
        .body(Body::empty())
        .unwrap()
}

/// Helper to make an anonymous checkout request from a given peer address.
fn checkout_request(peer: &str) -> Request<Body> {
    let addr: SocketAddr = peer.parse().unwrap();
    Request::builder()
        .uri("/api/payment-methods")
        .extension(ConnectInfo(addr))
        .body(Body::empty())
        .unwrap()
}

/// Same peer, claiming to forward for someone else.
fn forwarded_request(peer: &str, claimed: &str) -> Request<Body> {
    let addr: SocketAddr = peer.parse().unwrap();
    Request::builder()
        .uri("/api/payment-methods")
        .header("X-Forwarded-For", claimed)
        .extension(ConnectInfo(addr))
        .body(Body::empty())
        .unwrap()
}

/// Helper to bootstrap and extract API key from response.
async fn bootstrap_api_key(app: axum::Router) -> String {
    let response = app.oneshot(bootstrap_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    json["apiKey"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_rate_limiting_returns_429_when_exceeded() {
    // Bootstrap uses the "anonymous" bucket, so the key gets its full quota of 3
    let server = create_test_server(3).await;
    let app = server.router();

    let api_key = bootstrap_api_key(app.clone()).await;

    for i in 1..=3 {
        let response = app.clone().oneshot(admin_request(&api_key)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::OK,
            "Request {} should not be rate limited (quota not yet exceeded)",
            i
        );
    }

    // 4th request should be rate limited
    let response = app.clone().oneshot(admin_request(&api_key)).await.unwrap();

    assert_eq!(
        response.status(),
        StatusCode::TOO_MANY_REQUESTS,
        "Request should be rate limited after exceeding quota"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("Rate limit exceeded")
    );
    assert_eq!(json["code"], 429);
    assert_eq!(json["retryAfterSeconds"], 60);
}

#[tokio::test]
async fn test_rate_limiting_health_endpoint_bypassed() {
    let server = create_test_server(1).await;
    let app = server.router();

    // Health endpoint bypasses rate limiting entirely
    for _ in 0..10 {
        let response = app.clone().oneshot(health_request()).await.unwrap();

        assert_eq!(
            response.status(),
            StatusCode::OK,
            "Health endpoint should not be rate limited"
        );
    }
}

#[tokio::test]
async fn test_rate_limiting_per_client_isolation() {
    let server = create_test_server(2).await;
    let app = server.router();

    for _ in 0..2 {
        let response = app.clone().oneshot(checkout_request("10.0.0.1:40000")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.clone().oneshot(checkout_request("10.0.0.1:40000")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Another client still has its own quota
    let response = app.clone().oneshot(checkout_request("10.0.0.2:40000")).await.unwrap();
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "Second client should have its own quota"
    );
}

#[tokio::test]
async fn test_spoofed_forwarded_for_shares_the_peer_quota() {
    let server = create_test_server(2).await;
    let app = server.router();

    for i in 0..2 {
        let claimed = format!("203.0.113.{}", i);
        let response = app
            .clone()
            .oneshot(forwarded_request("10.0.0.1:40000", &claimed))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(forwarded_request("10.0.0.1:40000", "203.0.113.99"))
        .await
        .unwrap();
    assert_eq!(
        response.status(),
        StatusCode::TOO_MANY_REQUESTS,
        "A fresh X-Forwarded-For must not buy a fresh quota"
    );
}

#[tokio::test]
async fn test_trusted_proxy_buckets_by_forwarded_client() {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let server = HttpServer::new(CheckoutService::new(repo))
        .with_rate_limiter(RateLimiterState::per_minute(1).trusting_forwarded_for(true));
    let app = server.router();

    let response = app
        .clone()
        .oneshot(forwarded_request("10.0.0.1:40000", "203.0.113.1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(forwarded_request("10.0.0.1:40000", "203.0.113.2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "Each forwarded client has its own quota");

    let response = app
        .clone()
        .oneshot(forwarded_request("10.0.0.1:40000", "203.0.113.1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_made_up_bearer_does_not_buy_a_fresh_quota() {
    let server = create_test_server(1).await;
    let app = server.router();

    let response = app.clone().oneshot(checkout_request("10.0.0.1:40000")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let addr: SocketAddr = "10.0.0.1:40000".parse().unwrap();
    let request = Request::builder()
        .uri("/api/payment-methods")
        .header("Authorization", "Bearer sk_invented")
        .extension(ConnectInfo(addr))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rate_limiting_response_format() {
    let server = create_test_server(1).await;
    let app = server.router();

    // Bootstrap (uses "anonymous" quota)
    let api_key = bootstrap_api_key(app.clone()).await;

    // Use up the 1-request quota for this API key
    let _ = app.clone().oneshot(admin_request(&api_key)).await;

    let response = app.clone().oneshot(admin_request(&api_key)).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("application/json"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert!(
        json.get("error").is_some(),
        "Response should have 'error' field"
    );
    assert!(
        json.get("retryAfterSeconds").is_some(),
        "Response should have 'retryAfterSeconds' field"
    );
}
