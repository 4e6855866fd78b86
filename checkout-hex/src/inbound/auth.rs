//! Admin gate: API key validation for console-only routes.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use checkout_types::CheckoutRepository;

use super::handlers::{ApiError, AppState};

/// Hash of an admin key the gate has accepted, attached to the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedKey(pub String);

/// Extracts the API key from the Authorization header.
/// Expected format: "Bearer <api_key>" or just "<api_key>"
pub(crate) fn extract_api_key(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?.trim();
    Some(header.strip_prefix("Bearer ").unwrap_or(header))
}

/// Whether a route belongs to the admin console.
///
/// The checkout page itself reads payment methods and gateways and submits
/// transactions anonymously; every write to configuration, the transaction
/// list, and the `/api/admin` pages need an admin key.
pub fn requires_admin(method: &Method, path: &str) -> bool {
    if path.starts_with("/api/admin/") {
        return true;
    }
    if path == "/api/gateways" || path.starts_with("/api/gateways/") {
        return method != Method::GET;
    }
    match path {
        "/api/transactions" => method == Method::GET,
        "/api/payment-methods" => method == Method::POST,
        _ => false,
    }
}

/// Authentication middleware for admin routes.
///
/// 1. Lets public routes through untouched
/// 2. Extracts the API key from the Authorization header
/// 3. Verifies its SHA-256 hash against the active keys
/// 4. Returns 401 Unauthorized if validation fails
pub async fn auth_middleware<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if !requires_admin(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let api_key = match extract_api_key(auth_header) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    match state.service.is_admin(&api_key).await {
        Ok(true) => {
            let key_hash = checkout_repo::security::hash_api_key(&api_key);
            request.extensions_mut().insert(VerifiedKey(key_hash));
            next.run(request).await
        }
        Ok(false) => unauthorized_response("Invalid API key"),
        Err(e) => ApiError(e).into_response(),
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": 401
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_api_key_bearer() {
        assert_eq!(
            extract_api_key(Some("Bearer sk_test_123")),
            Some("sk_test_123")
        );
    }

    #[test]
    fn test_extract_api_key_raw() {
        assert_eq!(extract_api_key(Some("sk_test_123")), Some("sk_test_123"));
    }

    #[test]
    fn test_extract_api_key_none() {
        assert_eq!(extract_api_key(None), None);
    }

    #[test]
    fn test_checkout_routes_are_public() {
        assert!(!requires_admin(&Method::GET, "/health"));
        assert!(!requires_admin(&Method::POST, "/api/bootstrap"));
        assert!(!requires_admin(&Method::GET, "/api/payment-methods"));
        assert!(!requires_admin(&Method::GET, "/api/gateways"));
        assert!(!requires_admin(&Method::GET, "/api/gateways/abc"));
        assert!(!requires_admin(&Method::POST, "/api/transactions"));
    }

    #[test]
    fn test_console_routes_need_admin() {
        assert!(requires_admin(&Method::POST, "/api/gateways"));
        assert!(requires_admin(&Method::PUT, "/api/gateways/abc"));
        assert!(requires_admin(&Method::PATCH, "/api/gateways/abc/status"));
        assert!(requires_admin(&Method::DELETE, "/api/gateways/abc"));
        assert!(requires_admin(&Method::GET, "/api/transactions"));
        assert!(requires_admin(&Method::POST, "/api/payment-methods"));
        assert!(requires_admin(&Method::GET, "/api/admin/customers"));
    }
}
