//! Authentication Middleware
//!
//! Bearer token authentication and role guards for API endpoints.

use crate::models::{AuthContext, Role};
use crate::service::CredentialService;
use crate::utils::error::AppError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Extension type for storing the authenticated caller in request extensions
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthContext);

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively and surrounding whitespace is
/// ignored, so both `Bearer <token>` and the `BEARER <token>` login output
/// are accepted.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;

    if !scheme.eq_ignore_ascii_case("bearer") || parts.next().is_some() {
        return None;
    }

    Some(token)
}

/// Authentication middleware that verifies the bearer token and stores the
/// caller context for handlers and role guards.
///
/// Fails with 401 when the header is missing, malformed, or carries an
/// invalid or expired token.
pub async fn auth_middleware(
    State(credentials): State<Arc<CredentialService>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing Authorization header".into()))?;

    let token = extract_bearer_token(auth_header).ok_or_else(|| {
        AppError::Authentication("Invalid Authorization header format".into())
    })?;

    let context = credentials.verify_token(token).map_err(|e| {
        log::debug!("Rejected access token: {}", e);
        AppError::Authentication("Invalid or expired token".into())
    })?;

    request.extensions_mut().insert(AuthUser(context));

    Ok(next.run(request).await)
}

/// Role guard. Must run after [`auth_middleware`].
///
/// Responds 403 when the caller's role is not in `allowed`.
pub async fn require_roles(
    State(allowed): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let role = extract_auth_user(&request)?.role;

    if !allowed.contains(&role) {
        log::warn!("Role {} denied access to {}", role, request.uri().path());
        return Err(AppError::Forbidden("Forbidden To Access This Api".into()));
    }

    Ok(next.run(request).await)
}

/// Helper function to extract the authenticated caller from request extensions
///
/// The auth_middleware must be applied to the route for this to work.
pub fn extract_auth_user(request: &Request) -> Result<&AuthContext, AppError> {
    request
        .extensions()
        .get::<AuthUser>()
        .map(|auth_user| &auth_user.0)
        .ok_or_else(|| {
            AppError::Authentication("Caller context not found in request extensions".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::credentials::test_config;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        middleware::{from_fn_with_state, Next},
        routing::get,
        Router,
    };
    use tower::util::ServiceExt;
    use uuid::Uuid;

    const OWNERS_ONLY: &[Role] = &[Role::Admin, Role::ClinicOwner];

    fn create_test_credentials() -> Arc<CredentialService> {
        Arc::new(CredentialService::new(test_config()))
    }

    async fn test_handler() -> &'static str {
        "OK"
    }

    fn guarded_app(credentials: Arc<CredentialService>) -> Router {
        Router::new()
            .route("/test", get(test_handler))
            .layer(from_fn_with_state(OWNERS_ONLY, require_roles))
            .layer(from_fn_with_state(credentials, auth_middleware))
    }

    fn get_request(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::GET).uri("/test");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("BEARER abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("  bearer   abc.def  "), Some("abc.def"));
        assert_eq!(extract_bearer_token("Basic abc.def"), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
        assert_eq!(extract_bearer_token("Bearer a b"), None);
        assert_eq!(extract_bearer_token(""), None);
    }

    #[tokio::test]
    async fn test_auth_middleware_missing_header() {
        let app = Router::new()
            .route("/test", get(test_handler))
            .layer(from_fn_with_state(create_test_credentials(), auth_middleware));

        let response = app.oneshot(get_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_middleware_invalid_format() {
        let app = Router::new()
            .route("/test", get(test_handler))
            .layer(from_fn_with_state(create_test_credentials(), auth_middleware));

        let response = app
            .oneshot(get_request(Some("Invalid token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_middleware_invalid_token() {
        let app = Router::new()
            .route("/test", get(test_handler))
            .layer(from_fn_with_state(create_test_credentials(), auth_middleware));

        let response = app
            .oneshot(get_request(Some("Bearer not.a.token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_middleware_inserts_context() {
        let credentials = create_test_credentials();
        let subject = Uuid::new_v4();
        let token = credentials.issue_token(subject, Role::Doctor).unwrap();

        async fn echo_subject(request: Request<Body>, next: Next) -> Result<Response, AppError> {
            let role = extract_auth_user(&request)?.role;
            assert_eq!(role, Role::Doctor);
            Ok(next.run(request).await)
        }

        let app = Router::new()
            .route("/test", get(test_handler))
            .layer(axum::middleware::from_fn(echo_subject))
            .layer(from_fn_with_state(credentials, auth_middleware));

        let header = format!("BEARER {}", token);
        let response = app.oneshot(get_request(Some(&header))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_role_guard_allows_listed_roles() {
        let credentials = create_test_credentials();
        let token = credentials
            .issue_token(Uuid::new_v4(), Role::ClinicOwner)
            .unwrap();

        let header = format!("Bearer {}", token);
        let response = guarded_app(credentials)
            .oneshot(get_request(Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_role_guard_rejects_other_roles() {
        let credentials = create_test_credentials();
        let token = credentials.issue_token(Uuid::new_v4(), Role::User).unwrap();

        let header = format!("Bearer {}", token);
        let response = guarded_app(credentials)
            .oneshot(get_request(Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_extract_auth_user_missing() {
        let request = get_request(None);
        assert!(extract_auth_user(&request).is_err());
    }
}
