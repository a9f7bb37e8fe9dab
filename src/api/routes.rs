//! API Route Definitions
//!
//! All endpoints live under `/v1`. The RouterBuilder enables endpoint groups
//! selectively, so a deployment can expose only the directory it serves.

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, MethodRouter},
    Router,
};

use super::{
    handlers::*,
    middleware::{auth_middleware, require_roles},
    user_handlers::{login_user, register_user, user_details},
};
use crate::{models::Role, service::CredentialService};

/// Roles allowed to register a clinic
pub const CLINIC_REGISTRATION_ROLES: &[Role] = &[Role::ClinicOwner];

/// Roles allowed to query owner details
pub const OWNER_DETAILS_ROLES: &[Role] = &[Role::Admin, Role::ClinicOwner];

/// Builder for creating API routes with configurable endpoint groups
#[derive(Default)]
pub struct RouterBuilder {
    /// GET /v1/healthcheck
    health_check: bool,
    /// Owner registration, login and details
    owner_routes: bool,
    /// Clinic registration and search
    clinic_routes: bool,
    /// Doctor registration, login and search
    doctor_routes: bool,
    /// Patient-facing user registration, login and profile
    user_routes: bool,
}

impl RouterBuilder {
    /// Creates a new router builder with all routes disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router builder with every endpoint group enabled
    pub fn with_all_routes() -> Self {
        Self {
            health_check: true,
            owner_routes: true,
            clinic_routes: true,
            doctor_routes: true,
            user_routes: true,
        }
    }

    /// Clinic directory only: owners, clinics and doctors, without the
    /// patient-facing user endpoints
    pub fn with_directory_routes() -> Self {
        Self {
            health_check: true,
            owner_routes: true,
            clinic_routes: true,
            doctor_routes: true,
            user_routes: false,
        }
    }

    /// Health check only, for monitoring deployments
    pub fn with_minimal_routes() -> Self {
        Self {
            health_check: true,
            ..Self::default()
        }
    }

    pub fn health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }

    pub fn owner_routes(mut self, enabled: bool) -> Self {
        self.owner_routes = enabled;
        self
    }

    pub fn clinic_routes(mut self, enabled: bool) -> Self {
        self.clinic_routes = enabled;
        self
    }

    pub fn doctor_routes(mut self, enabled: bool) -> Self {
        self.doctor_routes = enabled;
        self
    }

    pub fn user_routes(mut self, enabled: bool) -> Self {
        self.user_routes = enabled;
        self
    }

    /// Builds the Axum router with the configured routes.
    ///
    /// `credentials` verifies bearer tokens on the protected endpoints.
    pub fn build(self, credentials: Arc<CredentialService>) -> Router<AppState> {
        let mut router = Router::new();

        if self.health_check {
            router = router.route("/healthcheck", get(health_check));
        }

        if self.owner_routes {
            router = router
                .route("/owner/register", post(register_owner))
                .route("/owner/login", post(login_owner))
                .route(
                    "/owner/details",
                    restricted(&credentials, OWNER_DETAILS_ROLES, get(search_owners)),
                );
        }

        if self.clinic_routes {
            router = router
                .route(
                    "/clinic/register",
                    restricted(&credentials, CLINIC_REGISTRATION_ROLES, post(register_clinic)),
                )
                .route(
                    "/clinic/details",
                    authenticated(&credentials, get(search_clinics)),
                );
        }

        if self.doctor_routes {
            router = router
                .route(
                    "/doctor/register",
                    authenticated(&credentials, post(register_doctor)),
                )
                .route("/doctor/login", post(login_doctor))
                .route(
                    "/doctor/details",
                    authenticated(&credentials, get(search_doctors)),
                );
        }

        if self.user_routes {
            router = router
                .route("/user/register", post(register_user))
                .route("/user/login", post(login_user))
                .route(
                    "/user/details",
                    authenticated(&credentials, get(user_details)),
                );
        }

        Router::new().nest("/v1", router)
    }
}

/// Require a valid bearer token on a route
fn authenticated(
    credentials: &Arc<CredentialService>,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    route.layer(from_fn_with_state(credentials.clone(), auth_middleware))
}

/// Require a valid bearer token whose role is in `roles`
fn restricted(
    credentials: &Arc<CredentialService>,
    roles: &'static [Role],
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    // Layers run outermost first, so authentication wraps the role guard.
    authenticated(
        credentials,
        route.layer(from_fn_with_state(roles, require_roles)),
    )
}

/// Creates all API routes
pub fn create_routes(credentials: Arc<CredentialService>) -> Router<AppState> {
    RouterBuilder::with_all_routes().build(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryRepository;
    use crate::service::credentials::test_config;
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::util::ServiceExt;
    use uuid::Uuid;

    fn test_app(builder: RouterBuilder) -> (Router, Arc<CredentialService>) {
        let credentials = Arc::new(CredentialService::new(test_config()));
        let state = AppState::new(
            Arc::new(InMemoryRepository::new()),
            credentials.clone(),
            Duration::from_secs(5),
        );
        (builder.build(credentials.clone()).with_state(state), credentials)
    }

    async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Body,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token);
        }

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn post_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        send_raw(app, Method::POST, uri, token, Body::from(body.to_string())).await
    }

    async fn get_json(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        send_raw(app, Method::GET, uri, token, Body::empty()).await
    }

    fn saqlain() -> Value {
        json!({
            "name": "Saqlain",
            "email": "saqlain@gmail.com",
            "password": "Saqlain@123",
            "address": "Soura Srinagar",
            "gender": "Male",
            "mobile": 9797798243_i64
        })
    }

    fn health_first(owner_id: &str) -> Value {
        json!({
            "ownerId": owner_id,
            "clinicDetails": {
                "name": "HealthFirst",
                "address": "Residency Road Srinagar",
                "mobile": 9876543000_i64,
                "pincode": 190011,
                "seasonTimings": [
                    {
                        "name": "Summer",
                        "start": "2025-06-01T09:00:00Z",
                        "end": "2025-06-01T17:00:00Z"
                    }
                ]
            }
        })
    }

    /// Registers and logs in the sample owner, returning the login token
    /// (with its `BEARER ` prefix) and the owner id
    async fn owner_session(app: &Router) -> (String, String) {
        let (status, _) = post_json(app, "/v1/owner/register", None, saqlain()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = post_json(
            app,
            "/v1/owner/login",
            None,
            json!({"email": "saqlain@gmail.com", "password": "Saqlain@123"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"].as_str().unwrap().to_string();

        let (status, body) = get_json(app, "/v1/owner/details", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        let owner_id = body["data"][0]["id"].as_str().unwrap().to_string();

        (token, owner_id)
    }

    #[test]
    fn test_router_builder_new() {
        let builder = RouterBuilder::new();

        assert!(!builder.health_check);
        assert!(!builder.owner_routes);
        assert!(!builder.clinic_routes);
        assert!(!builder.doctor_routes);
        assert!(!builder.user_routes);
    }

    #[test]
    fn test_router_builder_presets() {
        let all = RouterBuilder::with_all_routes();
        assert!(all.health_check && all.owner_routes && all.clinic_routes);
        assert!(all.doctor_routes && all.user_routes);

        let directory = RouterBuilder::with_directory_routes();
        assert!(directory.owner_routes && directory.clinic_routes && directory.doctor_routes);
        assert!(!directory.user_routes);

        let minimal = RouterBuilder::with_minimal_routes();
        assert!(minimal.health_check);
        assert!(!minimal.owner_routes);
        assert!(!minimal.clinic_routes);
        assert!(!minimal.doctor_routes);
        assert!(!minimal.user_routes);
    }

    #[test]
    fn test_router_builder_individual_methods() {
        let builder = RouterBuilder::new()
            .health_check(true)
            .owner_routes(false)
            .clinic_routes(true)
            .doctor_routes(false)
            .user_routes(true);

        assert!(builder.health_check);
        assert!(!builder.owner_routes);
        assert!(builder.clinic_routes);
        assert!(!builder.doctor_routes);
        assert!(builder.user_routes);
    }

    #[tokio::test]
    async fn test_health_check_endpoint() {
        let (app, _) = test_app(RouterBuilder::with_minimal_routes());

        let (status, body) = get_json(&app, "/v1/healthcheck", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["statusCode"], 200);
        assert_eq!(body["data"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_disabled_groups_are_not_routed() {
        let (app, _) = test_app(RouterBuilder::with_minimal_routes());

        let (status, _) = post_json(&app, "/v1/owner/register", None, saqlain()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_owner_registration_and_login() {
        let (app, _) = test_app(RouterBuilder::with_all_routes());

        let (status, body) = post_json(&app, "/v1/owner/register", None, saqlain()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Owner Registered Successfully");
        assert_eq!(body["statusCode"], 201);
        assert!(body["data"].is_null());

        let (status, body) = post_json(&app, "/v1/owner/register", None, saqlain()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reason"], "Duplicate Email or PhoneNumber");

        let (status, body) = post_json(
            &app,
            "/v1/owner/login",
            None,
            json!({"email": "saqlain@gmail.com", "password": "Saqlain@123"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login Successful");
        assert!(body["data"].as_str().unwrap().starts_with("BEARER "));
    }

    #[tokio::test]
    async fn test_owner_login_failures() {
        let (app, _) = test_app(RouterBuilder::with_all_routes());
        post_json(&app, "/v1/owner/register", None, saqlain()).await;

        let (status, body) = post_json(
            &app,
            "/v1/owner/login",
            None,
            json!({"email": "saqlain@gmail.com", "password": "Wrong@1234"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["reason"], "Invalid Email or Password");

        let (status, body) = post_json(
            &app,
            "/v1/owner/login",
            None,
            json!({"email": "nobody@gmail.com", "password": "Saqlain@123"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Owner Not Found");
    }

    #[tokio::test]
    async fn test_login_does_not_apply_registration_rules() {
        let (app, _) = test_app(RouterBuilder::with_all_routes());
        post_json(&app, "/v1/owner/register", None, saqlain()).await;

        let (status, body) = post_json(
            &app,
            "/v1/owner/login",
            None,
            json!({"email": "saqlain@gmail.com", "password": "wrongpassword"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["reason"], "Invalid Email or Password");
        assert!(body["errorObj"].is_null());

        for (uri, message) in [
            ("/v1/owner/login", "Owner Not Found"),
            ("/v1/doctor/login", "Doctor Not Found"),
        ] {
            let (status, body) = post_json(
                &app,
                uri,
                None,
                json!({"email": "nobody@host", "password": "short"}),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(body["message"], message);
            assert_eq!(body["reason"], "Invalid Email or Password");
        }
    }

    #[tokio::test]
    async fn test_validation_failure_reports_fields() {
        let (app, _) = test_app(RouterBuilder::with_all_routes());

        let (status, body) = post_json(
            &app,
            "/v1/owner/register",
            None,
            json!({"name": "Saqlain", "email": "not-an-email"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation Failed");
        assert!(body["errorObj"]["email"].is_string());
        assert!(body["errorObj"]["password"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let (app, _) = test_app(RouterBuilder::with_all_routes());

        let (status, body) = send_raw(
            &app,
            Method::POST,
            "/v1/owner/register",
            None,
            Body::from("{\"name\": \"Saqlain\","),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reason"], "Invalid JSON");
    }

    #[tokio::test]
    async fn test_clinic_registration_links_owner() {
        let (app, _) = test_app(RouterBuilder::with_all_routes());
        let (token, owner_id) = owner_session(&app).await;

        let (status, body) =
            post_json(&app, "/v1/clinic/register", Some(&token), health_first(&owner_id)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Clinic Registered Successfully");
        let clinic_id = body["data"]["clinicId"].as_str().unwrap().to_string();

        let (status, body) = get_json(&app, "/v1/owner/details", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["clinicId"], clinic_id.as_str());
        assert_eq!(body["data"][0]["clinicDetails"]["name"], "HealthFirst");

        let uri = format!("/v1/clinic/details?id={}", clinic_id);
        let (status, body) = get_json(&app, &uri, Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["ownerDetails"]["email"], "saqlain@gmail.com");

        let (status, _) =
            post_json(&app, "/v1/clinic/register", Some(&token), health_first(&owner_id)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_clinic_registration_requires_token() {
        let (app, _) = test_app(RouterBuilder::with_all_routes());

        let (status, body) = post_json(
            &app,
            "/v1/clinic/register",
            None,
            health_first(&Uuid::new_v4().to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["statusCode"], 401);
    }

    #[tokio::test]
    async fn test_clinic_registration_for_unknown_owner() {
        let (app, credentials) = test_app(RouterBuilder::with_all_routes());
        let owner_id = Uuid::new_v4();
        let token = credentials
            .issue_token(owner_id, Role::ClinicOwner)
            .unwrap();
        let header = format!("Bearer {}", token);

        let (status, body) = post_json(
            &app,
            "/v1/clinic/register",
            Some(&header),
            health_first(&owner_id.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Owner Not Found");
    }

    #[tokio::test]
    async fn test_role_guard_on_owner_details() {
        let (app, credentials) = test_app(RouterBuilder::with_all_routes());
        let token = credentials.issue_token(Uuid::new_v4(), Role::Doctor).unwrap();
        let header = format!("Bearer {}", token);

        let (status, body) = get_json(&app, "/v1/owner/details", Some(&header)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["reason"], "Forbidden To Access This Api");
    }

    #[tokio::test]
    async fn test_doctor_registration_and_search() {
        let (app, _) = test_app(RouterBuilder::with_all_routes());
        let (token, _) = owner_session(&app).await;

        let (status, body) = post_json(
            &app,
            "/v1/doctor/register",
            Some(&token),
            json!({
                "name": "Dr. Mir",
                "qualifications": "MBBS, MD",
                "address": "Hyderpora Srinagar",
                "email": "mir@clinic.com",
                "password": "Doctor@123",
                "workingAt": "SKIMS",
                "mobile": 9797000000_i64
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Doctor Registered Successfully");

        let (status, body) =
            get_json(&app, "/v1/doctor/details?email=mir@clinic.com", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Successfully Fetched Details");
        assert_eq!(body["data"][0]["name"], "Dr. Mir");
        assert!(body["data"][0].get("password").is_none());

        let (status, body) = post_json(
            &app,
            "/v1/doctor/login",
            None,
            json!({"email": "mir@clinic.com", "password": "Doctor@123"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].as_str().unwrap().starts_with("BEARER "));
    }

    #[tokio::test]
    async fn test_malformed_id_filter_is_bad_request() {
        let (app, credentials) = test_app(RouterBuilder::with_all_routes());
        let token = credentials.issue_token(Uuid::new_v4(), Role::User).unwrap();
        let header = format!("Bearer {}", token);

        let (status, _) = get_json(
            &app,
            "/v1/doctor/details?id=64b7f0c2e4b0a1a2b3c4d5e6",
            Some(&header),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(&app, "/v1/clinic/details?password=x", Some(&header)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_user_flow() {
        let (app, _) = test_app(RouterBuilder::with_all_routes());
        let patient = json!({
            "name": "Saqlain",
            "email": "protonium789@gmail.com",
            "password": "Saqlain@123",
            "address": "Soura srinagar",
            "age": 23,
            "mobile": 9797798243_i64,
            "pincode": 190011
        });

        let (status, body) = post_json(&app, "/v1/user/register", None, patient).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User Registered Successfully");

        let (status, body) = post_json(
            &app,
            "/v1/user/login",
            None,
            json!({"email": "protonium789@gmail.com", "password": "Saqlain@123"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"].as_str().unwrap().to_string();

        let (status, body) = get_json(&app, "/v1/user/details", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Fetched Successfully");
        assert_eq!(body["data"]["email"], "protonium789@gmail.com");

        let (status, _) = get_json(&app, "/v1/user/details", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
