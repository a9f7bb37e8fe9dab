//! Clinic Registry Server
//!
//! Serves every endpoint group against PostgreSQL, with migrations applied at
//! startup. For custom endpoint selections, use the RouterBuilder in your own
//! binary.

use std::sync::Arc;

use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use clinic_registry::{
    api::{AppState, RouterBuilder},
    config::AppConfig,
    database::PgRepository,
    service::CredentialService,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv().ok();

    env_logger::init();

    log::info!("🚀 Starting Clinic Registry v{}", clinic_registry::VERSION);

    // Missing DATABASE_URL, JWT_SECRET or PORT is fatal
    let config = AppConfig::from_env()?;
    config.validate()?;

    log::info!("✅ Configuration loaded and validated");

    let database_pool = config.database.create_pool().await?;

    log::info!("🔄 Running database migrations...");
    sqlx::migrate!("./migrations").run(&database_pool).await?;
    log::info!("✅ Database migrations completed");

    let repository = Arc::new(PgRepository::new(database_pool));
    let credentials = Arc::new(CredentialService::new(config.credential_config()));
    let app_state = AppState::new(
        repository,
        credentials.clone(),
        config.server.request_timeout(),
    );

    log::info!("✅ Services initialized");
    log::info!("   - Token lifetime: {} days", config.jwt.expires_days);
    log::info!("   - Request deadline: {} ms", config.server.request_timeout_ms);

    let app = RouterBuilder::with_all_routes()
        .build(credentials)
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .into_inner(),
        );

    let bind_addr = config.server.bind_addr();

    log::info!("📋 API Endpoints:");
    log::info!("   GET  /v1/healthcheck - Health check");
    log::info!("   POST /v1/owner/register - Register clinic owner");
    log::info!("   POST /v1/owner/login - Owner login");
    log::info!("   GET  /v1/owner/details - Owner details (Admin, ClinicOwner)");
    log::info!("   POST /v1/clinic/register - Register clinic (ClinicOwner)");
    log::info!("   GET  /v1/clinic/details - Search clinics");
    log::info!("   POST /v1/doctor/register - Register doctor");
    log::info!("   POST /v1/doctor/login - Doctor login");
    log::info!("   GET  /v1/doctor/details - Search doctors");
    log::info!("   POST /v1/user/register - Register user");
    log::info!("   POST /v1/user/login - User login");
    log::info!("   GET  /v1/user/details - Caller's user profile");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("🌐 Server listening on {}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
