//! MOTAC Resource Management Server

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use motac_rms_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{provisioning::DirectoryClient, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("motac_rms_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MOTAC RMS Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let provisioner = Arc::new(DirectoryClient::new("motac.gov.my"));
    let services = Services::new(
        repository,
        config.auth.clone(),
        config.import.clone(),
        provisioner,
    );

    services
        .users
        .ensure_bootstrap_admin()
        .await
        .expect("Failed to create bootstrap admin account");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Users
        .route("/users", get(api::users::list_users))
        .route("/users", post(api::users::create_user))
        .route("/users/:id", get(api::users::get_user))
        .route("/users/:id", put(api::users::update_user))
        .route("/users/:id", delete(api::users::delete_user))
        // Grades
        .route("/grades", get(api::grades::list_grades))
        .route("/grades", post(api::grades::create_grade))
        .route("/grades/:id", get(api::grades::get_grade))
        .route("/grades/:id", put(api::grades::update_grade))
        .route("/grades/:id", delete(api::grades::delete_grade))
        // Equipment inventory
        .route("/equipment", get(api::equipment::list_equipment))
        .route("/equipment", post(api::equipment::create_equipment))
        .route("/equipment/:id", get(api::equipment::get_equipment))
        .route("/equipment/:id", put(api::equipment::update_equipment))
        .route("/equipment/:id", delete(api::equipment::delete_equipment))
        // Email applications
        .route(
            "/email-applications",
            get(api::email_applications::list_email_applications),
        )
        .route(
            "/email-applications",
            post(api::email_applications::create_email_application),
        )
        .route(
            "/email-applications/:id",
            get(api::email_applications::get_email_application),
        )
        .route(
            "/email-applications/:id",
            put(api::email_applications::update_email_application),
        )
        .route(
            "/email-applications/:id/submit",
            post(api::email_applications::submit_email_application),
        )
        .route(
            "/email-applications/:id/decision",
            post(api::email_applications::decide_email_application),
        )
        .route(
            "/email-applications/:id/provision",
            post(api::email_applications::provision_email_application),
        )
        // Loan applications
        .route(
            "/loan-applications",
            get(api::loan_applications::list_loan_applications),
        )
        .route(
            "/loan-applications",
            post(api::loan_applications::create_loan_application),
        )
        .route(
            "/loan-applications/:id",
            get(api::loan_applications::get_loan_application),
        )
        .route(
            "/loan-applications/:id",
            put(api::loan_applications::update_loan_application),
        )
        .route(
            "/loan-applications/:id/submit",
            post(api::loan_applications::submit_loan_application),
        )
        .route(
            "/loan-applications/:id/decision",
            post(api::loan_applications::decide_loan_application),
        )
        .route(
            "/loan-applications/:id/issue",
            post(api::loan_applications::issue_loan_application),
        )
        .route(
            "/loan-applications/:id/return",
            post(api::loan_applications::return_loan_application),
        )
        .route(
            "/loan-applications/:id/complete",
            post(api::loan_applications::complete_loan_application),
        )
        // Attendance
        .route("/fingerprints", get(api::fingerprints::list_fingerprints))
        .route("/fingerprints", post(api::fingerprints::create_fingerprint))
        .route(
            "/fingerprints/import",
            post(api::fingerprints::import_fingerprints),
        )
        .route(
            "/fingerprints/export",
            get(api::fingerprints::export_fingerprints),
        )
        .route(
            "/fingerprints/imports",
            get(api::fingerprints::list_import_jobs),
        )
        .route(
            "/fingerprints/imports/:id",
            get(api::fingerprints::get_import_job),
        )
        .route("/fingerprints/:id", get(api::fingerprints::get_fingerprint))
        .route(
            "/fingerprints/:id",
            put(api::fingerprints::update_fingerprint),
        )
        .route(
            "/fingerprints/:id",
            delete(api::fingerprints::delete_fingerprint),
        )
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
