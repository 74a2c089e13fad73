use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod config;
pub mod db;
pub mod form;
pub mod generator;
pub mod pending;
pub mod receipt;
pub mod session;
pub mod state;

pub use crate::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn forbidden(message: &str) -> Self {
        Self::new("Forbidden", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::form::handlers::view_tax_receipt,
        crate::form::handlers::confirm_tax_receipt
    ),
    components(
        schemas(
            receipt::ReceiptView,
            receipt::Receipt,
            receipt::ReceiptContribution,
            receipt::DeliveryMethodKind,
            form::models::ConfirmIssuanceForm,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Tax Receipts", description = "Issue, re-issue and download contribution tax receipts.")
    )
)]
pub struct ApiDoc;

/// Wire the receipting flow to its PostgreSQL, generator and file-store collaborators.
async fn build_state(config: &config::AppConfig) -> anyhow::Result<AppState> {
    let store = Arc::new(
        db::PgReceiptStore::connect(&config.database_url, config.max_db_connections).await?,
    );

    let http_client = reqwest::Client::builder()
        .pool_idle_timeout(std::time::Duration::from_secs(900))
        .user_agent("tax-receipt-server/1.0")
        .build()?;
    let generator = Arc::new(generator::HttpReceiptGenerator::new(
        http_client,
        &config.generator_url,
    ));

    let files = Arc::new(pending::PendingFileStore::open(&config.pending_dir).await?);
    let purge_store = files.clone();
    let (interval, max_age) = (config.purge_interval, config.pending_max_age);
    tokio::spawn(async move {
        pending::purge::start_purge_worker(purge_store, interval, max_age).await;
    });

    let flow = receipt::ReceiptIssuanceFlow::new(
        receipt::Collaborators {
            permissions: Arc::new(auth::ClaimsPermissionAuthority),
            contributions: store.clone(),
            history: store.clone(),
            receipts: store.clone(),
            delivery: store.clone(),
            eligibility: store,
            generator,
        },
        files,
    );
    let sessions = Arc::new(session::MemorySessionStore::new(config.session_idle));

    Ok(AppState::new(flow, sessions))
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::AppConfig::from_env()?;
    let app_state = match build_state(&config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to start tax receipt service. Check DATABASE_URL and PENDING_FILE_DIR. Error: {}", e);
            return Err(e);
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("tax_receipt_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create Prometheus metrics middleware: {:?}", e))?;

    log::info!(
        "Starting server at http://{}:{}",
        config.bind_address,
        config.port
    );

    let cors_origins = config.cors_origins.clone();
    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .expose_headers(vec![header::CONTENT_DISPOSITION])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(form::config)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
