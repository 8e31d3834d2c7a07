use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use mentor_match::config::{Settings, StorageBackend};
use mentor_match::core::Ranker;
use mentor_match::routes::{self, AppState};
use mentor_match::services::{
    AppwriteClient, AppwriteCollections, CacheManager, InMemoryMatchRepository,
    InMemoryProfileStore, MatchRepository, PostgresClient, ProfileStore,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(settings: &Settings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match settings.logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.init(),
    }
}

fn startup_error(msg: String) -> std::io::Error {
    error!("{}", msg);
    std::io::Error::new(std::io::ErrorKind::Other, msg)
}

async fn build_stores(
    settings: &Settings,
) -> std::io::Result<(Arc<dyn ProfileStore>, Arc<dyn MatchRepository>)> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; profiles and matches are lost on restart");
            let store = match &settings.storage.seed_path {
                Some(path) => {
                    let store = InMemoryProfileStore::from_seed_file(path)
                        .map_err(|e| startup_error(format!("Failed to load profile seed: {}", e)))?;
                    info!("Loaded {} profiles from {}", store.len().await, path);
                    store
                }
                None => {
                    warn!("No storage.seed_path set; the profile store starts empty");
                    InMemoryProfileStore::new()
                }
            };
            let profiles: Arc<dyn ProfileStore> = Arc::new(store);
            let matches: Arc<dyn MatchRepository> = Arc::new(InMemoryMatchRepository::new());
            Ok((profiles, matches))
        }
        StorageBackend::Appwrite => {
            let appwrite = settings
                .appwrite
                .as_ref()
                .ok_or_else(|| startup_error("Missing [appwrite] configuration".to_string()))?;
            let database = settings
                .database
                .as_ref()
                .ok_or_else(|| startup_error("Missing [database] configuration".to_string()))?;

            let profiles = AppwriteClient::new(
                appwrite.endpoint.clone(),
                appwrite.api_key.clone(),
                appwrite.project_id.clone(),
                appwrite.database_id.clone(),
                AppwriteCollections {
                    user_profiles: settings.collection.user_profiles.clone(),
                },
            )
            .map_err(|e| startup_error(format!("Failed to create Appwrite client: {}", e)))?;

            info!("Appwrite client initialized");

            let postgres = PostgresClient::from_settings(
                &database.url,
                database.max_connections,
                database.min_connections,
                database.acquire_timeout_secs,
                database.idle_timeout_secs,
            )
            .await
            .map_err(|e| startup_error(format!("PostgreSQL connection error: {}", e)))?;

            info!(
                "PostgreSQL client initialized (max: {} connections)",
                database.max_connections.unwrap_or(10)
            );

            let profiles: Arc<dyn ProfileStore> = Arc::new(profiles);
            let matches: Arc<dyn MatchRepository> = Arc::new(postgres);
            Ok((profiles, matches))
        }
    }
}

async fn build_cache(settings: &Settings) -> CacheManager {
    let ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_size = settings.cache.l1_cache_size.unwrap_or(1000);

    match &settings.cache.redis_url {
        Some(url) => match CacheManager::new(url, l1_size, ttl).await {
            Ok(cache) => {
                info!("Cache manager initialized (L1: {} entries, TTL: {}s, Redis)", l1_size, ttl);
                cache
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running with in-process cache only", e);
                CacheManager::l1_only(l1_size, ttl)
            }
        },
        None => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_size, ttl);
            CacheManager::l1_only(l1_size, ttl)
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings);

    info!("Starting Mentor Match service...");

    let weights = settings
        .scoring_weights()
        .map_err(|e| startup_error(format!("Invalid scoring weights: {}", e)))?;

    let (profiles, matches) = build_stores(&settings).await?;
    let cache = Arc::new(build_cache(&settings).await);

    let ranker = Ranker::new(weights);

    info!("Ranker initialized with weights: {:?}", weights);

    let app_state = AppState {
        profiles,
        matches,
        cache,
        ranker,
        matching: settings.matching.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
