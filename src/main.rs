use actix_web::{App, HttpServer, web};
use tracing::info;
use tracing_subscriber::{Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};
mod api;
use crate::api::{
    generation::{GenerationService, handlers::generation_config},
    health::health_config,
    validation,
};
mod config;
mod db;
mod luma;
mod shutdown;
use crate::luma::{LumaClient, LumaConfig};
use crate::shutdown::ShutdownCoordinator;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from environment
    let config::Config {
        database_url,
        luma_api_key,
        luma_api_url,
        host,
        port,
        max_db_connections,
        log_dir,
    } = config::Config::from_env().expect("Failed to load configuration");

    // Create logs directory if it doesn't exist
    std::fs::create_dir_all(&log_dir).expect("Failed to create logs directory");

    // Initialize file-based logging with daily rotation and level separation
    // Log files will be created as: logs/info.2024-12-22.log, logs/error.2024-12-22.log, etc.
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    // Create daily rotating file appenders for each log level
    let info_file = tracing_appender::rolling::daily(&log_dir, "info.log");
    let warn_file = tracing_appender::rolling::daily(&log_dir, "warn.log");
    let error_file = tracing_appender::rolling::daily(&log_dir, "error.log");
    let debug_file = tracing_appender::rolling::daily(&log_dir, "debug.log");

    // Create layers for each log level
    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(info_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let warn_layer = tracing_subscriber::fmt::layer()
        .with_writer(warn_file)
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    let debug_layer = tracing_subscriber::fmt::layer()
        .with_writer(debug_file)
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    // Create console/stdout layer for terminal output
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true);

    // Initialize the subscriber with all layers (including console)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(info_layer)
        .with(warn_layer)
        .with(error_layer)
        .with(debug_layer)
        .init();

    // Get database connection pool
    let pool = db::connection::get_connection(&database_url, max_db_connections)
        .await
        .expect("Failed to connect to database");

    info!("Starting animation-studio application");
    info!("Configuration loaded successfully:");
    info!("  - Generation API: {}", luma_api_url);
    info!("  - Listen address: {}:{}", host, port);
    info!("  - Max database connections: {}", max_db_connections);
    info!("Database connection pool established");

    // Run migrations on startup (auto-migrate when starting server)
    db::migrations::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    info!("Database migrations completed successfully");

    // One shared upstream client; reqwest pools connections internally
    let luma_client = LumaClient::new(LumaConfig {
        api_key: luma_api_key,
        api_url: luma_api_url,
    });

    // Clone pool for HTTP server (original will be used for shutdown)
    let server_pool = pool.clone();

    let server = HttpServer::new(move || {
        // Create GenerationService with database pool and upstream client
        let generation_service = web::Data::new(GenerationService::new(
            server_pool.clone(),
            luma_client.clone(),
        ));

        App::new()
            .app_data(web::Data::new(server_pool.clone())) // Share DB pool across workers
            .app_data(generation_service) // Inject GenerationService
            .app_data(validation::form_config()) // Global form error handling
            .configure(health_config) // Health check endpoints
            .configure(generation_config)
    });

    info!("Server starting on http://{}:{}", host, port);

    // Bind and start the server
    let server = server.bind((host.as_str(), port))?.run();

    // Get server handle for graceful shutdown
    let server_handle = server.handle();

    // Spawn server in background
    let server_task = tokio::spawn(server);

    // Create shutdown coordinator and wait for shutdown signal
    let coordinator = ShutdownCoordinator::new(server_handle, server_task, pool);

    coordinator.wait_for_shutdown().await
}
