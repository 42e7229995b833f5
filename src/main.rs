use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apptoken_verifier::config::{self, Config, StorageConfig};
use apptoken_verifier::gatekeeper::GatekeeperClient;
use apptoken_verifier::models::app_token::{generate_app_token, StoredAppToken};
use apptoken_verifier::storage::{AppTokenStorage, DiskStore, PgStore};
use apptoken_verifier::{api, AppState};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let cfg = config::load()?;
    init_tracing(&cfg);

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(cli::Commands::AppToken { command }) => {
            let storage = open_storage(&cfg.storage).await?;
            handle_apptoken_command(command, storage.as_ref()).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn init_tracing(cfg: &Config) {
    // Export spans over OTLP only when a collector endpoint is configured.
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::{trace as sdktrace, Resource};

    let telemetry_layer = if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        match opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic())
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", "apptoken-verifier"),
            ])))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
        {
            Ok(tracer) => Some(tracing_opentelemetry::layer().with_tracer(tracer)),
            Err(e) => {
                eprintln!("failed to install OpenTelemetry tracer, continuing without: {}", e);
                None
            }
        }
    } else {
        None
    };

    let json_layer = cfg
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!cfg.json_logs).then(|| tracing_subscriber::fmt::layer());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "apptoken_verifier=debug,tower_http=debug".into()),
        ))
        .with(json_layer)
        .with(text_layer)
        .with(telemetry_layer)
        .init();
}

async fn open_storage(storage: &StorageConfig) -> anyhow::Result<Arc<dyn AppTokenStorage>> {
    match storage {
        StorageConfig::Postgres { database_url } => {
            tracing::info!("Connecting to database...");
            let db = PgStore::connect(database_url)
                .await
                .context("failed to connect to app token database")?;
            db.migrate().await.context("failed to prepare app_tokens table")?;
            Ok(Arc::new(db))
        }
        StorageConfig::Disk { base_path } => {
            tracing::info!("Using app token storage on disk at {}", base_path.display());
            Ok(Arc::new(DiskStore::open(base_path).await?))
        }
    }
}

async fn run_server(cfg: Config, port: u16) -> anyhow::Result<()> {
    let storage = open_storage(&cfg.storage).await?;
    let token_provider = Arc::new(GatekeeperClient::new(&cfg.gatekeeper_url)?);
    tracing::info!("Issuing auth tokens through gatekeeper at {}", cfg.gatekeeper_url);

    let state = Arc::new(AppState {
        storage,
        token_provider,
        public_path_to_system: cfg.public_path_to_system,
    });

    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Apptoken verifier listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn handle_apptoken_command(
    cmd: cli::AppTokenCommands,
    storage: &dyn AppTokenStorage,
) -> anyhow::Result<()> {
    match cmd {
        cli::AppTokenCommands::Add { user_id, note } => {
            let plaintext = generate_app_token();
            let token = StoredAppToken::new(&user_id, &plaintext, note);
            storage.add_app_token(&token).await?;
            println!(
                "App token created:\n  User:  {}\n  ID:    {}\n  Token: {}\n\nThe token is shown only once.",
                token.user_id, token.id, plaintext
            );
        }
        cli::AppTokenCommands::List { user_id } => {
            let tokens = storage.list_app_tokens(&user_id).await?;
            if tokens.is_empty() {
                println!("No app tokens found.");
            } else {
                println!("{:<38} {:<26} {}", "ID", "CREATED", "NOTE");
                for t in tokens {
                    println!(
                        "{:<38} {:<26} {}",
                        t.id,
                        t.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        t.note.unwrap_or_default()
                    );
                }
            }
        }
        cli::AppTokenCommands::Remove { user_id, token_id } => {
            let token_id = uuid::Uuid::parse_str(&token_id).context("Invalid token ID")?;
            if storage.remove_app_token(&user_id, token_id).await? {
                println!("App token removed.");
            } else {
                println!("App token not found.");
            }
        }
    }
    Ok(())
}
