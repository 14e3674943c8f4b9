use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use steamsync::application::scheduler::{
    BroadcastScheduler, WatchPoller, run_broadcast_scheduler, run_watch_poller,
};
use steamsync::application::usecases::{BroadcastOnceUseCase, PollWatchesUseCase};
use steamsync::application::{
    BroadcastTargetStore, ContentProvider, DeliveryDispatcher, ProfileSource, Transport,
    WatchRegistry,
};
use steamsync::infrastructure::{
    console_transport::ConsoleTransport, sqlite_store::SqliteStore,
    steam_deals_provider::SteamDealsProvider, steam_profile_source::SteamProfileSource,
    telegram_transport::TelegramTransport,
};
use steamsync::interfaces::config::Config;
use steamsync::interfaces::http_api::{ApiState, build_router};

#[derive(Parser, Debug)]
#[command(name = "steamsync")]
struct Args {
    /// Path to config.yaml
    #[arg(long, default_value = "config.yaml")]
    config: String,

    /// Run one poll pass and one broadcast tick, then exit
    #[arg(long)]
    once: bool,

    /// Print deliveries to the console instead of sending them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("steamsync=info".parse().unwrap()),
        )
        .init();
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    // 1) load config
    let cfg = match Config::load_from_file(&args.config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load config {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    let Ok(steam_key) = std::env::var("STEAM_API_KEY") else {
        tracing::error!("STEAM_API_KEY not set");
        std::process::exit(1);
    };

    // 2) build infra
    let db_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:steamsync.db".to_string());
    let store = match SqliteStore::new(&db_url).await {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to open store {db_url}: {e}");
            std::process::exit(1);
        }
    };
    let registry: Arc<dyn WatchRegistry> = store.clone();
    let targets: Arc<dyn BroadcastTargetStore> = store;

    let source: Arc<dyn ProfileSource> = Arc::new(SteamProfileSource::new(steam_key));
    let content: Arc<dyn ContentProvider> =
        Arc::new(SteamDealsProvider::new(cfg.broadcast.deals_limit));

    let transport: Arc<dyn Transport> = match (args.dry_run, std::env::var("TELEGRAM_TOKEN")) {
        (false, Ok(token)) => Arc::new(TelegramTransport::new(token)),
        (false, Err(_)) => {
            tracing::warn!("TELEGRAM_TOKEN not set, deliveries go to the console");
            Arc::new(ConsoleTransport::new())
        }
        (true, _) => {
            tracing::warn!("--dry-run enabled: only console output");
            Arc::new(ConsoleTransport::new())
        }
    };
    let dispatcher = DeliveryDispatcher::new(transport, cfg.upstream_timeout());

    // 3) run
    if args.once {
        let poll = PollWatchesUseCase {
            registry: registry.as_ref(),
            source: source.as_ref(),
            dispatcher: &dispatcher,
            lookup_timeout: cfg.upstream_timeout(),
        };
        match poll.execute().await {
            Ok(r) => tracing::info!(?r, "poll pass completed"),
            Err(e) => {
                tracing::error!("poll pass failed: {e}");
                std::process::exit(1);
            }
        }
        let broadcast = BroadcastOnceUseCase {
            targets: targets.as_ref(),
            content: content.as_ref(),
            dispatcher: &dispatcher,
            purposes: &cfg.broadcast.purposes,
        };
        let r = broadcast.execute().await;
        tracing::info!(?r, "broadcast tick completed");
        return;
    }

    let shutdown = CancellationToken::new();

    let poller = tokio::spawn(run_watch_poller(
        WatchPoller {
            registry: registry.clone(),
            source,
            dispatcher: dispatcher.clone(),
            lookup_timeout: cfg.upstream_timeout(),
        },
        cfg.poll_schedule(),
        shutdown.clone(),
    ));
    let broadcaster = tokio::spawn(run_broadcast_scheduler(
        BroadcastScheduler {
            targets: targets.clone(),
            content,
            dispatcher,
            purposes: cfg.broadcast.purposes.clone(),
        },
        cfg.broadcast_schedule(),
        shutdown.clone(),
    ));

    let app = build_router(ApiState {
        registry,
        targets,
        api_token: std::env::var("API_TOKEN").ok(),
    });
    let listener = match tokio::net::TcpListener::bind(&cfg.http.listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {e}", cfg.http.listen);
            std::process::exit(1);
        }
    };
    tracing::info!(listen = %cfg.http.listen, "http api listening");

    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
        }
        tracing::info!("shutdown requested");
        server_shutdown.cancel();
    });

    let serve_shutdown = shutdown.clone();
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(async move { serve_shutdown.cancelled().await })
        .await
    {
        tracing::error!("http server error: {e}");
        shutdown.cancel();
    }

    let _ = tokio::join!(poller, broadcaster);
    tracing::info!("stopped");
}
