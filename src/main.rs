use std::sync::Arc;

use tracing::{error, info};

use fastnews::web::AppState;
use fastnews::{
    push, Config, Database, Dispatcher, HttpFeedFetcher, NewsPipeline, Scheduler, WebServer,
};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = fastnews::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        fastnews::logging::init_console_only(&config.logging.level);
    }

    info!("FastNews notifier starting");

    if let Err(e) = run(config).await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> fastnews::Result<()> {
    config.validate()?;

    let db = Arc::new(Database::open(&config.database.path).await?);
    info!("Database opened at {}", config.database.path);

    let fetcher = Arc::new(HttpFeedFetcher::new(&config.feeds)?);
    let sender = push::sender_from_config(&config.push)?;
    let dispatcher = Dispatcher::new(db.clone(), sender);

    let pipeline = Arc::new(NewsPipeline::new(
        db.clone(),
        fetcher,
        dispatcher.clone(),
        config.feeds.max_items_per_source,
    ));

    let scheduler = Scheduler::from_config(&config, pipeline)?;
    let _jobs = scheduler.start();
    info!(
        "Scheduler started in {} ({} topic(s))",
        config.schedule.timezone,
        config.topics.len()
    );

    if config.web.enabled {
        let server = WebServer::new(&config.web, AppState::new(db.clone(), dispatcher))?;
        tokio::select! {
            result = server.run() => result?,
            _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
        }
    } else {
        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received");
    }

    db.close().await;
    info!("FastNews notifier stopped");
    Ok(())
}
