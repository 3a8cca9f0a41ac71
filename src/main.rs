use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use userdemo::{
    config::{AppConfig, LogMode, LoggingConfig, DEFAULT_CONFIG_PATH},
    db, server, AppState,
};

#[derive(Parser)]
#[command(name = "userdemo")]
#[command(about = "User CRUD service with JWT authentication", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        logging
            .filter
            .clone()
            .unwrap_or_else(|| "userdemo=debug,tower_http=debug".to_string())
            .into()
    });

    match logging.mode {
        LogMode::Stdout => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogMode::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init(),
        LogMode::Nil => {}
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = AppConfig::load(&args.config)?;

    init_tracing(&config.logging);

    // Database connection
    let pool = db::create_pool(&config.database)
        .await
        .with_context(|| format!("cannot open database {}", config.database.url))?;

    // Run migrations
    db::run_migrations(&pool).await?;

    let app_state = AppState::new(pool.clone(), &config)?;

    if let Some(bootstrap) = &config.bootstrap {
        server::seed_bootstrap_user(&app_state, bootstrap).await?;
    }

    let app = server::router(app_state);

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(version = %config.version, "Server running on http://{}", addr);

    server::serve(listener, app).await?;

    pool.close().await;
    tracing::info!("database closed, graceful shutdown complete");

    Ok(())
}
