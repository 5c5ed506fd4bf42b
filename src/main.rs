use reddish::config::Config;
use reddish::{AppState, create_app};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reddish=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let host = config.host.clone();
    let port = config.port;

    // Content store, identity provider and session verification
    let state = AppState::from_config(config)?;
    tracing::info!(
        "Content store client ready for dataset {}",
        state.config.sanity_dataset
    );

    // Create application
    let app = create_app(state);

    // Create listener
    let listener = TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Server listening on {}:{}", host, port);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
