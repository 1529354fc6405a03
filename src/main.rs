use petora_api::{startup, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET, etc. can live there
    let _ = dotenvy::dotenv();

    startup::init_logging();

    let config = AppConfig::from_env();
    tracing::info!("Starting Petora API in {:?} mode", config.environment);

    startup::run(config).await
}
