//! bookloan - migrates the library database, seeds it on request and reports on it

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookloan_core::{
    clock::{Clock, SystemClock},
    config::AppConfig,
    repository::{self, Repository},
    seed::Seeder,
    services::Services,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let level = &config.logging.level;
            format!("bookloan_core={level},bookloan={level},sqlx=warn").into()
        });

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting bookloan v{}", env!("CARGO_PKG_VERSION"));

    let pool = repository::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    let repository = Repository::new(pool);
    repository
        .migrate()
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations completed");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let services = Services::new(repository.clone(), clock.clone());
    let seeder = Seeder::new(repository, services, clock);

    if config.seed.enabled {
        seeder.run(config.seed.reset).await.context("Database seeding failed")?;
    } else {
        seeder.report().await?;
    }

    Ok(())
}
