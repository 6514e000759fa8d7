use std::{net::SocketAddr, sync::Arc, time::Duration};

use engine::{Engine, MemoryCache, RedisCache, UserCache};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection};
use server::{Authenticator, ServerState};

mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "coinshop={level},server={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect(&settings.database).await?;

    let cache: Arc<dyn UserCache> = match &settings.cache.redis_url {
        Some(url) => {
            tracing::info!("Using redis cache at {url}");
            Arc::new(RedisCache::connect(url).await?)
        }
        None => {
            tracing::info!("No redis url configured, using in-process cache");
            Arc::new(MemoryCache::new())
        }
    };

    let engine = Engine::builder()
        .database(db)
        .cache(cache)
        .cache_policy(settings.cache.policy())
        .store_timeout(settings.server.request_timeout())
        .build()
        .await?;

    let auth = Authenticator::new(
        &settings.auth.secret,
        Duration::from_secs(settings.auth.token_ttl_secs),
    );
    let state = ServerState::new(engine, auth, settings.server.request_timeout());

    let addr: SocketAddr = format!("{}:{}", settings.server.bind, settings.server.port).parse()?;
    server::run(state, addr).await?;

    Ok(())
}

async fn connect(config: &settings::Database) -> Result<DatabaseConnection, BoxError> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(false);

    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("Database ready");
    Ok(database)
}
