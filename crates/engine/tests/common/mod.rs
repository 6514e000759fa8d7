#![allow(dead_code)]

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use engine::{AccountId, Engine, MemoryStore};
use migration::MigratorTrait;

/// Catalog seeded by the init migration.
pub const MERCH: [(&str, i64); 10] = [
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

#[derive(Clone, Copy, Debug)]
pub enum Backend {
    Sqlite,
    Memory,
}

pub async fn migrated_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = migrated_db().await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_catalog(MERCH))
}

pub async fn engine_for(backend: Backend) -> Engine {
    match backend {
        Backend::Sqlite => engine_with_db().await.0,
        Backend::Memory => Engine::builder()
            .store(memory_store())
            .build()
            .await
            .unwrap(),
    }
}

pub async fn register(engine: &Engine, name: &str) -> AccountId {
    engine.register(name, name.as_bytes(), None).await.unwrap()
}
