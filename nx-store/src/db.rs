use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{ConnectOptions, FromRow, Pool, Postgres};
use tracing::log::LevelFilter;
use tracing::{event, Level};

use nx_domain::{MarketItem, PathPoint, TradeRoute};

#[derive(Clone, Debug)]
pub struct PgConnectionString(pub String);

#[derive(Clone, Debug)]
pub struct DbModelManager {
    pool: Pool<Postgres>,
}

impl DbModelManager {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

pub async fn get_pg_connection_pool(connection_string: PgConnectionString) -> Result<Pool<Postgres>> {
    let database_connection_options: PgConnectOptions = connection_string
        .0
        .parse::<PgConnectOptions>()?
        .log_slow_statements(LevelFilter::Warn, Duration::from_secs(60));

    let pg_connection_pool: Pool<Postgres> = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(database_connection_options)
        .await?;

    Ok(pg_connection_pool)
}

/// Connects to the cache database and brings its schema up to date.
pub async fn prepare_database_schema(connection_string: PgConnectionString) -> Result<DbModelManager> {
    let pg_connection_pool = get_pg_connection_pool(connection_string).await?;
    perform_migration(&pg_connection_pool).await?;
    Ok(DbModelManager::new(pg_connection_pool))
}

async fn perform_migration(pg_connection_pool: &Pool<Postgres>) -> Result<()> {
    event!(Level::INFO, "Migrating database if necessary");
    sqlx::migrate!().run(pg_connection_pool).await?;
    event!(Level::INFO, "Done migrating database");

    Ok(())
}

#[derive(Serialize, Clone, Debug, Deserialize, FromRow)]
pub struct DbStarSystemEntry {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Clone, Debug, Deserialize, FromRow)]
pub struct DbJumpLinkEntry {
    pub id: i64,
    pub from_star_system_id: i64,
    pub to_star_system_id: i64,
    pub distance: i64,
}

#[derive(Serialize, Clone, Debug, Deserialize, FromRow)]
pub struct DbNavigationPathEntry {
    pub id: i64,
    pub from_star_system_id: i64,
    pub to_star_system_id: i64,
    pub path_point_count: i32,
    pub path_points: Json<Vec<PathPoint>>,
}

#[derive(Serialize, Clone, Debug, Deserialize, FromRow)]
pub struct DbItemEntry {
    pub id: i64,
    pub name: String,
    pub mass_units: i64,
    pub is_life_support_required: bool,
}

#[derive(Serialize, Clone, Debug, Deserialize, FromRow)]
pub struct DbMarketBaseEntry {
    pub id: i64,
    pub star_system_id: i64,
    pub celestial_body_id: i64,
    pub entry: Json<Vec<MarketItem>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Clone, Debug, Deserialize, FromRow)]
pub struct DbTradeRouteEntry {
    pub entry: Json<TradeRoute>,
}
