use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use nx_core::companion_refresh::CompanionRefresh;
use nx_core::report::generate_trade_routes_table;
use nx_domain::GameSnapshot;
use nx_store::bmc::{Bmc, DbBmc, InMemoryBmc};
use nx_store::{prepare_database_schema, Ctx};
use std::sync::Arc;
use tracing::{event, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli_args::{Cli, Commands};

mod cli_args;
mod configuration;

#[tokio::main]
async fn main() -> Result<()> {
    let Cli { command } = Cli::parse();

    match command {
        Commands::ComputeTradeRoutes { .. } => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(EnvFilter::from_default_env())
                .init();

            let cfg = configuration::companion_configuration(command);

            let snapshot = GameSnapshot::from_file(&cfg.snapshot_path)?;

            let bmc: Arc<dyn Bmc> = match cfg.pg_connection_string() {
                Some(connection_string) => {
                    let mm = prepare_database_schema(connection_string)
                        .await
                        .context("preparing database schema")?;
                    Arc::new(DbBmc::new(mm))
                }
                None => {
                    event!(Level::INFO, "No DATABASE_URL configured, keeping everything in memory");
                    Arc::new(InMemoryBmc::new())
                }
            };

            let companion_refresh = CompanionRefresh::new(bmc, &cfg);
            let ctx = Ctx::Refresh {
                refresh_id: Utc::now().timestamp() as u64,
            };
            let result = companion_refresh.refresh_from_snapshot(&ctx, &snapshot, Utc::now()).await;

            event!(
                Level::INFO,
                "Stored {} items and {} navigation paths",
                result.stored_items,
                result.path_generation.stored_paths
            );

            let best = companion_refresh
                .trade_route_engine()
                .best_trade_routes(&ctx, cfg.top_n_trade_routes)
                .await;
            println!("{}", generate_trade_routes_table(&best));

            Ok(())
        }
    }
}
