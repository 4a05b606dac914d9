use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// loads a game snapshot and prints the best trade routes
    ComputeTradeRoutes {
        #[arg(long, env("SNAPSHOT_PATH"))]
        snapshot_path: PathBuf,
        /// stores everything in postgres when set, in memory otherwise
        #[arg(long, env("DATABASE_URL"))]
        database_url: Option<String>,
        #[arg(long, env("MAX_PATH_POINTS"), default_value_t = nx_domain::MAX_PATH_POINTS)]
        max_path_points: usize,
        #[arg(long, env("TOP_N_TRADE_ROUTES"), default_value_t = 20)]
        top_n_trade_routes: usize,
        #[arg(long, env("EXPAND_PATHS_ON_MISS"), default_value_t = false)]
        expand_paths_on_miss: bool,
    },
}
