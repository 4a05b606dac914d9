use nx_domain::MAX_PATH_POINTS;
use nx_store::PgConnectionString;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TradeRouteEngineConfig {
    /// Run a path expansion from the buyer's system when no path to the seller is known yet.
    pub expand_paths_on_miss: bool,
}

#[derive(Clone, Debug)]
pub struct CompanionConfiguration {
    pub database_url: Option<String>,
    pub snapshot_path: PathBuf,
    pub max_path_points: usize,
    pub top_n_trade_routes: usize,
    pub trade_route_engine: TradeRouteEngineConfig,
}

impl CompanionConfiguration {
    pub fn new(snapshot_path: PathBuf) -> Self {
        Self {
            database_url: None,
            snapshot_path,
            max_path_points: MAX_PATH_POINTS,
            top_n_trade_routes: 20,
            trade_route_engine: TradeRouteEngineConfig::default(),
        }
    }

    pub fn pg_connection_string(&self) -> Option<PgConnectionString> {
        self.database_url.clone().map(PgConnectionString)
    }
}
