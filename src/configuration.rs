use crate::cli_args::Commands;
use nx_core::configuration::{CompanionConfiguration, TradeRouteEngineConfig};

pub fn companion_configuration(command: Commands) -> CompanionConfiguration {
    match command {
        Commands::ComputeTradeRoutes {
            snapshot_path,
            database_url,
            max_path_points,
            top_n_trade_routes,
            expand_paths_on_miss,
        } => CompanionConfiguration {
            database_url,
            snapshot_path,
            max_path_points,
            top_n_trade_routes,
            trade_route_engine: TradeRouteEngineConfig { expand_paths_on_miss },
        },
    }
}
