use crate::configuration::CompanionConfiguration;
use crate::pathfinder::{PathFinder, PathGenerationSummary};
use crate::star_system_refresher::StarSystemRefresher;
use crate::trading::TradeRouteEngine;
use chrono::{DateTime, Utc};
use nx_domain::{GameSnapshot, TradeRoute};
use nx_store::bmc::Bmc;
use nx_store::Ctx;
use std::sync::Arc;
use tracing::{event, Level};

#[derive(Debug, Clone, PartialEq)]
pub struct CompanionRefreshResult {
    pub stored_items: usize,
    pub path_generation: PathGenerationSummary,
    pub trade_routes: Vec<TradeRoute>,
}

/// Feeds a full game snapshot through the stores, the path finder and the trade route engine.
#[derive(Debug)]
pub struct CompanionRefresh {
    bmc: Arc<dyn Bmc>,
    star_system_refresher: StarSystemRefresher,
    trade_route_engine: TradeRouteEngine,
}

impl CompanionRefresh {
    pub fn new(bmc: Arc<dyn Bmc>, cfg: &CompanionConfiguration) -> Self {
        let path_finder = PathFinder::new(bmc.system_bmc(), bmc.navigation_path_bmc()).with_max_path_points(cfg.max_path_points);

        Self {
            star_system_refresher: StarSystemRefresher::new(Arc::clone(&bmc), path_finder.clone()),
            trade_route_engine: TradeRouteEngine::new(Arc::clone(&bmc), path_finder, cfg.trade_route_engine.clone()),
            bmc,
        }
    }

    pub fn trade_route_engine(&self) -> &TradeRouteEngine {
        &self.trade_route_engine
    }

    pub async fn refresh_from_snapshot(&self, ctx: &Ctx, snapshot: &GameSnapshot, now: DateTime<Utc>) -> CompanionRefreshResult {
        let mut stored_items = 0;
        for item in snapshot.items.iter() {
            match self.bmc.item_bmc().save_item(ctx, item).await {
                Ok(()) => stored_items += 1,
                Err(e) => event!(
                    Level::WARN,
                    component = "CompanionRefresh",
                    "Failed to store item {}: {}",
                    item.id,
                    e
                ),
            }
        }

        let path_generation = self
            .star_system_refresher
            .refresh_star_systems(ctx, &snapshot.star_systems, now)
            .await;

        let trade_routes = self
            .trade_route_engine
            .process_market_batch(ctx, &snapshot.market_bases, now)
            .await;

        event!(
            Level::INFO,
            component = "CompanionRefresh",
            "Snapshot refresh done: {} items, {} star systems, {} market bases, {} trade routes",
            stored_items,
            snapshot.star_systems.len(),
            snapshot.market_bases.len(),
            trade_routes.len()
        );

        CompanionRefreshResult {
            stored_items,
            path_generation,
            trade_routes,
        }
    }
}
