use chrono::Utc;
use itertools::Itertools;
use nx_domain::{Item, NavigationPath, StarSystem, StarSystemId};
use nx_store::bmc::{Bmc, InMemoryBmc};
use nx_store::Ctx;
use std::collections::HashMap;
use std::sync::Arc;

use crate::configuration::TradeRouteEngineConfig;
use crate::pathfinder::PathFinder;
use crate::trading::TradeRouteEngine;

pub async fn in_memory_bmc_with(star_systems: &[StarSystem], items: &[Item]) -> Arc<InMemoryBmc> {
    let bmc = Arc::new(InMemoryBmc::new());
    let now = Utc::now();

    for star_system in star_systems {
        bmc.system_bmc()
            .save_star_system(&Ctx::Anonymous, star_system, now)
            .await
            .expect("save_star_system");
    }
    for item in items {
        bmc.item_bmc().save_item(&Ctx::Anonymous, item).await.expect("save_item");
    }

    bmc
}

pub fn path_finder_for(bmc: &Arc<InMemoryBmc>) -> PathFinder {
    PathFinder::new(bmc.system_bmc(), bmc.navigation_path_bmc())
}

/// Hop counts of all memoized paths starting at `from`, keyed by destination.
pub async fn hop_counts_from(bmc: &Arc<InMemoryBmc>, from: StarSystemId) -> HashMap<StarSystemId, usize> {
    bmc.in_mem_navigation_path_bmc
        .all_paths()
        .await
        .into_iter()
        .filter(|p| p.from_star_system_id == from)
        .map(|p| (p.to_star_system_id, p.path_point_count))
        .collect()
}

pub async fn all_paths(bmc: &Arc<InMemoryBmc>) -> Vec<NavigationPath> {
    bmc.in_mem_navigation_path_bmc
        .all_paths()
        .await
        .into_iter()
        .sorted_by_key(|p| (p.from_star_system_id, p.to_star_system_id))
        .collect_vec()
}

pub fn trade_route_engine_for(bmc: &Arc<InMemoryBmc>, config: TradeRouteEngineConfig) -> TradeRouteEngine {
    TradeRouteEngine::new(Arc::clone(bmc) as Arc<dyn Bmc>, path_finder_for(bmc), config)
}
