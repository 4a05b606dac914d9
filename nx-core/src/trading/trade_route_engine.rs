use crate::configuration::TradeRouteEngineConfig;
use crate::pathfinder::PathFinder;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use nx_domain::{evaluate_trade_route, index_offers, is_profitable, sort_by_rating_desc, Item, ItemId, MarketBase, MarketBaseId, OfferIndex, StarSystemId, TradeRoute, TradeRouteSkipReason};
use nx_store::bmc::Bmc;
use nx_store::Ctx;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{event, Level};

/// Recomputes the complete set of profitable trade routes from a batch of market snapshots.
#[derive(Debug)]
pub struct TradeRouteEngine {
    bmc: Arc<dyn Bmc>,
    path_finder: PathFinder,
    config: TradeRouteEngineConfig,
    recompute_lock: Mutex<()>,
}

impl TradeRouteEngine {
    pub fn new(bmc: Arc<dyn Bmc>, path_finder: PathFinder, config: TradeRouteEngineConfig) -> Self {
        Self {
            bmc,
            path_finder,
            config,
            recompute_lock: Mutex::new(()),
        }
    }

    pub fn path_finder(&self) -> &PathFinder {
        &self.path_finder
    }

    /// Persists `market_bases` and replaces all stored trade routes with the ones this batch supports.
    ///
    /// Failures never escape: a base that can't be stored contributes no offers, an unknown item contributes no
    /// routes and a route that can't be stored is left out of the result.
    pub async fn process_market_batch(&self, ctx: &Ctx, market_bases: &[MarketBase], now: DateTime<Utc>) -> Vec<TradeRoute> {
        let _guard = self.recompute_lock.lock().await;

        let offer_index = self.persist_market_bases(ctx, market_bases, now).await;

        if let Err(e) = self.bmc.market_bmc().clear_all_trade_routes(ctx).await {
            event!(
                Level::ERROR,
                component = "TradeRouteEngine",
                "Failed to clear trade routes, keeping the previous ones: {}",
                e
            );
            return Vec::new();
        }

        let mut expanded_systems: HashSet<StarSystemId> = HashSet::new();
        let mut trade_routes: Vec<TradeRoute> = Vec::new();

        for item_id in offer_index.tradeable_item_ids() {
            let Some(item) = self.resolve_item(ctx, item_id).await else {
                continue;
            };

            for (seller, buyer) in offer_index.seller_buyer_pairs(&item_id) {
                if !is_profitable(seller, buyer) {
                    continue;
                }

                let mut maybe_path = self.path_finder.get_path(ctx, buyer.star_system_id, seller.star_system_id).await;
                if maybe_path.is_none() && self.config.expand_paths_on_miss && expanded_systems.insert(buyer.star_system_id) {
                    self.path_finder.expand_from(ctx, buyer.star_system_id).await;
                    maybe_path = self.path_finder.get_path(ctx, buyer.star_system_id, seller.star_system_id).await;
                }

                let Some(path) = maybe_path else {
                    log_skipped(&item, seller.market_base_id, buyer.market_base_id, TradeRouteSkipReason::NoPath);
                    continue;
                };

                let trade_route = match evaluate_trade_route(seller, buyer, &item, &path) {
                    Ok(trade_route) => trade_route,
                    Err(reason) => {
                        log_skipped(&item, seller.market_base_id, buyer.market_base_id, reason);
                        continue;
                    }
                };

                match self.bmc.market_bmc().save_trade_route(ctx, &trade_route).await {
                    Ok(()) => trade_routes.push(trade_route),
                    Err(e) => event!(
                        Level::WARN,
                        component = "TradeRouteEngine",
                        "Failed to store trade route for item {} from base {} to base {}: {}",
                        item.id,
                        trade_route.from_base_id,
                        trade_route.to_base_id,
                        e
                    ),
                }
            }
        }

        event!(
            Level::INFO,
            component = "TradeRouteEngine",
            "Computed {} trade routes from {} market bases",
            trade_routes.len(),
            market_bases.len()
        );

        sort_by_rating_desc(trade_routes)
    }

    /// The stored trade routes with the highest rating.
    pub async fn best_trade_routes(&self, ctx: &Ctx, limit: usize) -> Vec<TradeRoute> {
        match self.bmc.market_bmc().get_trade_routes(ctx).await {
            Ok(trade_routes) => trade_routes.into_iter().take(limit).collect_vec(),
            Err(e) => {
                event!(
                    Level::WARN,
                    component = "TradeRouteEngine",
                    "Failed to load trade routes: {}",
                    e
                );
                Vec::new()
            }
        }
    }

    async fn persist_market_bases(&self, ctx: &Ctx, market_bases: &[MarketBase], now: DateTime<Utc>) -> OfferIndex {
        let mut persisted: Vec<MarketBase> = Vec::with_capacity(market_bases.len());

        for market_base in market_bases {
            match self.bmc.market_bmc().save_market_base(ctx, market_base, now).await {
                Ok(()) => persisted.push(market_base.clone()),
                Err(e) => event!(
                    Level::WARN,
                    component = "TradeRouteEngine",
                    "Failed to store market base {}, ignoring its offers: {}",
                    market_base.id,
                    e
                ),
            }
        }

        index_offers(&persisted)
    }

    async fn resolve_item(&self, ctx: &Ctx, item_id: ItemId) -> Option<Item> {
        match self.bmc.item_bmc().get_item(ctx, item_id).await {
            Ok(Some(item)) => Some(item),
            Ok(None) => {
                event!(
                    Level::DEBUG,
                    component = "TradeRouteEngine",
                    "Skipping item {}: {}",
                    item_id,
                    TradeRouteSkipReason::UnknownItem
                );
                None
            }
            Err(e) => {
                event!(
                    Level::WARN,
                    component = "TradeRouteEngine",
                    "Failed to load item {}: {}",
                    item_id,
                    e
                );
                None
            }
        }
    }
}

fn log_skipped(item: &Item, seller_base_id: MarketBaseId, buyer_base_id: MarketBaseId, reason: TradeRouteSkipReason) {
    event!(
        Level::DEBUG,
        component = "TradeRouteEngine",
        "Skipping {} from base {} to base {}: {}",
        item.name,
        seller_base_id,
        buyer_base_id,
        reason
    );
}
