use crate::ctx::Ctx;
use crate::{DbMarketBaseEntry, DbModelManager, DbTradeRouteEntry};
use anyhow::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use mockall::automock;
use nx_domain::{sort_by_rating_desc, CelestialBodyId, MarketBase, MarketBaseId, StarSystemId, TradeRoute};
use sqlx::types::Json;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::RwLock;

#[automock]
#[async_trait]
pub trait MarketBmcTrait: Send + Sync + Debug {
    /// Replaces the market base and its items.
    async fn save_market_base(&self, ctx: &Ctx, market_base: &MarketBase, now: DateTime<Utc>) -> Result<()>;
    async fn get_market_base(&self, ctx: &Ctx, market_base_id: MarketBaseId) -> Result<Option<MarketBase>>;
    async fn clear_all_trade_routes(&self, ctx: &Ctx) -> Result<()>;
    async fn save_trade_route(&self, ctx: &Ctx, trade_route: &TradeRoute) -> Result<()>;
    /// All stored trade routes, best rating first.
    async fn get_trade_routes(&self, ctx: &Ctx) -> Result<Vec<TradeRoute>>;
}

#[derive(Debug)]
pub struct DbMarketBmc {
    pub(crate) mm: DbModelManager,
}

#[async_trait]
impl MarketBmcTrait for DbMarketBmc {
    async fn save_market_base(&self, _ctx: &Ctx, market_base: &MarketBase, now: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
insert into market_bases (id, star_system_id, celestial_body_id, entry, created_at, updated_at)
values ($1, $2, $3, $4, $5, $6)
on conflict (id) do update set star_system_id = excluded.star_system_id
                             , celestial_body_id = excluded.celestial_body_id
                             , entry = excluded.entry
                             , updated_at = excluded.updated_at
        "#,
        )
        .bind(market_base.id.0)
        .bind(market_base.star_system_id.0)
        .bind(market_base.celestial_body_id.0)
        .bind(Json(market_base.market_items.clone()))
        .bind(now)
        .bind(now)
        .execute(self.mm.pool())
        .await?;

        Ok(())
    }

    async fn get_market_base(&self, _ctx: &Ctx, market_base_id: MarketBaseId) -> Result<Option<MarketBase>> {
        let maybe_entry: Option<DbMarketBaseEntry> = sqlx::query_as::<_, DbMarketBaseEntry>(
            r#"
select id
     , star_system_id
     , celestial_body_id
     , entry
     , created_at
     , updated_at
  from market_bases
 where id = $1
        "#,
        )
        .bind(market_base_id.0)
        .fetch_optional(self.mm.pool())
        .await?;

        Ok(maybe_entry.map(|entry| MarketBase {
            id: MarketBaseId(entry.id),
            star_system_id: StarSystemId(entry.star_system_id),
            celestial_body_id: CelestialBodyId(entry.celestial_body_id),
            market_items: entry.entry.0,
        }))
    }

    async fn clear_all_trade_routes(&self, _ctx: &Ctx) -> Result<()> {
        sqlx::query("delete from trade_routes").execute(self.mm.pool()).await?;
        Ok(())
    }

    async fn save_trade_route(&self, _ctx: &Ctx, trade_route: &TradeRoute) -> Result<()> {
        sqlx::query(
            r#"
insert into trade_routes (from_base_id, to_base_id, item_id, navigation_path_id, rating, entry)
values ($1, $2, $3, $4, $5, $6)
        "#,
        )
        .bind(trade_route.from_base_id.0)
        .bind(trade_route.to_base_id.0)
        .bind(trade_route.item_id.0)
        .bind(trade_route.navigation_path_id.0)
        .bind(trade_route.rating)
        .bind(Json(trade_route.clone()))
        .execute(self.mm.pool())
        .await?;

        Ok(())
    }

    async fn get_trade_routes(&self, _ctx: &Ctx) -> Result<Vec<TradeRoute>> {
        let entries: Vec<DbTradeRouteEntry> = sqlx::query_as::<_, DbTradeRouteEntry>(
            r#"
select entry
  from trade_routes
 order by rating desc, id
        "#,
        )
        .fetch_all(self.mm.pool())
        .await?;

        Ok(entries.into_iter().map(|e| e.entry.0).collect_vec())
    }
}

#[derive(Debug)]
pub struct InMemoryMarketBaseEntry {
    pub market_base: MarketBase,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct InMemoryMarkets {
    market_bases: HashMap<MarketBaseId, InMemoryMarketBaseEntry>,
    trade_routes: Vec<TradeRoute>,
}

#[derive(Debug)]
pub struct InMemoryMarketBmc {
    in_memory_markets: Arc<RwLock<InMemoryMarkets>>,
}

impl Default for InMemoryMarketBmc {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMarketBmc {
    pub fn new() -> Self {
        Self {
            in_memory_markets: Arc::new(RwLock::new(InMemoryMarkets::default())),
        }
    }
}

#[async_trait]
impl MarketBmcTrait for InMemoryMarketBmc {
    async fn save_market_base(&self, _ctx: &Ctx, market_base: &MarketBase, now: DateTime<Utc>) -> Result<()> {
        let mut guard = self.in_memory_markets.write().await;

        guard
            .market_bases
            .entry(market_base.id)
            .and_modify(|old| {
                old.market_base = market_base.clone();
                old.updated_at = now;
            })
            .or_insert(InMemoryMarketBaseEntry {
                market_base: market_base.clone(),
                created_at: now,
                updated_at: now,
            });

        Ok(())
    }

    async fn get_market_base(&self, _ctx: &Ctx, market_base_id: MarketBaseId) -> Result<Option<MarketBase>> {
        let guard = self.in_memory_markets.read().await;
        Ok(guard.market_bases.get(&market_base_id).map(|entry| entry.market_base.clone()))
    }

    async fn clear_all_trade_routes(&self, _ctx: &Ctx) -> Result<()> {
        self.in_memory_markets.write().await.trade_routes.clear();
        Ok(())
    }

    async fn save_trade_route(&self, _ctx: &Ctx, trade_route: &TradeRoute) -> Result<()> {
        self.in_memory_markets.write().await.trade_routes.push(trade_route.clone());
        Ok(())
    }

    async fn get_trade_routes(&self, _ctx: &Ctx) -> Result<Vec<TradeRoute>> {
        let trade_routes = self.in_memory_markets.read().await.trade_routes.clone();
        Ok(sort_by_rating_desc(trade_routes))
    }
}
