use crate::{Item, ItemId, MarketBase, MarketBaseId, MarketItem, NavigationPath, StarSystemId, TradeRoute};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use strum::Display;

/// One side of a trade: a market base together with its offer for a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketOffer {
    pub market_base_id: MarketBaseId,
    pub star_system_id: StarSystemId,
    pub market_item: MarketItem,
}

impl MarketOffer {
    pub fn new(market_base: &MarketBase, market_item: &MarketItem) -> Self {
        Self {
            market_base_id: market_base.id,
            star_system_id: market_base.star_system_id,
            market_item: market_item.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferIndex {
    pub sellers: BTreeMap<ItemId, Vec<MarketOffer>>,
    pub buyers: BTreeMap<ItemId, Vec<MarketOffer>>,
}

impl OfferIndex {
    pub fn add_market_base(&mut self, market_base: &MarketBase) {
        for market_item in market_base.market_items.iter() {
            if market_item.is_sold() {
                self.sellers
                    .entry(market_item.item_id)
                    .or_default()
                    .push(MarketOffer::new(market_base, market_item));
            }
            if market_item.is_bought() {
                self.buyers
                    .entry(market_item.item_id)
                    .or_default()
                    .push(MarketOffer::new(market_base, market_item));
            }
        }
    }

    /// Items that are both sold and bought somewhere, in ascending id order.
    pub fn tradeable_item_ids(&self) -> Vec<ItemId> {
        self.sellers
            .keys()
            .filter(|item_id| self.buyers.contains_key(item_id))
            .copied()
            .collect_vec()
    }

    /// All (seller, buyer) pairs for an item. Pairs without profit are included; see [`evaluate_trade_route`].
    pub fn seller_buyer_pairs(&self, item_id: &ItemId) -> Vec<(&MarketOffer, &MarketOffer)> {
        match (self.sellers.get(item_id), self.buyers.get(item_id)) {
            (Some(sellers), Some(buyers)) => sellers.iter().cartesian_product(buyers.iter()).collect_vec(),
            _ => Vec::new(),
        }
    }
}

pub fn index_offers(market_bases: &[MarketBase]) -> OfferIndex {
    let mut index = OfferIndex::default();
    for market_base in market_bases {
        index.add_market_base(market_base);
    }
    index
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TradeRouteSkipReason {
    NoProfit,
    NoPath,
    ZeroHopPath,
    UnknownItem,
}

pub fn is_profitable(seller: &MarketOffer, buyer: &MarketOffer) -> bool {
    buyer.market_item.buy_price > seller.market_item.sell_price
}

/// Scores a seller/buyer pair over the path leading from the buyer's system to the seller's system.
pub fn evaluate_trade_route(seller: &MarketOffer, buyer: &MarketOffer, item: &Item, path: &NavigationPath) -> Result<TradeRoute, TradeRouteSkipReason> {
    if !is_profitable(seller, buyer) {
        return Err(TradeRouteSkipReason::NoProfit);
    }
    let hop_count = path.hop_count();
    if hop_count == 0 {
        return Err(TradeRouteSkipReason::ZeroHopPath);
    }

    let total_quantity = seller.market_item.sell_quantity.min(buyer.market_item.buy_quantity);
    let profit_per_item = buyer.market_item.buy_price - seller.market_item.sell_price;

    // massless items count as one mass unit
    let profit_per_mass_unit = if item.mass_units > 0 {
        profit_per_item as f64 / item.mass_units as f64
    } else {
        profit_per_item as f64
    };
    let rating = profit_per_mass_unit / hop_count as f64;

    Ok(TradeRoute {
        from_base_id: seller.market_base_id,
        from_star_system_id: seller.star_system_id,
        to_base_id: buyer.market_base_id,
        to_star_system_id: buyer.star_system_id,
        item_id: item.id,
        item_mass_units: item.mass_units,
        navigation_path_id: path.id,
        is_life_support_required: item.is_life_support_required,
        total_quantity,
        profit_per_item,
        profit_per_mass_unit,
        rating,
    })
}

pub fn sort_by_rating_desc(trade_routes: Vec<TradeRoute>) -> Vec<TradeRoute> {
    trade_routes
        .into_iter()
        .sorted_by_key(|tr| Reverse(OrderedFloat(tr.rating)))
        .collect_vec()
}
