use crate::{CelestialBodyId, Item, ItemId, JumpLink, JumpLinkId, MarketBase, MarketBaseId, MarketItem, StarSystem, StarSystemId};
use itertools::Itertools;

/// Creates star systems `1..=num_systems` connected by the given directed edges.
/// Jump link ids are assigned in edge order, starting at 1.
pub fn star_systems_from_edges(num_systems: i64, edges: &[(i64, i64)]) -> Vec<StarSystem> {
    let links = edges
        .iter()
        .enumerate()
        .map(|(idx, (from, to))| JumpLink {
            id: JumpLinkId(idx as i64 + 1),
            from_star_system_id: StarSystemId(*from),
            to_star_system_id: StarSystemId(*to),
            distance: 10,
        })
        .collect_vec();

    (1..=num_systems)
        .map(|id| StarSystem {
            id: StarSystemId(id),
            name: format!("System-{id}"),
            jump_links: links
                .iter()
                .filter(|link| link.from_star_system_id == StarSystemId(id))
                .cloned()
                .collect_vec(),
        })
        .collect_vec()
}

/// Same as [`star_systems_from_edges`], with every edge added in both directions.
pub fn star_systems_from_undirected_edges(num_systems: i64, edges: &[(i64, i64)]) -> Vec<StarSystem> {
    let directed = edges.iter().flat_map(|(a, b)| [(*a, *b), (*b, *a)]).collect_vec();
    star_systems_from_edges(num_systems, &directed)
}

pub fn market_base(id: i64, star_system_id: i64, market_items: Vec<MarketItem>) -> MarketBase {
    MarketBase {
        id: MarketBaseId(id),
        star_system_id: StarSystemId(star_system_id),
        celestial_body_id: CelestialBodyId(id),
        market_items,
    }
}

pub fn selling(item_id: i64, quantity: u32, price: i64) -> MarketItem {
    MarketItem {
        item_id: ItemId(item_id),
        sell_quantity: quantity,
        sell_price: price,
        buy_quantity: 0,
        buy_price: 0,
    }
}

pub fn buying(item_id: i64, quantity: u32, price: i64) -> MarketItem {
    MarketItem {
        item_id: ItemId(item_id),
        sell_quantity: 0,
        sell_price: 0,
        buy_quantity: quantity,
        buy_price: price,
    }
}

pub fn item(id: i64, mass_units: i64) -> Item {
    Item {
        id: ItemId(id),
        name: format!("Item-{id}"),
        mass_units,
        is_life_support_required: false,
    }
}
