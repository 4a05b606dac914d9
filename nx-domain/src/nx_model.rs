use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct StarSystemId(pub i64);

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct JumpLinkId(pub i64);

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct NavigationPathId(pub i64);

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct MarketBaseId(pub i64);

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct CelestialBodyId(pub i64);

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ItemId(pub i64);

impl Display for StarSystemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for MarketBaseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StarSystem {
    pub id: StarSystemId,
    pub name: String,
    pub jump_links: Vec<JumpLink>,
}

/// Directed edge between two star systems.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct JumpLink {
    pub id: JumpLinkId,
    pub from_star_system_id: StarSystemId,
    pub to_star_system_id: StarSystemId,
    pub distance: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct MarketBase {
    pub id: MarketBaseId,
    pub star_system_id: StarSystemId,
    pub celestial_body_id: CelestialBodyId,
    pub market_items: Vec<MarketItem>,
}

/// A zero quantity on either side means that side is not offered.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct MarketItem {
    pub item_id: ItemId,
    pub sell_quantity: u32,
    pub sell_price: i64,
    pub buy_quantity: u32,
    pub buy_price: i64,
}

impl MarketItem {
    pub fn is_sold(&self) -> bool {
        self.sell_quantity > 0
    }

    pub fn is_bought(&self) -> bool {
        self.buy_quantity > 0
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub mass_units: i64,
    pub is_life_support_required: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeRoute {
    pub from_base_id: MarketBaseId,
    pub from_star_system_id: StarSystemId,
    pub to_base_id: MarketBaseId,
    pub to_star_system_id: StarSystemId,
    pub item_id: ItemId,
    pub item_mass_units: i64,
    pub navigation_path_id: NavigationPathId,
    pub is_life_support_required: bool,
    pub total_quantity: u32,
    pub profit_per_item: i64,
    pub profit_per_mass_unit: f64,
    pub rating: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    #[serde(default)]
    pub star_systems: Vec<StarSystem>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub market_bases: Vec<MarketBase>,
}

#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error("Can't read snapshot {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Can't parse snapshot {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

impl GameSnapshot {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
