use crate::item_bmc::{DbItemBmc, InMemoryItemBmc, ItemBmcTrait};
use crate::market_bmc::{DbMarketBmc, InMemoryMarketBmc, MarketBmcTrait};
use crate::navigation_path_bmc::{DbNavigationPathBmc, InMemoryNavigationPathBmc, NavigationPathBmcTrait};
use crate::system_bmc::{DbSystemBmc, InMemorySystemsBmc, SystemBmcTrait};
use crate::DbModelManager;
use mockall::automock;
use std::fmt::Debug;
use std::sync::Arc;

/// Bundles the stores the path and trade route engines work with.
#[automock]
pub trait Bmc: Send + Sync + Debug {
    fn system_bmc(&self) -> Arc<dyn SystemBmcTrait>;
    fn navigation_path_bmc(&self) -> Arc<dyn NavigationPathBmcTrait>;
    fn item_bmc(&self) -> Arc<dyn ItemBmcTrait>;
    fn market_bmc(&self) -> Arc<dyn MarketBmcTrait>;
}

#[derive(Debug, Clone)]
pub struct DbBmc {
    pub db_model_manager: DbModelManager,
    system_bmc: Arc<DbSystemBmc>,
    navigation_path_bmc: Arc<DbNavigationPathBmc>,
    item_bmc: Arc<DbItemBmc>,
    market_bmc: Arc<DbMarketBmc>,
}

impl DbBmc {
    pub fn new(mm: DbModelManager) -> Self {
        Self {
            db_model_manager: mm.clone(),
            system_bmc: Arc::new(DbSystemBmc { mm: mm.clone() }),
            navigation_path_bmc: Arc::new(DbNavigationPathBmc { mm: mm.clone() }),
            item_bmc: Arc::new(DbItemBmc { mm: mm.clone() }),
            market_bmc: Arc::new(DbMarketBmc { mm }),
        }
    }
}

impl Bmc for DbBmc {
    fn system_bmc(&self) -> Arc<dyn SystemBmcTrait> {
        self.system_bmc.clone() as Arc<dyn SystemBmcTrait>
    }

    fn navigation_path_bmc(&self) -> Arc<dyn NavigationPathBmcTrait> {
        self.navigation_path_bmc.clone() as Arc<dyn NavigationPathBmcTrait>
    }

    fn item_bmc(&self) -> Arc<dyn ItemBmcTrait> {
        self.item_bmc.clone() as Arc<dyn ItemBmcTrait>
    }

    fn market_bmc(&self) -> Arc<dyn MarketBmcTrait> {
        self.market_bmc.clone() as Arc<dyn MarketBmcTrait>
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBmc {
    pub in_mem_system_bmc: Arc<InMemorySystemsBmc>,
    pub in_mem_navigation_path_bmc: Arc<InMemoryNavigationPathBmc>,
    pub in_mem_item_bmc: Arc<InMemoryItemBmc>,
    pub in_mem_market_bmc: Arc<InMemoryMarketBmc>,
}

impl InMemoryBmc {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Bmc for InMemoryBmc {
    fn system_bmc(&self) -> Arc<dyn SystemBmcTrait> {
        Arc::clone(&self.in_mem_system_bmc) as Arc<dyn SystemBmcTrait>
    }

    fn navigation_path_bmc(&self) -> Arc<dyn NavigationPathBmcTrait> {
        Arc::clone(&self.in_mem_navigation_path_bmc) as Arc<dyn NavigationPathBmcTrait>
    }

    fn item_bmc(&self) -> Arc<dyn ItemBmcTrait> {
        Arc::clone(&self.in_mem_item_bmc) as Arc<dyn ItemBmcTrait>
    }

    fn market_bmc(&self) -> Arc<dyn MarketBmcTrait> {
        Arc::clone(&self.in_mem_market_bmc) as Arc<dyn MarketBmcTrait>
    }
}
