use crate::ctx::Ctx;
use crate::{DbItemEntry, DbModelManager};
use anyhow::*;
use async_trait::async_trait;
use mockall::automock;
use nx_domain::{Item, ItemId};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::RwLock;

#[automock]
#[async_trait]
pub trait ItemBmcTrait: Send + Sync + Debug {
    async fn get_item(&self, ctx: &Ctx, item_id: ItemId) -> Result<Option<Item>>;
    async fn save_item(&self, ctx: &Ctx, item: &Item) -> Result<()>;
}

#[derive(Debug)]
pub struct DbItemBmc {
    pub(crate) mm: DbModelManager,
}

#[async_trait]
impl ItemBmcTrait for DbItemBmc {
    async fn get_item(&self, _ctx: &Ctx, item_id: ItemId) -> Result<Option<Item>> {
        let maybe_entry: Option<DbItemEntry> = sqlx::query_as::<_, DbItemEntry>(
            r#"
select id
     , name
     , mass_units
     , is_life_support_required
  from items
 where id = $1
        "#,
        )
        .bind(item_id.0)
        .fetch_optional(self.mm.pool())
        .await?;

        Ok(maybe_entry.map(|entry| Item {
            id: ItemId(entry.id),
            name: entry.name,
            mass_units: entry.mass_units,
            is_life_support_required: entry.is_life_support_required,
        }))
    }

    async fn save_item(&self, _ctx: &Ctx, item: &Item) -> Result<()> {
        sqlx::query(
            r#"
insert into items (id, name, mass_units, is_life_support_required)
values ($1, $2, $3, $4)
on conflict (id) do update set name = excluded.name
                             , mass_units = excluded.mass_units
                             , is_life_support_required = excluded.is_life_support_required
        "#,
        )
        .bind(item.id.0)
        .bind(&item.name)
        .bind(item.mass_units)
        .bind(item.is_life_support_required)
        .execute(self.mm.pool())
        .await?;

        Ok(())
    }
}

#[derive(Debug)]
pub struct InMemoryItemBmc {
    items: Arc<RwLock<HashMap<ItemId, Item>>>,
}

impl Default for InMemoryItemBmc {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryItemBmc {
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ItemBmcTrait for InMemoryItemBmc {
    async fn get_item(&self, _ctx: &Ctx, item_id: ItemId) -> Result<Option<Item>> {
        Ok(self.items.read().await.get(&item_id).cloned())
    }

    async fn save_item(&self, _ctx: &Ctx, item: &Item) -> Result<()> {
        self.items.write().await.insert(item.id, item.clone());
        Ok(())
    }
}
