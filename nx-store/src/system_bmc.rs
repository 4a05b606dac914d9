use crate::ctx::Ctx;
use crate::{DbJumpLinkEntry, DbModelManager, DbStarSystemEntry};
use anyhow::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use mockall::automock;
use nx_domain::{JumpLink, JumpLinkId, StarSystem, StarSystemId};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::RwLock;

#[automock]
#[async_trait]
pub trait SystemBmcTrait: Send + Sync + Debug {
    async fn get_jump_links(&self, ctx: &Ctx, star_system_id: StarSystemId) -> Result<Vec<JumpLink>>;
    async fn get_star_system(&self, ctx: &Ctx, star_system_id: StarSystemId) -> Result<Option<StarSystem>>;
    /// Replaces the star system together with all of its jump links.
    async fn save_star_system(&self, ctx: &Ctx, star_system: &StarSystem, now: DateTime<Utc>) -> Result<()>;
}

#[derive(Debug)]
pub struct DbSystemBmc {
    pub(crate) mm: DbModelManager,
}

#[async_trait]
impl SystemBmcTrait for DbSystemBmc {
    async fn get_jump_links(&self, _ctx: &Ctx, star_system_id: StarSystemId) -> Result<Vec<JumpLink>> {
        let entries: Vec<DbJumpLinkEntry> = sqlx::query_as::<_, DbJumpLinkEntry>(
            r#"
select id
     , from_star_system_id
     , to_star_system_id
     , distance
  from jump_links
 where from_star_system_id = $1
 order by id
        "#,
        )
        .bind(star_system_id.0)
        .fetch_all(self.mm.pool())
        .await?;

        Ok(entries.into_iter().map(to_jump_link).collect_vec())
    }

    async fn get_star_system(&self, ctx: &Ctx, star_system_id: StarSystemId) -> Result<Option<StarSystem>> {
        let maybe_entry: Option<DbStarSystemEntry> = sqlx::query_as::<_, DbStarSystemEntry>(
            r#"
select id
     , name
     , created_at
     , updated_at
  from star_systems
 where id = $1
        "#,
        )
        .bind(star_system_id.0)
        .fetch_optional(self.mm.pool())
        .await?;

        match maybe_entry {
            None => Ok(None),
            Some(entry) => {
                let jump_links = self.get_jump_links(ctx, star_system_id).await?;
                Ok(Some(StarSystem {
                    id: StarSystemId(entry.id),
                    name: entry.name,
                    jump_links,
                }))
            }
        }
    }

    async fn save_star_system(&self, _ctx: &Ctx, star_system: &StarSystem, now: DateTime<Utc>) -> Result<()> {
        let mut tx = self.mm.pool().begin().await?;

        sqlx::query(
            r#"
insert into star_systems (id, name, created_at, updated_at)
values ($1, $2, $3, $4)
on conflict (id) do update set name = excluded.name
                             , updated_at = excluded.updated_at
        "#,
        )
        .bind(star_system.id.0)
        .bind(&star_system.name)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("delete from jump_links where from_star_system_id = $1")
            .bind(star_system.id.0)
            .execute(&mut *tx)
            .await?;

        for link in star_system.jump_links.iter() {
            sqlx::query(
                r#"
insert into jump_links (id, from_star_system_id, to_star_system_id, distance)
values ($1, $2, $3, $4)
on conflict (id) do update set from_star_system_id = excluded.from_star_system_id
                             , to_star_system_id = excluded.to_star_system_id
                             , distance = excluded.distance
        "#,
            )
            .bind(link.id.0)
            .bind(star_system.id.0)
            .bind(link.to_star_system_id.0)
            .bind(link.distance as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

fn to_jump_link(entry: DbJumpLinkEntry) -> JumpLink {
    JumpLink {
        id: JumpLinkId(entry.id),
        from_star_system_id: StarSystemId(entry.from_star_system_id),
        to_star_system_id: StarSystemId(entry.to_star_system_id),
        distance: entry.distance as u32,
    }
}

#[derive(Debug)]
pub struct InMemoryStarSystemEntry {
    pub star_system: StarSystem,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct InMemorySystems {
    star_systems: HashMap<StarSystemId, InMemoryStarSystemEntry>,
}

#[derive(Debug)]
pub struct InMemorySystemsBmc {
    in_memory_systems: Arc<RwLock<InMemorySystems>>,
}

impl Default for InMemorySystemsBmc {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySystemsBmc {
    pub fn new() -> Self {
        Self {
            in_memory_systems: Arc::new(RwLock::new(InMemorySystems::default())),
        }
    }
}

#[async_trait]
impl SystemBmcTrait for InMemorySystemsBmc {
    async fn get_jump_links(&self, _ctx: &Ctx, star_system_id: StarSystemId) -> Result<Vec<JumpLink>> {
        let guard = self.in_memory_systems.read().await;
        Ok(guard
            .star_systems
            .get(&star_system_id)
            .map(|entry| entry.star_system.jump_links.clone())
            .unwrap_or_default())
    }

    async fn get_star_system(&self, _ctx: &Ctx, star_system_id: StarSystemId) -> Result<Option<StarSystem>> {
        let guard = self.in_memory_systems.read().await;
        Ok(guard.star_systems.get(&star_system_id).map(|entry| entry.star_system.clone()))
    }

    async fn save_star_system(&self, _ctx: &Ctx, star_system: &StarSystem, now: DateTime<Utc>) -> Result<()> {
        let mut guard = self.in_memory_systems.write().await;

        guard
            .star_systems
            .entry(star_system.id)
            .and_modify(|old| {
                old.star_system = star_system.clone();
                old.updated_at = now;
            })
            .or_insert(InMemoryStarSystemEntry {
                star_system: star_system.clone(),
                created_at: now,
                updated_at: now,
            });

        Ok(())
    }
}
