use crate::ctx::Ctx;
use crate::{DbModelManager, DbNavigationPathEntry};
use anyhow::*;
use async_trait::async_trait;
use mockall::automock;
use nx_domain::{NavigationPath, NavigationPathId, NewNavigationPath, StarSystemId};
use sqlx::types::Json;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Memoized shortest paths, keyed by `(from, to)`.
///
/// A stored path is only replaced by a strictly shorter one. Among paths of equal length the one stored first stays
/// canonical, which makes the lowest path id win.
#[automock]
#[async_trait]
pub trait NavigationPathBmcTrait: Send + Sync + Debug {
    async fn get_best_path(&self, ctx: &Ctx, from: StarSystemId, to: StarSystemId) -> Result<Option<NavigationPath>>;

    /// Stores `new_path` if it is the first or a strictly shorter path for its pair and returns the canonical path.
    async fn save_navigation_path(&self, ctx: &Ctx, new_path: &NewNavigationPath) -> Result<NavigationPath>;

    /// Distinct start systems of all stored paths, ascending.
    async fn get_path_origins(&self, ctx: &Ctx) -> Result<Vec<StarSystemId>>;

    async fn clear_navigation_paths(&self, ctx: &Ctx) -> Result<()>;
}

#[derive(Debug)]
pub struct DbNavigationPathBmc {
    pub(crate) mm: DbModelManager,
}

#[async_trait]
impl NavigationPathBmcTrait for DbNavigationPathBmc {
    async fn get_best_path(&self, _ctx: &Ctx, from: StarSystemId, to: StarSystemId) -> Result<Option<NavigationPath>> {
        let maybe_entry: Option<DbNavigationPathEntry> = sqlx::query_as::<_, DbNavigationPathEntry>(
            r#"
select id
     , from_star_system_id
     , to_star_system_id
     , path_point_count
     , path_points
  from navigation_paths
 where from_star_system_id = $1
   and to_star_system_id = $2
        "#,
        )
        .bind(from.0)
        .bind(to.0)
        .fetch_optional(self.mm.pool())
        .await?;

        Ok(maybe_entry.map(to_navigation_path))
    }

    async fn save_navigation_path(&self, ctx: &Ctx, new_path: &NewNavigationPath) -> Result<NavigationPath> {
        new_path.validate()?;

        sqlx::query(
            r#"
insert into navigation_paths (from_star_system_id, to_star_system_id, path_point_count, path_points)
values ($1, $2, $3, $4)
on conflict (from_star_system_id, to_star_system_id)
do update set id = nextval(pg_get_serial_sequence('navigation_paths', 'id'))
            , path_point_count = excluded.path_point_count
            , path_points = excluded.path_points
      where excluded.path_point_count < navigation_paths.path_point_count
        "#,
        )
        .bind(new_path.from_star_system_id.0)
        .bind(new_path.to_star_system_id.0)
        .bind(new_path.path_point_count() as i32)
        .bind(Json(new_path.path_points.clone()))
        .execute(self.mm.pool())
        .await?;

        self.get_best_path(ctx, new_path.from_star_system_id, new_path.to_star_system_id)
            .await?
            .ok_or_else(|| anyhow!("navigation path {:?} -> {:?} vanished after upsert", new_path.from_star_system_id, new_path.to_star_system_id))
    }

    async fn get_path_origins(&self, _ctx: &Ctx) -> Result<Vec<StarSystemId>> {
        let origins: Vec<i64> = sqlx::query_scalar(
            r#"
select distinct from_star_system_id
  from navigation_paths
 order by from_star_system_id
        "#,
        )
        .fetch_all(self.mm.pool())
        .await?;

        Ok(origins.into_iter().map(StarSystemId).collect())
    }

    async fn clear_navigation_paths(&self, _ctx: &Ctx) -> Result<()> {
        sqlx::query("delete from navigation_paths").execute(self.mm.pool()).await?;
        Ok(())
    }
}

fn to_navigation_path(entry: DbNavigationPathEntry) -> NavigationPath {
    NavigationPath {
        id: NavigationPathId(entry.id),
        from_star_system_id: StarSystemId(entry.from_star_system_id),
        to_star_system_id: StarSystemId(entry.to_star_system_id),
        path_point_count: entry.path_point_count as usize,
        path_points: entry.path_points.0,
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNavigationPaths {
    paths: HashMap<(StarSystemId, StarSystemId), NavigationPath>,
    last_id: i64,
}

#[derive(Debug)]
pub struct InMemoryNavigationPathBmc {
    in_memory_paths: Arc<RwLock<InMemoryNavigationPaths>>,
}

impl Default for InMemoryNavigationPathBmc {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryNavigationPathBmc {
    pub fn new() -> Self {
        Self {
            in_memory_paths: Arc::new(RwLock::new(InMemoryNavigationPaths::default())),
        }
    }

    pub async fn all_paths(&self) -> Vec<NavigationPath> {
        let guard = self.in_memory_paths.read().await;
        let mut paths: Vec<NavigationPath> = guard.paths.values().cloned().collect();
        paths.sort_by_key(|p| p.id);
        paths
    }
}

#[async_trait]
impl NavigationPathBmcTrait for InMemoryNavigationPathBmc {
    async fn get_best_path(&self, _ctx: &Ctx, from: StarSystemId, to: StarSystemId) -> Result<Option<NavigationPath>> {
        let guard = self.in_memory_paths.read().await;
        Ok(guard.paths.get(&(from, to)).cloned())
    }

    async fn save_navigation_path(&self, _ctx: &Ctx, new_path: &NewNavigationPath) -> Result<NavigationPath> {
        new_path.validate()?;

        let mut guard = self.in_memory_paths.write().await;
        let key = (new_path.from_star_system_id, new_path.to_star_system_id);

        if let Some(existing) = guard.paths.get(&key) {
            if !new_path.is_shorter_than(existing) {
                return Ok(existing.clone());
            }
        }

        guard.last_id += 1;
        let path = new_path.clone().into_navigation_path(NavigationPathId(guard.last_id));
        guard.paths.insert(key, path.clone());
        Ok(path)
    }

    async fn get_path_origins(&self, _ctx: &Ctx) -> Result<Vec<StarSystemId>> {
        let guard = self.in_memory_paths.read().await;
        let mut origins: Vec<StarSystemId> = guard.paths.keys().map(|(from, _)| *from).collect();
        origins.sort();
        origins.dedup();
        Ok(origins)
    }

    async fn clear_navigation_paths(&self, _ctx: &Ctx) -> Result<()> {
        let mut guard = self.in_memory_paths.write().await;
        guard.paths.clear();
        Ok(())
    }
}
