use crate::pathfinder::{PathFinder, PathGenerationSummary};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use nx_domain::{JumpLink, JumpLinkId, StarSystem, StarSystemId};
use nx_store::bmc::Bmc;
use nx_store::Ctx;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{event, Level};

/// Stores refreshed star systems and keeps the memoized navigation paths consistent with their jump links.
#[derive(Debug, Clone)]
pub struct StarSystemRefresher {
    bmc: Arc<dyn Bmc>,
    path_finder: PathFinder,
}

impl StarSystemRefresher {
    pub fn new(bmc: Arc<dyn Bmc>, path_finder: PathFinder) -> Self {
        Self { bmc, path_finder }
    }

    /// Persists `star_systems` and generates navigation paths from each of them.
    ///
    /// When the links of an already known system changed, memoized paths may run over links that are gone or miss
    /// shortcuts that are new. In that case all paths are cleared and regenerated from every system that had paths
    /// before. Systems seen for the first time only add their own outgoing links and never trigger a clear.
    pub async fn refresh_star_systems(&self, ctx: &Ctx, star_systems: &[StarSystem], now: DateTime<Utc>) -> PathGenerationSummary {
        let mut links_changed = false;
        let mut refreshed: Vec<StarSystemId> = Vec::with_capacity(star_systems.len());

        for star_system in star_systems {
            let stored_links = match self.bmc.system_bmc().get_star_system(ctx, star_system.id).await {
                Ok(maybe_stored) => maybe_stored.map(|stored| stored.jump_links),
                Err(e) => {
                    event!(
                        Level::WARN,
                        component = "StarSystemRefresher",
                        "Failed to load star system {}, skipping it: {}",
                        star_system.id,
                        e
                    );
                    continue;
                }
            };

            if let Err(e) = self.bmc.system_bmc().save_star_system(ctx, star_system, now).await {
                event!(
                    Level::WARN,
                    component = "StarSystemRefresher",
                    "Failed to store star system {}, skipping it: {}",
                    star_system.id,
                    e
                );
                continue;
            }

            if let Some(stored_links) = stored_links {
                if link_signature(&stored_links) != link_signature(&star_system.jump_links) {
                    event!(
                        Level::DEBUG,
                        component = "StarSystemRefresher",
                        "Jump links of star system {} changed",
                        star_system.id
                    );
                    links_changed = true;
                }
            }
            refreshed.push(star_system.id);
        }

        let mut origins: BTreeSet<StarSystemId> = refreshed.iter().copied().collect();
        if links_changed {
            origins.extend(self.invalidate_navigation_paths(ctx).await);
        }

        let mut summary = PathGenerationSummary::default();
        for star_system_id in origins.iter() {
            summary += self.path_finder.expand_from(ctx, *star_system_id).await;
        }

        event!(
            Level::INFO,
            component = "StarSystemRefresher",
            "Refreshed {} star systems, expanded from {} systems, stored {} navigation paths",
            refreshed.len(),
            origins.len(),
            summary.stored_paths
        );

        summary
    }

    /// Clears all memoized paths and returns the systems that had paths before.
    async fn invalidate_navigation_paths(&self, ctx: &Ctx) -> Vec<StarSystemId> {
        let origins = match self.bmc.navigation_path_bmc().get_path_origins(ctx).await {
            Ok(origins) => origins,
            Err(e) => {
                event!(
                    Level::ERROR,
                    component = "StarSystemRefresher",
                    "Failed to load navigation path origins, only refreshed systems get new paths: {}",
                    e
                );
                Vec::new()
            }
        };

        event!(
            Level::INFO,
            component = "StarSystemRefresher",
            "Jump links changed, regenerating navigation paths of {} systems",
            origins.len()
        );
        if let Err(e) = self.bmc.navigation_path_bmc().clear_navigation_paths(ctx).await {
            event!(
                Level::ERROR,
                component = "StarSystemRefresher",
                "Failed to clear navigation paths: {}",
                e
            );
        }

        origins
    }
}

fn link_signature(links: &[JumpLink]) -> Vec<(JumpLinkId, StarSystemId, u32)> {
    links
        .iter()
        .map(|l| (l.id, l.to_star_system_id, l.distance))
        .sorted()
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_objects::{all_paths, hop_counts_from, in_memory_bmc_with, path_finder_for};
    use nx_domain::test_objects::{star_systems_from_edges, star_systems_from_undirected_edges};
    use std::collections::HashMap;
    use test_log::test;

    fn refresher_for(bmc: &Arc<nx_store::bmc::InMemoryBmc>) -> StarSystemRefresher {
        StarSystemRefresher::new(Arc::clone(bmc) as Arc<dyn Bmc>, path_finder_for(bmc))
    }

    #[test(tokio::test)]
    async fn refresh_discovers_paths_from_every_system() {
        let bmc = in_memory_bmc_with(&[], &[]).await;
        let refresher = refresher_for(&bmc);
        let systems = star_systems_from_undirected_edges(3, &[(1, 2), (2, 3)]);

        let summary = refresher.refresh_star_systems(&Ctx::Anonymous, &systems, Utc::now()).await;

        assert_eq!(summary.stored_paths, 6);
        assert_eq!(summary.failed_candidates, 0);
        assert_eq!(
            hop_counts_from(&bmc, StarSystemId(1)).await,
            HashMap::from([(StarSystemId(2), 1), (StarSystemId(3), 2)])
        );
    }

    #[test(tokio::test)]
    async fn unchanged_links_keep_memoized_paths() {
        let systems = star_systems_from_undirected_edges(3, &[(1, 2), (2, 3)]);
        let bmc = in_memory_bmc_with(&[], &[]).await;
        let refresher = refresher_for(&bmc);

        refresher.refresh_star_systems(&Ctx::Anonymous, &systems, Utc::now()).await;
        let before = all_paths(&bmc).await;
        let summary = refresher.refresh_star_systems(&Ctx::Anonymous, &systems, Utc::now()).await;

        assert_eq!(summary.stored_paths, 0);
        assert_eq!(all_paths(&bmc).await, before);
    }

    #[test(tokio::test)]
    async fn removed_link_invalidates_paths_through_it() {
        let bmc = in_memory_bmc_with(&[], &[]).await;
        let refresher = refresher_for(&bmc);
        let connected = star_systems_from_undirected_edges(3, &[(1, 2), (2, 3)]);
        refresher.refresh_star_systems(&Ctx::Anonymous, &connected, Utc::now()).await;
        assert!(hop_counts_from(&bmc, StarSystemId(1)).await.contains_key(&StarSystemId(3)));

        // system 2 loses its link towards system 3
        let mut system_2 = connected[1].clone();
        system_2.jump_links.retain(|l| l.to_star_system_id != StarSystemId(3));
        refresher.refresh_star_systems(&Ctx::Anonymous, &[system_2], Utc::now()).await;

        assert_eq!(
            hop_counts_from(&bmc, StarSystemId(1)).await,
            HashMap::from([(StarSystemId(2), 1)])
        );
        assert_eq!(
            hop_counts_from(&bmc, StarSystemId(2)).await,
            HashMap::from([(StarSystemId(1), 1)])
        );
        assert_eq!(
            hop_counts_from(&bmc, StarSystemId(3)).await,
            HashMap::from([(StarSystemId(2), 1), (StarSystemId(1), 2)])
        );
    }

    #[test(tokio::test)]
    async fn new_system_keeps_paths_between_known_systems() {
        let bmc = in_memory_bmc_with(&[], &[]).await;
        let refresher = refresher_for(&bmc);
        let connected = star_systems_from_undirected_edges(3, &[(1, 2), (2, 3)]);
        refresher.refresh_star_systems(&Ctx::Anonymous, &connected, Utc::now()).await;
        let before = all_paths(&bmc).await;

        let system_4 = star_systems_from_edges(4, &[(4, 3)]).remove(3);
        refresher.refresh_star_systems(&Ctx::Anonymous, &[system_4], Utc::now()).await;

        let path_finder = path_finder_for(&bmc);
        assert!(path_finder.get_path(&Ctx::Anonymous, StarSystemId(1), StarSystemId(2)).await.is_some());
        assert!(path_finder.get_path(&Ctx::Anonymous, StarSystemId(3), StarSystemId(2)).await.is_some());
        assert_eq!(
            all_paths(&bmc).await.into_iter().filter(|p| p.from_star_system_id != StarSystemId(4)).collect_vec(),
            before
        );
        assert_eq!(
            hop_counts_from(&bmc, StarSystemId(4)).await,
            HashMap::from([(StarSystemId(3), 1), (StarSystemId(2), 2), (StarSystemId(1), 3)])
        );
    }

    #[test(tokio::test)]
    async fn added_link_shortens_paths_of_systems_outside_the_refresh() {
        let bmc = in_memory_bmc_with(&[], &[]).await;
        let refresher = refresher_for(&bmc);
        let chain = star_systems_from_undirected_edges(5, &[(1, 2), (2, 3), (3, 4), (4, 5)]);
        refresher.refresh_star_systems(&Ctx::Anonymous, &chain, Utc::now()).await;
        assert_eq!(hop_counts_from(&bmc, StarSystemId(4)).await.get(&StarSystemId(1)), Some(&3));

        let mut system_5 = chain[4].clone();
        system_5.jump_links.push(JumpLink {
            id: JumpLinkId(100),
            from_star_system_id: StarSystemId(5),
            to_star_system_id: StarSystemId(1),
            distance: 10,
        });
        refresher.refresh_star_systems(&Ctx::Anonymous, &[system_5], Utc::now()).await;

        let from_4 = hop_counts_from(&bmc, StarSystemId(4)).await;
        assert_eq!(from_4.get(&StarSystemId(1)), Some(&2));
        assert_eq!(from_4.get(&StarSystemId(3)), Some(&1));
        assert_eq!(hop_counts_from(&bmc, StarSystemId(1)).await.len(), 4);
    }
}
