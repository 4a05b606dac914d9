use nx_domain::{format_path, validate_contiguous, NavigationPath, NewNavigationPath, PathPoint, StarSystemId, MAX_PATH_POINTS};
use nx_store::{Ctx, NavigationPathBmcTrait, SystemBmcTrait};
use std::ops::AddAssign;
use std::sync::Arc;
use tracing::{event, Level};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathGenerationSummary {
    pub stored_paths: usize,
    pub pruned_candidates: usize,
    pub failed_candidates: usize,
}

impl AddAssign for PathGenerationSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.stored_paths += rhs.stored_paths;
        self.pruned_candidates += rhs.pruned_candidates;
        self.failed_candidates += rhs.failed_candidates;
    }
}

/// Answers "fewest hops from A to B" over a jump link graph that is only explored on demand.
///
/// Lookups never search. Paths are discovered by [`PathFinder::generate_paths`], which memoizes every improvement it
/// finds in the navigation path store.
#[derive(Debug, Clone)]
pub struct PathFinder {
    system_bmc: Arc<dyn SystemBmcTrait>,
    navigation_path_bmc: Arc<dyn NavigationPathBmcTrait>,
    max_path_points: usize,
}

impl PathFinder {
    pub fn new(system_bmc: Arc<dyn SystemBmcTrait>, navigation_path_bmc: Arc<dyn NavigationPathBmcTrait>) -> Self {
        Self {
            system_bmc,
            navigation_path_bmc,
            max_path_points: MAX_PATH_POINTS,
        }
    }

    pub fn with_max_path_points(self, max_path_points: usize) -> Self {
        Self { max_path_points, ..self }
    }

    pub fn max_path_points(&self) -> usize {
        self.max_path_points
    }

    pub async fn get_path(&self, ctx: &Ctx, from: StarSystemId, to: StarSystemId) -> Option<NavigationPath> {
        if from == to {
            return None;
        }

        match self.navigation_path_bmc.get_best_path(ctx, from, to).await {
            Ok(maybe_path) => maybe_path,
            Err(e) => {
                event!(
                    Level::WARN,
                    component = "PathFinder",
                    "Failed to load navigation path {} -> {}: {}",
                    from,
                    to,
                    e
                );
                None
            }
        }
    }

    pub async fn expand_from(&self, ctx: &Ctx, start: StarSystemId) -> PathGenerationSummary {
        self.generate_paths(ctx, start, Vec::new()).await
    }

    /// Expands the frontier reached by `path_so_far` and stores every path from `start` that is new or strictly
    /// shorter than the known one. Improved paths are expanded further until they reach the hop limit.
    pub async fn generate_paths(&self, ctx: &Ctx, start: StarSystemId, path_so_far: Vec<PathPoint>) -> PathGenerationSummary {
        let mut summary = PathGenerationSummary::default();

        if let Err(e) = validate_contiguous(start, &path_so_far) {
            event!(
                Level::WARN,
                component = "PathFinder",
                "Refusing to expand path from {}: {}",
                start,
                e
            );
            return summary;
        }
        if path_so_far.iter().any(|pp| pp.to_star_system_id == start) {
            event!(
                Level::WARN,
                component = "PathFinder",
                "Refusing to expand path from {} that returns to its origin",
                start
            );
            return summary;
        }

        let mut worklist: Vec<Vec<PathPoint>> = vec![path_so_far];

        while let Some(path) = worklist.pop() {
            if path.len() >= self.max_path_points {
                continue;
            }

            let frontier = path.last().map(|pp| pp.to_star_system_id).unwrap_or(start);
            let previous_frontier = path.last().map(|pp| pp.from_star_system_id);

            let jump_links = match self.system_bmc.get_jump_links(ctx, frontier).await {
                Ok(links) => links,
                Err(e) => {
                    event!(
                        Level::WARN,
                        component = "PathFinder",
                        "Failed to load jump links of {}: {}",
                        frontier,
                        e
                    );
                    summary.failed_candidates += 1;
                    continue;
                }
            };

            for link in jump_links.iter() {
                let neighbour = link.to_star_system_id;
                if neighbour == start || neighbour == frontier || Some(neighbour) == previous_frontier {
                    continue;
                }
                // revisiting a system can't lead to a shorter path
                if path.iter().any(|pp| pp.from_star_system_id == neighbour) {
                    summary.pruned_candidates += 1;
                    continue;
                }

                let mut candidate_points = path.clone();
                candidate_points.push(PathPoint::from(link));
                let candidate = NewNavigationPath {
                    from_star_system_id: start,
                    to_star_system_id: neighbour,
                    path_points: candidate_points,
                };

                let best_known = match self.navigation_path_bmc.get_best_path(ctx, start, neighbour).await {
                    Ok(best_known) => best_known,
                    Err(e) => {
                        event!(
                            Level::WARN,
                            component = "PathFinder",
                            "Failed to load navigation path {} -> {}: {}",
                            start,
                            neighbour,
                            e
                        );
                        summary.failed_candidates += 1;
                        continue;
                    }
                };

                let is_improvement = best_known.as_ref().map_or(true, |best| candidate.is_shorter_than(best));
                if !is_improvement {
                    summary.pruned_candidates += 1;
                    continue;
                }

                match self.navigation_path_bmc.save_navigation_path(ctx, &candidate).await {
                    Ok(stored) => {
                        event!(
                            Level::TRACE,
                            component = "PathFinder",
                            "Stored path {} ({} hops)",
                            format_path(&stored.path_points),
                            stored.path_point_count
                        );
                        summary.stored_paths += 1;
                        worklist.push(candidate.path_points);
                    }
                    Err(e) => {
                        event!(
                            Level::WARN,
                            component = "PathFinder",
                            "Failed to store navigation path {}: {}",
                            format_path(&candidate.path_points),
                            e
                        );
                        summary.failed_candidates += 1;
                    }
                }
            }
        }

        event!(
            Level::DEBUG,
            component = "PathFinder",
            "Expanded paths from {}: {:?}",
            start,
            summary
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_objects::{all_paths, hop_counts_from, in_memory_bmc_with, path_finder_for};
    use anyhow::anyhow;
    use itertools::Itertools;
    use nx_domain::test_objects::{star_systems_from_edges, star_systems_from_undirected_edges};
    use nx_domain::{JumpLinkId, NavigationPathId};
    use nx_store::bmc::Bmc;
    use nx_store::{InMemorySystemsBmc, MockNavigationPathBmcTrait, MockSystemBmcTrait};
    use pathfinding::prelude::bfs;
    use std::collections::HashMap;
    use test_log::test;
    use tracing_test::traced_test;

    fn pp(link: i64, from: i64, to: i64) -> PathPoint {
        PathPoint {
            jump_link_id: JumpLinkId(link),
            from_star_system_id: StarSystemId(from),
            to_star_system_id: StarSystemId(to),
        }
    }

    #[test(tokio::test)]
    async fn linear_chain_respects_hop_limit() {
        let systems = star_systems_from_undirected_edges(7, &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7)]);
        let bmc = in_memory_bmc_with(&systems, &[]).await;
        let path_finder = path_finder_for(&bmc);

        let summary = path_finder.expand_from(&Ctx::Anonymous, StarSystemId(1)).await;

        let hop_counts = hop_counts_from(&bmc, StarSystemId(1)).await;
        let expected: HashMap<StarSystemId, usize> = (2..=6).map(|id| (StarSystemId(id), id as usize - 1)).collect();
        assert_eq!(hop_counts, expected);
        assert_eq!(summary.stored_paths, 5);
        assert_eq!(summary.failed_candidates, 0);
        assert_eq!(path_finder.get_path(&Ctx::Anonymous, StarSystemId(1), StarSystemId(7)).await, None);
    }

    #[test(tokio::test)]
    async fn stored_paths_are_contiguous_and_end_at_destination() {
        let systems = star_systems_from_undirected_edges(5, &[(1, 2), (2, 3), (3, 4), (2, 5), (5, 4)]);
        let bmc = in_memory_bmc_with(&systems, &[]).await;
        let path_finder = path_finder_for(&bmc);

        path_finder.expand_from(&Ctx::Anonymous, StarSystemId(1)).await;

        let path = path_finder
            .get_path(&Ctx::Anonymous, StarSystemId(1), StarSystemId(4))
            .await
            .expect("path 1 -> 4");
        assert_eq!(path.path_point_count, 3);
        assert_eq!(path.path_points.len(), 3);
        assert_eq!(path.path_points.first().map(|p| p.from_star_system_id), Some(StarSystemId(1)));
        assert_eq!(path.path_points.last().map(|p| p.to_star_system_id), Some(StarSystemId(4)));
        assert!(validate_contiguous(StarSystemId(1), &path.path_points).is_ok());
    }

    #[test(tokio::test)]
    async fn minimum_hop_counts_match_breadth_first_search() {
        let undirected = [
            (1, 2),
            (2, 3),
            (3, 4),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 8),
            (8, 9),
            (9, 10),
            (10, 11),
            (11, 12),
            (12, 1),
            (1, 7),
        ];
        let directed = [(3, 9), (5, 11), (10, 4)];
        let edges = undirected
            .iter()
            .flat_map(|(a, b)| [(*a, *b), (*b, *a)])
            .chain(directed.iter().copied())
            .collect_vec();

        let systems = star_systems_from_edges(12, &edges);
        let bmc = in_memory_bmc_with(&systems, &[]).await;
        let path_finder = path_finder_for(&bmc);

        for start in 1..=12 {
            path_finder.expand_from(&Ctx::Anonymous, StarSystemId(start)).await;
        }

        let successors = |node: &i64| edges.iter().filter(|(from, _)| from == node).map(|(_, to)| *to).collect_vec();

        for start in 1..=12 {
            for goal in (1..=12).filter(|goal| *goal != start) {
                let expected_hops = bfs(&start, successors, |node| *node == goal).map(|nodes| nodes.len() - 1);
                let actual_hops = path_finder
                    .get_path(&Ctx::Anonymous, StarSystemId(start), StarSystemId(goal))
                    .await
                    .map(|p| p.path_point_count);

                match expected_hops {
                    Some(hops) if hops <= MAX_PATH_POINTS => assert_eq!(actual_hops, Some(hops), "{start} -> {goal}"),
                    _ => assert_eq!(actual_hops, None, "{start} -> {goal}"),
                }
            }
        }

        assert!(all_paths(&bmc).await.iter().all(|p| p.path_point_count <= MAX_PATH_POINTS));
    }

    #[test(tokio::test)]
    async fn regeneration_on_unchanged_graph_stores_nothing_new() {
        let systems = star_systems_from_undirected_edges(6, &[(1, 2), (2, 3), (3, 4), (1, 5), (5, 4), (4, 6)]);
        let bmc = in_memory_bmc_with(&systems, &[]).await;
        let path_finder = path_finder_for(&bmc);

        let first = path_finder.expand_from(&Ctx::Anonymous, StarSystemId(1)).await;
        let paths_after_first_run = all_paths(&bmc).await;

        let second = path_finder.expand_from(&Ctx::Anonymous, StarSystemId(1)).await;

        assert!(first.stored_paths > 0);
        assert_eq!(second.stored_paths, 0);
        assert_eq!(all_paths(&bmc).await, paths_after_first_run);
    }

    #[test(tokio::test)]
    async fn shorter_path_supersedes_known_longer_path() {
        let systems = star_systems_from_edges(4, &[(1, 2), (2, 3), (3, 4), (1, 4)]);
        let bmc = in_memory_bmc_with(&systems, &[]).await;
        let path_finder = path_finder_for(&bmc);

        let long = NewNavigationPath::from_points(vec![pp(1, 1, 2), pp(2, 2, 3), pp(3, 3, 4)]).unwrap();
        bmc.navigation_path_bmc().save_navigation_path(&Ctx::Anonymous, &long).await.unwrap();

        path_finder.expand_from(&Ctx::Anonymous, StarSystemId(1)).await;
        let best = path_finder.get_path(&Ctx::Anonymous, StarSystemId(1), StarSystemId(4)).await.unwrap();
        assert_eq!(best.path_point_count, 1);
        assert_eq!(best.path_points, vec![pp(4, 1, 4)]);

        path_finder.expand_from(&Ctx::Anonymous, StarSystemId(1)).await;
        let still_best = path_finder.get_path(&Ctx::Anonymous, StarSystemId(1), StarSystemId(4)).await.unwrap();
        assert_eq!(still_best, best);
    }

    #[test(tokio::test)]
    async fn no_path_from_a_system_to_itself() {
        let systems = star_systems_from_undirected_edges(3, &[(1, 2), (2, 3), (3, 1)]);
        let bmc = in_memory_bmc_with(&systems, &[]).await;
        let path_finder = path_finder_for(&bmc);

        path_finder.expand_from(&Ctx::Anonymous, StarSystemId(1)).await;

        assert_eq!(path_finder.get_path(&Ctx::Anonymous, StarSystemId(1), StarSystemId(1)).await, None);
        assert!(all_paths(&bmc).await.iter().all(|p| p.from_star_system_id != p.to_star_system_id));
    }

    #[test(tokio::test)]
    async fn continues_from_given_path_so_far() {
        let systems = star_systems_from_edges(4, &[(1, 2), (2, 3), (3, 4)]);
        let bmc = in_memory_bmc_with(&systems, &[]).await;
        let path_finder = path_finder_for(&bmc);

        let summary = path_finder.generate_paths(&Ctx::Anonymous, StarSystemId(1), vec![pp(1, 1, 2)]).await;

        assert_eq!(summary.stored_paths, 2);
        assert_eq!(
            hop_counts_from(&bmc, StarSystemId(1)).await,
            HashMap::from([(StarSystemId(3), 2), (StarSystemId(4), 3)])
        );
    }

    #[test(tokio::test)]
    async fn self_loop_link_never_extends_a_path() {
        let systems = star_systems_from_edges(3, &[(1, 2), (2, 2), (2, 3)]);
        let bmc = in_memory_bmc_with(&systems, &[]).await;
        let path_finder = path_finder_for(&bmc);

        let summary = path_finder.generate_paths(&Ctx::Anonymous, StarSystemId(1), vec![pp(1, 1, 2)]).await;

        assert_eq!(summary.stored_paths, 1);
        assert_eq!(
            hop_counts_from(&bmc, StarSystemId(1)).await,
            HashMap::from([(StarSystemId(3), 2)])
        );
    }

    #[test(tokio::test)]
    async fn smaller_hop_limit_bounds_generated_paths() {
        let systems = star_systems_from_edges(5, &[(1, 2), (2, 3), (3, 4), (4, 5)]);
        let bmc = in_memory_bmc_with(&systems, &[]).await;
        let path_finder = path_finder_for(&bmc).with_max_path_points(2);

        path_finder.expand_from(&Ctx::Anonymous, StarSystemId(1)).await;

        assert_eq!(path_finder.max_path_points(), 2);
        assert_eq!(
            hop_counts_from(&bmc, StarSystemId(1)).await,
            HashMap::from([(StarSystemId(2), 1), (StarSystemId(3), 2)])
        );
    }

    #[test(tokio::test)]
    async fn non_contiguous_path_so_far_is_refused() {
        let systems = star_systems_from_edges(4, &[(1, 2), (2, 3), (3, 4)]);
        let bmc = in_memory_bmc_with(&systems, &[]).await;
        let path_finder = path_finder_for(&bmc);

        let summary = path_finder.generate_paths(&Ctx::Anonymous, StarSystemId(1), vec![pp(2, 2, 3)]).await;

        assert_eq!(summary, PathGenerationSummary::default());
        assert!(all_paths(&bmc).await.is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_write_does_not_abort_expansion() {
        let systems_bmc = InMemorySystemsBmc::new();
        for system in star_systems_from_edges(4, &[(1, 2), (1, 3), (3, 4)]) {
            systems_bmc.save_star_system(&Ctx::Anonymous, &system, chrono::Utc::now()).await.unwrap();
        }

        let mut navigation_path_bmc = MockNavigationPathBmcTrait::new();
        navigation_path_bmc.expect_get_best_path().returning(|_, _, _| Ok(None));
        navigation_path_bmc.expect_save_navigation_path().returning(|_, new_path| {
            if new_path.to_star_system_id == StarSystemId(2) {
                Err(anyhow!("disk full"))
            } else {
                Ok(new_path.clone().into_navigation_path(NavigationPathId(1)))
            }
        });

        let path_finder = PathFinder::new(Arc::new(systems_bmc), Arc::new(navigation_path_bmc));
        let summary = path_finder.expand_from(&Ctx::Anonymous, StarSystemId(1)).await;

        assert_eq!(
            summary,
            PathGenerationSummary {
                stored_paths: 2,
                pruned_candidates: 0,
                failed_candidates: 1,
            }
        );
        assert!(logs_contain("Failed to store navigation path 1 -> 2"));
    }

    #[test(tokio::test)]
    async fn lookup_error_is_reported_as_missing_path() {
        let mut navigation_path_bmc = MockNavigationPathBmcTrait::new();
        navigation_path_bmc
            .expect_get_best_path()
            .returning(|_, _, _| Err(anyhow!("connection reset")));

        let path_finder = PathFinder::new(Arc::new(MockSystemBmcTrait::new()), Arc::new(navigation_path_bmc));

        assert_eq!(path_finder.get_path(&Ctx::Anonymous, StarSystemId(1), StarSystemId(2)).await, None);
    }
}
