use crate::{JumpLink, JumpLinkId, NavigationPathId, StarSystemId};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Upper bound for the number of hops a memoized path may have.
pub const MAX_PATH_POINTS: usize = 5;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct PathPoint {
    pub jump_link_id: JumpLinkId,
    pub from_star_system_id: StarSystemId,
    pub to_star_system_id: StarSystemId,
}

impl From<&JumpLink> for PathPoint {
    fn from(link: &JumpLink) -> Self {
        Self {
            jump_link_id: link.id,
            from_star_system_id: link.from_star_system_id,
            to_star_system_id: link.to_star_system_id,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct NavigationPath {
    pub id: NavigationPathId,
    pub from_star_system_id: StarSystemId,
    pub to_star_system_id: StarSystemId,
    pub path_point_count: usize,
    pub path_points: Vec<PathPoint>,
}

impl NavigationPath {
    pub fn hop_count(&self) -> usize {
        self.path_point_count
    }
}

/// A path candidate which hasn't been assigned an id by a store yet.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct NewNavigationPath {
    pub from_star_system_id: StarSystemId,
    pub to_star_system_id: StarSystemId,
    pub path_points: Vec<PathPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathValidationError {
    #[error("Path from {0:?} leads back to itself")]
    SelfPath(StarSystemId),
    #[error("Path from {from:?} to {to:?} has no path points")]
    Empty { from: StarSystemId, to: StarSystemId },
    #[error("Path point {index} doesn't continue from {expected:?}")]
    NotContiguous { index: usize, expected: StarSystemId },
    #[error("Path ends at {actual:?} instead of {expected:?}")]
    WrongDestination { expected: StarSystemId, actual: StarSystemId },
}

impl NewNavigationPath {
    /// Builds a candidate from its ordered points. Returns `None` for an empty list.
    pub fn from_points(path_points: Vec<PathPoint>) -> Option<Self> {
        let first = path_points.first()?;
        let last = path_points.last()?;
        Some(Self {
            from_star_system_id: first.from_star_system_id,
            to_star_system_id: last.to_star_system_id,
            path_points,
        })
    }

    pub fn path_point_count(&self) -> usize {
        self.path_points.len()
    }

    pub fn is_shorter_than(&self, other: &NavigationPath) -> bool {
        self.path_point_count() < other.path_point_count
    }

    pub fn validate(&self) -> Result<(), PathValidationError> {
        if self.from_star_system_id == self.to_star_system_id {
            return Err(PathValidationError::SelfPath(self.from_star_system_id));
        }
        if self.path_points.is_empty() {
            return Err(PathValidationError::Empty {
                from: self.from_star_system_id,
                to: self.to_star_system_id,
            });
        }
        validate_contiguous(self.from_star_system_id, &self.path_points)?;

        let actual = self.path_points.last().map(|pp| pp.to_star_system_id).unwrap_or(self.from_star_system_id);
        if actual != self.to_star_system_id {
            return Err(PathValidationError::WrongDestination {
                expected: self.to_star_system_id,
                actual,
            });
        }
        Ok(())
    }

    pub fn into_navigation_path(self, id: NavigationPathId) -> NavigationPath {
        NavigationPath {
            id,
            from_star_system_id: self.from_star_system_id,
            to_star_system_id: self.to_star_system_id,
            path_point_count: self.path_points.len(),
            path_points: self.path_points,
        }
    }
}

/// Checks that `path_points` start at `start` and that every hop continues where the previous one ended.
pub fn validate_contiguous(start: StarSystemId, path_points: &[PathPoint]) -> Result<(), PathValidationError> {
    let mut expected = start;
    for (index, pp) in path_points.iter().enumerate() {
        if pp.from_star_system_id != expected {
            return Err(PathValidationError::NotContiguous { index, expected });
        }
        expected = pp.to_star_system_id;
    }
    Ok(())
}

pub fn format_path(path_points: &[PathPoint]) -> String {
    match path_points.first() {
        None => String::new(),
        Some(first) => std::iter::once(first.from_star_system_id)
            .chain(path_points.iter().map(|pp| pp.to_star_system_id))
            .map(|id| id.0.to_string())
            .join(" -> "),
    }
}
