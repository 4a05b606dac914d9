#[allow(clippy::module_inception)]
pub mod pathfinder;

pub use pathfinder::*;
