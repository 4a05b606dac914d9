pub mod companion_refresh;
pub mod configuration;
pub mod pathfinder;
pub mod report;
pub mod star_system_refresher;
pub mod trading;

#[cfg(test)]
pub mod test_objects;
