pub mod trade_route_engine;

pub use trade_route_engine::*;
