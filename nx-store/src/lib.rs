pub mod bmc;
pub mod ctx;
pub mod db;
pub mod item_bmc;
pub mod market_bmc;
pub mod navigation_path_bmc;
pub mod system_bmc;

pub use ctx::*;
pub use db::*;
pub use item_bmc::*;
pub use market_bmc::*;
pub use navigation_path_bmc::*;
pub use system_bmc::*;
