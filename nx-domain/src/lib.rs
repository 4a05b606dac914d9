pub mod navigation;
pub mod nx_model;
pub mod trading;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_objects;

pub use navigation::*;
pub use nx_model::*;
pub use trading::*;
