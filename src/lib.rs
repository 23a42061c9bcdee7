pub mod corner;
pub mod error;
pub mod logging;
pub mod migrate;
pub mod model;
