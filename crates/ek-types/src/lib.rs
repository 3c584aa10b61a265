pub mod config;
pub mod errors;
pub mod problem;

pub use config::*;
pub use errors::*;
pub use problem::*;
