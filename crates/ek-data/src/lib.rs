pub mod references;
pub mod snapshots;

pub use references::*;
pub use snapshots::*;
