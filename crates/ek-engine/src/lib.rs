//! Runtime statistics of problem units: expected running time, success
//! rates, simulated restarts, and the collection that merges duplicate units.

pub mod collection;
pub mod consistency;
pub mod cut;
pub mod merge;
pub mod runtime;
pub mod sampling;
pub mod snapshot;
pub mod stats;
pub mod summary;
pub mod unit;

pub use collection::*;
pub use consistency::*;
pub use runtime::DEFAULT_FINAL_TARGET;
pub use sampling::*;
pub use snapshot::*;
pub use stats::{argsort_nan_last, cmp_nan_last, fmin, nanmin, prctile, sort_nan_last, sp, SuccessPerformance};
pub use unit::*;
