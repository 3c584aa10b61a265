//! Target value resolution: fixed thresholds, or thresholds derived from the
//! run lengths a reference algorithm needed.

pub mod labels;
pub mod reference;
pub mod runlength;
pub mod values;

pub use labels::num2str;
pub use reference::{ReferenceLoader, ReferenceMap, ReferenceSource};
pub use runlength::{RunlengthBasedTargetValues, DEFAULT_SMALLEST_TARGET};
pub use values::{discretize, TargetValues, Targets};
