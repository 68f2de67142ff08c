//! Content recurrence math utilities.

pub mod math;

pub use math::binomial;
pub use math::stable::*;
pub use math::summary::*;
