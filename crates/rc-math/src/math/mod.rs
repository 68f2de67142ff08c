//! Core math modules.

pub mod binomial;
pub mod stable;
pub mod summary;
