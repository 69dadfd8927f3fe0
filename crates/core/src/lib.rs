//! Domain model and intake validation for clinical case orchestration.

pub mod case;
pub mod validate;

pub use case::*;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
