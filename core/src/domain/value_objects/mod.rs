//! Value objects shared across the domain

pub mod actor;
pub mod test_type;

pub use actor::Actor;
pub use test_type::{TestType, TestTypeSet};
