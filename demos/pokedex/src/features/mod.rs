//! Application features, one module per slice of state.

pub mod counter;
pub mod pokemon;
