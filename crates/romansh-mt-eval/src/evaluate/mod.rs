//! The evaluation engine and the result types it produces.

pub mod align;
pub mod engine;
pub mod results;

pub use align::*;
pub use engine::*;
pub use results::*;
