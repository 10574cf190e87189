pub mod dataset;
pub mod stats;
pub mod translations;

pub use dataset::*;
pub use stats::*;
pub use translations::*;
