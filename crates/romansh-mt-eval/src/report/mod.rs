//! Presentation of evaluation results: LaTeX tables for the paper and JSON
//! exports.

pub mod cross_variety;
pub mod export;
pub mod latex;
pub mod table;

pub use cross_variety::*;
pub use export::*;
pub use latex::*;
pub use table::*;
