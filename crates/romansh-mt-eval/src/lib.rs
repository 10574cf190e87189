//! Machine-translation evaluation for the six Romansh varieties against German
//! on WMT24++ Romansh.
//!
//! [`Evaluation`] joins a [`SystemTranslations`] submission with the reference
//! rows of its variety and scores both directions per domain with a
//! [`MetricKind`]. [`SystemCatalog`] loads the benchmarked systems' outputs from
//! disk, and the [`report`] module turns results into paper tables.

pub mod core;
pub mod data;
pub mod evaluate;
pub mod loaders;
pub mod metrics;
pub mod report;
pub mod utils;

pub use core::*;
pub use data::*;
pub use evaluate::*;
pub use loaders::*;
pub use metrics::*;
pub use report::*;
pub use utils::*;
