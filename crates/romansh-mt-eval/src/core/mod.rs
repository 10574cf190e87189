pub mod errors;
pub mod postprocess;
pub mod settings;
pub mod variety;

pub use errors::*;
pub use postprocess::*;
pub use settings::*;
pub use variety::*;
