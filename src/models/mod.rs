pub mod github;
pub mod stats;

pub use github::*;
pub use stats::*;
