mod plan;
mod runner;

pub use plan::*;
pub use runner::*;
