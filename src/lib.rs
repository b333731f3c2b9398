pub mod chat;
pub mod config;
pub mod dify;
pub mod error;
pub mod server;
pub mod workflow;

pub use error::{Error, Result};
