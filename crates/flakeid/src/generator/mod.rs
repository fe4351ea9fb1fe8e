mod config;
mod lock;

pub use config::*;
pub use lock::*;
