//! API 处理器

pub mod config;
pub mod process;
pub mod stats;

pub use config::*;
pub use process::*;
pub use stats::*;
