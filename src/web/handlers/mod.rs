//! Web 路由处理器

pub mod api;
pub mod proxy;

pub use api::*;
pub use proxy::*;
