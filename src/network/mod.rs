//! # 网络模块
//!
//! 这个模块包含请求拦截相关的功能：
//!
//! - fetch 原语抽象与基于 reqwest 的实现
//! - 影子请求拦截器
//! - 已修补响应的调试历史
//!
//! # 模块组织
//!
//! - `transport` - 请求/响应类型、`Transport` 特性、reqwest 实现
//! - `interceptor` - 拦截状态机、重入保护、统计
//! - `history` - 有界的响应历史

pub mod history;
pub mod interceptor;
pub mod transport;

// Re-export commonly used items for convenience
pub use history::{HistoryEntry, ResponseHistory};
pub use interceptor::{
    build_shadow_request, in_shadow_scope, InterceptOutcome, InterceptStats,
    InterceptStatsSnapshot, Intercepted, NetworkInterceptor, PassReason, Phase,
};
pub use transport::{
    FetchRequest, FetchResponse, ReqwestTransport, RequestInit, RequestInput, Transport,
};
