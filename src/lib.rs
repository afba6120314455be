//! # NoTranslate Library
//!
//! 撤销视频平台对标题和描述的自动翻译：对同一个接口再发一次"不翻译"语言的影子请求，
//! 用影子响应中的原文修补真实响应。
//!
//! ## 模块组织
//!
//! - `recovery` - 原文提取与替换、配置、错误类型（纯 JSON 树操作，不依赖网络）
//! - `network` - fetch 原语抽象、响应拦截器、修补历史
//! - `reconcile` - 页面对账循环与原文缓存
//! - `utils` - JSON 路径与文本工具
//! - `env` - 类型安全的环境变量
//! - `web` - 拦截代理服务器（可选）

pub mod env;
pub mod network;
pub mod reconcile;
pub mod recovery;
pub mod utils;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used items for convenience
pub use network::{
    FetchRequest, FetchResponse, InterceptOutcome, NetworkInterceptor, ReqwestTransport,
    Transport,
};
pub use reconcile::{ReconcileEvent, Reconciler};
pub use recovery::{
    extract_descriptions, extract_titles, replace_descriptions, replace_titles, ConfigManager,
    ConfigMessage, DataProcessor, Features, LiveConfig, NetworkConfig, RecoveryError,
    RecoveryResult,
};
