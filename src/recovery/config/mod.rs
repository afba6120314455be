//! 拦截配置模块
//!
//! 配置文件、环境变量和默认值的合并，以及运行时可更新的实时配置

pub mod live;
pub mod manager;

// 重新导出主要类型
pub use live::{ConfigMessage, LiveConfig};
pub use manager::{ConfigManager, Features, NetworkConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    /// 默认拦截的接口
    pub const DEFAULT_ENDPOINTS: &[&str] = &[
        "/youtubei/v1/search",
        "/youtubei/v1/browse",
        "/youtubei/v1/next",
    ];

    /// 服务端识别为"不要本地化"的语言值
    pub const UNTRANSLATED_LOCALE: &str = "lo";

    pub const DEFAULT_SHADOW_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_HISTORY_SIZE: usize = 20;

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "notranslate.toml",
        ".notranslate.toml",
        "~/.config/notranslate/config.toml",
        "/etc/notranslate/config.toml",
    ];
}
