//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，覆盖拦截器、代理服务和页面对账三部分

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }

    /// 只在变量被显式设置时返回值，用于覆盖配置文件
    fn get_override() -> Option<EnvResult<T>> {
        env::var(Self::NAME).ok().map(|value| Self::parse(&value))
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 应用运行模式
    pub struct Mode;
    impl EnvVar<String> for Mode {
        const NAME: &'static str = "NOTRANSLATE_MODE";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("production".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Application mode: development, staging, production";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "development" | "dev" => Ok("development".to_string()),
                "staging" | "stage" => Ok("staging".to_string()),
                "production" | "prod" => Ok("production".to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid mode '{}'. Use: development, staging, production",
                        value
                    ),
                }),
            }
        }
    }

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "NOTRANSLATE_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 拦截器相关环境变量
pub mod interceptor {
    use super::*;

    /// 标题恢复开关
    pub struct Titles;
    impl EnvVar<bool> for Titles {
        const NAME: &'static str = "NOTRANSLATE_TITLES";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Restore original titles in intercepted responses";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 描述恢复开关
    pub struct Descriptions;
    impl EnvVar<bool> for Descriptions {
        const NAME: &'static str = "NOTRANSLATE_DESCRIPTIONS";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Restore original descriptions in intercepted responses";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 拦截的接口路径（逗号分隔）
    pub struct Endpoints;
    impl EnvVar<Vec<String>> for Endpoints {
        const NAME: &'static str = "NOTRANSLATE_ENDPOINTS";
        const DEFAULT: Option<Vec<String>> = None;
        const DESCRIPTION: &'static str =
            "Comma-separated API path substrings to intercept (e.g. /youtubei/v1/next)";

        fn parse(value: &str) -> EnvResult<Vec<String>> {
            let endpoints: Vec<String> = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            if endpoints.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "At least one endpoint is required".to_string(),
                });
            }

            Ok(endpoints)
        }
    }

    /// 影子请求使用的语言
    pub struct Locale;
    impl EnvVar<String> for Locale {
        const NAME: &'static str = "NOTRANSLATE_LOCALE";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("lo".to_string()),
            }
        }
        const DESCRIPTION: &'static str =
            "Locale written into the shadow request to ask for untranslated content";

        fn parse(value: &str) -> EnvResult<String> {
            let locale = value.trim();
            if locale.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Locale cannot be empty".to_string(),
                });
            }
            Ok(locale.to_string())
        }
    }

    /// 影子请求超时
    pub struct ShadowTimeout;
    impl EnvVar<Duration> for ShadowTimeout {
        const NAME: &'static str = "NOTRANSLATE_SHADOW_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30));
        const DESCRIPTION: &'static str = "Shadow request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 300)
        }
    }

    /// 响应历史条数
    pub struct HistorySize;
    impl EnvVar<usize> for HistorySize {
        const NAME: &'static str = "NOTRANSLATE_HISTORY_SIZE";
        const DEFAULT: Option<usize> = Some(20);
        const DESCRIPTION: &'static str = "Number of patched responses kept for debugging";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 0, 1000)
        }
    }
}

/// Web 代理相关环境变量
pub mod web {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "NOTRANSLATE_WEB_BIND_ADDRESS";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("127.0.0.1".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Proxy server bind address";

        fn parse(value: &str) -> EnvResult<String> {
            let addr = value.trim();
            if addr.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Address cannot be empty".to_string(),
                });
            }
            Ok(addr.to_string())
        }
    }

    /// 端口
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "NOTRANSLATE_WEB_PORT";
        const DEFAULT: Option<u16> = Some(7080);
        const DESCRIPTION: &'static str = "Proxy server port";

        fn parse(value: &str) -> EnvResult<u16> {
            let port: u16 = value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (1-65535)".to_string(),
            })?;

            if port < 1024 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Ports below 1024 require root privileges".to_string(),
                });
            }

            Ok(port)
        }
    }

    /// 上游地址
    pub struct UpstreamUrl;
    impl EnvVar<String> for UpstreamUrl {
        const NAME: &'static str = "NOTRANSLATE_UPSTREAM_URL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("https://www.youtube.com".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Upstream base URL that proxied API calls are sent to";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim().trim_end_matches('/');
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Upstream URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// 上游请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "NOTRANSLATE_REQUEST_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(60));
        const DESCRIPTION: &'static str = "Upstream request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 600)
        }
    }
}

/// 页面对账相关环境变量
pub mod reconcile {
    use super::*;

    /// 文本缓存容量
    pub struct CacheSize;
    impl EnvVar<usize> for CacheSize {
        const NAME: &'static str = "NOTRANSLATE_CACHE_SIZE";
        const DEFAULT: Option<usize> = Some(500);
        const DESCRIPTION: &'static str = "Original text cache size (number of entries)";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 100000)
        }
    }

    /// 文本缓存整体清空周期
    pub struct CacheTtl;
    impl EnvVar<Duration> for CacheTtl {
        const NAME: &'static str = "NOTRANSLATE_CACHE_TTL";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30 * 60));
        const DESCRIPTION: &'static str = "Seconds after which the original text cache is cleared";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 60, 86400 * 7)
        }
    }

    /// 描述相似度阈值
    pub struct SimilarityThreshold;
    impl EnvVar<f64> for SimilarityThreshold {
        const NAME: &'static str = "NOTRANSLATE_SIMILARITY_THRESHOLD";
        const DEFAULT: Option<f64> = Some(0.75);
        const DESCRIPTION: &'static str =
            "Similarity above which a rendered description counts as original (0-1)";

        fn parse(value: &str) -> EnvResult<f64> {
            let threshold: f64 = value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid number".to_string(),
            })?;

            if !(0.0..=1.0).contains(&threshold) {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Threshold must be between 0 and 1".to_string(),
                });
            }

            Ok(threshold)
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_seconds(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<Duration> {
    let seconds: u64 = value.parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number of seconds".to_string(),
    })?;

    if seconds < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Too short (minimum {} seconds)", min),
        });
    }

    if seconds > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Too long (maximum {} seconds)", max),
        });
    }

    Ok(Duration::from_secs(seconds))
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    // 核心配置
    pub mode: String,
    pub log_level: String,
    pub no_color: bool,

    // 拦截器配置
    pub titles: bool,
    pub descriptions: bool,
    pub endpoints: Option<Vec<String>>,
    pub locale: String,
    pub shadow_timeout: Duration,
    pub history_size: usize,

    // Web 配置
    pub web_bind_address: String,
    pub web_port: u16,
    pub upstream_url: String,
    pub request_timeout: Duration,

    // 对账配置
    pub cache_size: usize,
    pub cache_ttl: Duration,
    pub similarity_threshold: f64,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            mode: core::Mode::get()?,
            log_level: core::LogLevel::get()?,
            no_color: core::NoColor::get()?,

            titles: interceptor::Titles::get()?,
            descriptions: interceptor::Descriptions::get()?,
            endpoints: interceptor::Endpoints::get_override().transpose()?,
            locale: interceptor::Locale::get()?,
            shadow_timeout: interceptor::ShadowTimeout::get()?,
            history_size: interceptor::HistorySize::get()?,

            web_bind_address: web::BindAddress::get()?,
            web_port: web::Port::get()?,
            upstream_url: web::UpstreamUrl::get()?,
            request_timeout: web::RequestTimeout::get()?,

            cache_size: reconcile::CacheSize::get()?,
            cache_ttl: reconcile::CacheTtl::get()?,
            similarity_threshold: reconcile::SimilarityThreshold::get()?,
        })
    }

    /// 打印配置摘要
    pub fn print_summary(&self) {
        println!("Environment Configuration Summary:");
        println!("  Mode: {}", self.mode);
        println!("  Log Level: {}", self.log_level);
        println!(
            "  Titles: {}",
            if self.titles { "enabled" } else { "disabled" }
        );
        println!(
            "  Descriptions: {}",
            if self.descriptions { "enabled" } else { "disabled" }
        );
        println!("  Proxy: {}:{} -> {}", self.web_bind_address, self.web_port, self.upstream_url);
    }
}

fn push_entry<T: fmt::Debug>(docs: &mut String, name: &str, description: &str, default: Option<T>) {
    docs.push_str(&format!("- `{}`: {} (default: {:?})\n", name, description, default));
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    push_entry(&mut docs, core::Mode::NAME, core::Mode::DESCRIPTION, Some("production"));
    push_entry(&mut docs, core::LogLevel::NAME, core::LogLevel::DESCRIPTION, Some("info"));
    push_entry(&mut docs, core::NoColor::NAME, core::NoColor::DESCRIPTION, core::NoColor::DEFAULT);

    docs.push_str("\n## Interceptor Configuration\n\n");
    push_entry(
        &mut docs,
        interceptor::Titles::NAME,
        interceptor::Titles::DESCRIPTION,
        interceptor::Titles::DEFAULT,
    );
    push_entry(
        &mut docs,
        interceptor::Descriptions::NAME,
        interceptor::Descriptions::DESCRIPTION,
        interceptor::Descriptions::DEFAULT,
    );
    push_entry(
        &mut docs,
        interceptor::Endpoints::NAME,
        interceptor::Endpoints::DESCRIPTION,
        interceptor::Endpoints::DEFAULT,
    );
    push_entry(
        &mut docs,
        interceptor::Locale::NAME,
        interceptor::Locale::DESCRIPTION,
        Some("lo"),
    );
    push_entry(
        &mut docs,
        interceptor::ShadowTimeout::NAME,
        interceptor::ShadowTimeout::DESCRIPTION,
        interceptor::ShadowTimeout::DEFAULT,
    );
    push_entry(
        &mut docs,
        interceptor::HistorySize::NAME,
        interceptor::HistorySize::DESCRIPTION,
        interceptor::HistorySize::DEFAULT,
    );

    docs.push_str("\n## Proxy Server Configuration\n\n");
    push_entry(&mut docs, web::BindAddress::NAME, web::BindAddress::DESCRIPTION, Some("127.0.0.1"));
    push_entry(&mut docs, web::Port::NAME, web::Port::DESCRIPTION, web::Port::DEFAULT);
    push_entry(
        &mut docs,
        web::UpstreamUrl::NAME,
        web::UpstreamUrl::DESCRIPTION,
        Some("https://www.youtube.com"),
    );
    push_entry(
        &mut docs,
        web::RequestTimeout::NAME,
        web::RequestTimeout::DESCRIPTION,
        web::RequestTimeout::DEFAULT,
    );

    docs.push_str("\n## Reconciliation Configuration\n\n");
    push_entry(
        &mut docs,
        reconcile::CacheSize::NAME,
        reconcile::CacheSize::DESCRIPTION,
        reconcile::CacheSize::DEFAULT,
    );
    push_entry(
        &mut docs,
        reconcile::CacheTtl::NAME,
        reconcile::CacheTtl::DESCRIPTION,
        reconcile::CacheTtl::DEFAULT,
    );
    push_entry(
        &mut docs,
        reconcile::SimilarityThreshold::NAME,
        reconcile::SimilarityThreshold::DESCRIPTION,
        reconcile::SimilarityThreshold::DEFAULT,
    );

    docs
}

/// 初始化日志输出到标准错误；级别取自 `NOTRANSLATE_LOG_LEVEL`，设置 `NO_COLOR` 时关闭颜色
pub fn init_tracing() {
    let level = core::LogLevel::get_or_default("info".to_string())
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    let no_color = core::NoColor::get_or_default(false);

    // 重复初始化时保留已有的订阅者
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .try_init();
}
