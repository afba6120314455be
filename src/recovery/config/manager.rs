//! 配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::recovery::error::{RecoveryError, RecoveryResult};

/// 功能开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Features {
    pub titles: bool,
    pub descriptions: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            titles: true,
            descriptions: false,
        }
    }
}

impl Features {
    pub fn any(&self) -> bool {
        self.titles || self.descriptions
    }
}

/// 拦截配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// 需要拦截的接口路径片段，按子串匹配
    pub endpoints: Vec<String>,
    pub features: Features,
    /// 写入影子请求 `context.client.hl` 的值
    pub locale_override: String,
    pub shadow_timeout_secs: u64,
    pub history_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            endpoints: constants::DEFAULT_ENDPOINTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            features: Features::default(),
            locale_override: constants::UNTRANSLATED_LOCALE.to_string(),
            shadow_timeout_secs: constants::DEFAULT_SHADOW_TIMEOUT.as_secs(),
            history_size: constants::DEFAULT_HISTORY_SIZE,
        }
    }
}

impl NetworkConfig {
    /// 验证配置
    pub fn validate(&self) -> RecoveryResult<()> {
        if self.endpoints.iter().any(|endpoint| endpoint.trim().is_empty()) {
            return Err(RecoveryError::ConfigError("接口路径不能为空".to_string()));
        }

        if self.locale_override.trim().is_empty() {
            return Err(RecoveryError::ConfigError("影子请求语言不能为空".to_string()));
        }

        if self.shadow_timeout_secs == 0 {
            return Err(RecoveryError::ConfigError("影子请求超时不能为0".to_string()));
        }

        Ok(())
    }

    /// 判断 URL 是否命中拦截列表
    pub fn matches(&self, url: &str) -> bool {
        self.endpoints
            .iter()
            .any(|endpoint| url.contains(endpoint.as_str()))
    }

    pub fn shadow_timeout(&self) -> Duration {
        Duration::from_secs(self.shadow_timeout_secs)
    }

    /// 应用环境变量覆盖，只有显式设置的变量才会生效
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{interceptor, EnvVar};

        fn apply<T>(name: &str, value: Option<crate::env::EnvResult<T>>, slot: &mut T) {
            match value {
                Some(Ok(value)) => *slot = value,
                Some(Err(e)) => tracing::warn!("忽略无效的环境变量 {}: {}", name, e),
                None => {}
            }
        }

        apply(
            interceptor::Titles::NAME,
            interceptor::Titles::get_override(),
            &mut self.features.titles,
        );
        apply(
            interceptor::Descriptions::NAME,
            interceptor::Descriptions::get_override(),
            &mut self.features.descriptions,
        );
        apply(
            interceptor::Endpoints::NAME,
            interceptor::Endpoints::get_override(),
            &mut self.endpoints,
        );
        apply(
            interceptor::Locale::NAME,
            interceptor::Locale::get_override(),
            &mut self.locale_override,
        );
        apply(
            interceptor::HistorySize::NAME,
            interceptor::HistorySize::get_override(),
            &mut self.history_size,
        );

        let mut timeout = self.shadow_timeout();
        apply(
            interceptor::ShadowTimeout::NAME,
            interceptor::ShadowTimeout::get_override(),
            &mut timeout,
        );
        self.shadow_timeout_secs = timeout.as_secs();
    }
}

/// 配置管理器
pub struct ConfigManager {
    config: NetworkConfig,
}

impl ConfigManager {
    /// 创建新的配置管理器：查找配置文件、应用环境变量并验证
    pub fn new() -> RecoveryResult<Self> {
        Self::load_dotenv();
        let config = Self::load_config()?;
        Self::finish(config)
    }

    /// 使用指定的配置文件
    pub fn from_file(path: &str) -> RecoveryResult<Self> {
        Self::load_dotenv();
        let expanded = shellexpand::tilde(path);
        let config = Self::load_from_file(&expanded)?;
        Self::finish(config)
    }

    fn finish(mut config: NetworkConfig) -> RecoveryResult<Self> {
        config.apply_env_overrides();
        config.validate()?;
        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn into_config(self) -> NetworkConfig {
        self.config
    }

    /// 查找配置文件，找不到时使用默认配置
    fn load_config() -> RecoveryResult<NetworkConfig> {
        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(NetworkConfig::default())
    }

    /// 从指定文件加载配置
    pub fn load_from_file(path: &str) -> RecoveryResult<NetworkConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RecoveryError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        if path.ends_with(".toml") {
            toml::from_str(&content)
                .map_err(|e| RecoveryError::ConfigError(format!("解析TOML配置失败: {}", e)))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| RecoveryError::ConfigError(format!("解析JSON配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env.development", ".env.production", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> RecoveryResult<()> {
        let config = NetworkConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| RecoveryError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| RecoveryError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
