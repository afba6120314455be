//! 实时配置
//!
//! 拦截器在每次调用开始时读取一次快照；外部通过异步消息更新，后写者胜出，
//! 不影响正在进行中的调用。

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::manager::{Features, NetworkConfig};
use crate::recovery::error::{RecoveryError, RecoveryResult};

/// 配置消息，以 `type` 字段区分
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ConfigMessage {
    /// 替换功能开关
    #[serde(rename = "YNT_UPDATE_CONFIG")]
    UpdateFeatures { features: Features },
    /// 替换拦截的接口列表
    #[serde(rename = "YNT_UPDATE_ENDPOINTS")]
    UpdateEndpoints { endpoints: Vec<String> },
}

/// 共享的实时配置句柄
#[derive(Debug, Clone, Default)]
pub struct LiveConfig {
    inner: Arc<RwLock<NetworkConfig>>,
}

impl LiveConfig {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// 读取当前配置的快照
    pub fn snapshot(&self) -> RecoveryResult<NetworkConfig> {
        self.inner
            .read()
            .map_err(|e| RecoveryError::ConfigError(format!("读取配置失败: {}", e)))
            .map(|config| config.clone())
    }

    /// 合并一条配置消息
    pub fn apply(&self, message: ConfigMessage) -> RecoveryResult<()> {
        let mut config = self
            .inner
            .write()
            .map_err(|e| RecoveryError::ConfigError(format!("写入配置失败: {}", e)))?;

        match message {
            ConfigMessage::UpdateFeatures { features } => {
                config.features = features;
                tracing::info!(
                    "配置已更新: titles={}, descriptions={}",
                    features.titles,
                    features.descriptions
                );
            }
            ConfigMessage::UpdateEndpoints { endpoints } => {
                if endpoints.iter().any(|endpoint| endpoint.trim().is_empty()) {
                    return Err(RecoveryError::InvalidInput(
                        "接口路径不能为空".to_string(),
                    ));
                }
                tracing::info!("拦截接口已更新: {:?}", endpoints);
                config.endpoints = endpoints;
            }
        }

        Ok(())
    }

    /// 启动后台任务消费配置通道，通道关闭时任务结束
    pub fn spawn_listener(&self, mut receiver: mpsc::Receiver<ConfigMessage>) -> JoinHandle<()> {
        let live = self.clone();
        tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                if let Err(e) = live.apply(message) {
                    tracing::warn!("忽略配置消息: {}", e);
                }
            }
            tracing::debug!("配置通道已关闭");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_wire_format() {
        let message: ConfigMessage = serde_json::from_value(json!({
            "type": "YNT_UPDATE_CONFIG",
            "features": {"titles": false, "descriptions": true}
        }))
        .unwrap();

        assert_eq!(
            message,
            ConfigMessage::UpdateFeatures {
                features: Features {
                    titles: false,
                    descriptions: true
                }
            }
        );

        let unknown = serde_json::from_value::<ConfigMessage>(json!({"type": "OTHER"}));
        assert!(unknown.is_err());
    }

    #[test]
    fn test_apply_is_last_write_wins() {
        let live = LiveConfig::default();
        let before = live.snapshot().unwrap();

        live.apply(ConfigMessage::UpdateFeatures {
            features: Features {
                titles: false,
                descriptions: true,
            },
        })
        .unwrap();
        live.apply(ConfigMessage::UpdateEndpoints {
            endpoints: vec!["/youtubei/v1/next".to_string()],
        })
        .unwrap();

        let after = live.snapshot().unwrap();
        assert!(before.features.titles);
        assert!(!after.features.titles);
        assert!(after.features.descriptions);
        assert_eq!(after.endpoints, vec!["/youtubei/v1/next"]);

        assert!(live
            .apply(ConfigMessage::UpdateEndpoints {
                endpoints: vec![String::new()]
            })
            .is_err());
    }

    #[tokio::test]
    async fn test_listener_applies_messages() {
        let live = LiveConfig::default();
        let (tx, rx) = mpsc::channel(4);
        let handle = live.spawn_listener(rx);

        tx.send(ConfigMessage::UpdateFeatures {
            features: Features {
                titles: true,
                descriptions: true,
            },
        })
        .await
        .unwrap();
        drop(tx);
        handle.await.unwrap();

        assert!(live.snapshot().unwrap().features.descriptions);
    }
}
