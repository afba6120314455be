//! Web 服务器模块
//!
//! 本地反向代理：页面的 `/youtubei/*` 请求经过拦截器转发到上游，
//! 另外提供读取和更新实时配置、离线处理、统计的管理接口。

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;

pub use config::*;
pub use handlers::*;
pub use routes::*;
pub use types::*;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::network::{NetworkInterceptor, ReqwestTransport, Transport};
use crate::recovery::config::{LiveConfig, NetworkConfig};
use crate::recovery::error::{RecoveryError, RecoveryResult};

/// Web 服务器
pub struct WebServer {
    config: WebConfig,
    network: NetworkConfig,
}

impl WebServer {
    /// 创建新的 Web 服务器
    pub fn new(config: WebConfig, network: NetworkConfig) -> Self {
        Self { config, network }
    }

    /// 启动 Web 服务器
    pub async fn start(&self) -> RecoveryResult<()> {
        let transport = ReqwestTransport::new(self.config.request_timeout)?;
        let interceptor = NetworkInterceptor::new(transport, LiveConfig::new(self.network.clone()));

        let app_state = Arc::new(AppState {
            interceptor: Arc::new(interceptor),
            upstream_url: self.config.upstream_url.clone(),
        });

        let app = create_router(app_state);

        let listener = tokio::net::TcpListener::bind(self.config.listen_address())
            .await
            .map_err(|e| RecoveryError::NetworkError(format!("绑定地址失败: {}", e)))?;

        tracing::info!(
            "代理服务器启动于 http://{}，上游 {}",
            self.config.listen_address(),
            self.config.upstream_url
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| RecoveryError::InternalError(format!("服务器错误: {}", e)))?;

        Ok(())
    }
}

/// 创建路由器
pub fn create_router<T: Transport + 'static>(app_state: Arc<AppState<T>>) -> Router {
    create_routes::<T>()
        .with_state(app_state)
        .layer(CorsLayer::permissive())
}
