//! Web 模块的数据类型定义

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::network::{InterceptStatsSnapshot, NetworkInterceptor};
use crate::recovery::config::Features;

/// 应用状态
pub struct AppState<T> {
    pub interceptor: Arc<NetworkInterceptor<T>>,
    /// 上游地址，不带结尾斜杠
    pub upstream_url: String,
}

/// 处理请求：用 `clean` 中的原文修补 `original`
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub original: Value,
    pub clean: Value,
    /// 不提供时使用当前的实时配置
    pub features: Option<Features>,
}

/// 统计响应
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub intercept: InterceptStatsSnapshot,
    pub history_len: usize,
}

/// 错误响应
pub type ApiError = (StatusCode, Json<Value>);

pub fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (
        status,
        Json(serde_json::json!({
            "error": true,
            "message": message.to_string()
        })),
    )
}
