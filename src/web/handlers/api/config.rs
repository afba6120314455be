//! 实时配置接口

use std::sync::Arc;

use axum::{
    extract::{Json as ExtractJson, State},
    http::StatusCode,
    response::Json,
};

use crate::network::Transport;
use crate::recovery::config::{ConfigMessage, NetworkConfig};
use crate::recovery::error::RecoveryError;
use crate::web::types::{api_error, ApiError, AppState};

/// 读取当前配置
pub async fn get_config<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
) -> Result<Json<NetworkConfig>, ApiError> {
    state
        .interceptor
        .config()
        .snapshot()
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))
}

/// 合并一条配置消息，返回更新后的配置
pub async fn update_config<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    ExtractJson(message): ExtractJson<ConfigMessage>,
) -> Result<Json<NetworkConfig>, ApiError> {
    let live = state.interceptor.config();

    live.apply(message).map_err(|e| match e {
        RecoveryError::InvalidInput(_) => api_error(StatusCode::BAD_REQUEST, e),
        _ => api_error(StatusCode::INTERNAL_SERVER_ERROR, e),
    })?;

    live.snapshot()
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))
}
