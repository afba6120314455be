//! Web 路由定义

use std::sync::Arc;

use axum::{
    routing::{any, get, post},
    Router,
};

use crate::network::Transport;
use crate::web::{handlers::*, types::AppState};

/// 创建路由
pub fn create_routes<T: Transport + 'static>() -> Router<Arc<AppState<T>>> {
    Router::new()
        // 被拦截的接口
        .route("/youtubei/*path", any(proxy::<T>))
        // 管理接口
        .route("/api/config", get(get_config::<T>).post(update_config::<T>))
        .route("/api/process", post(process_json::<T>))
        .route("/api/stats", get(get_stats::<T>))
        .route("/api/history", get(get_history::<T>))
}
