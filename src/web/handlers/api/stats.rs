//! 统计与历史接口

use std::sync::Arc;

use axum::{extract::State, response::Json};

use crate::network::{HistoryEntry, Transport};
use crate::web::types::{AppState, StatsResponse};

pub async fn get_stats<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
) -> Json<StatsResponse> {
    Json(StatsResponse {
        intercept: state.interceptor.stats().snapshot(),
        history_len: state.interceptor.history().len(),
    })
}

/// 最近修补过的响应，最新的在末尾
pub async fn get_history<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
) -> Json<Vec<HistoryEntry>> {
    Json(state.interceptor.history().entries())
}
