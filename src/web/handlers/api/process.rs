//! 离线处理接口
//!
//! 直接提交一对响应 JSON，返回修补结果，不经过网络。

use std::sync::Arc;

use axum::{
    extract::{Json as ExtractJson, State},
    http::StatusCode,
    response::Json,
};

use crate::network::Transport;
use crate::recovery::processor::{DataProcessor, ProcessOutcome};
use crate::web::types::{api_error, ApiError, AppState, ProcessRequest};

/// 用 `clean` 中的原文修补 `original`
pub async fn process_json<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    ExtractJson(request): ExtractJson<ProcessRequest>,
) -> Result<Json<ProcessOutcome>, ApiError> {
    let features = match request.features {
        Some(features) => features,
        None => {
            state
                .interceptor
                .config()
                .snapshot()
                .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?
                .features
        }
    };

    let outcome = DataProcessor::new(features).process(&request.original, &request.clean);
    tracing::info!(
        "处理完成: 标题 {} 个, 描述 {} 个",
        outcome.title_changes,
        outcome.description_changes
    );

    Ok(Json(outcome))
}
