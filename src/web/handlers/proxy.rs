//! 接口代理
//!
//! 把 `/youtubei/*` 请求转发到上游，响应经过拦截器修补后返回。

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::Response,
};

use crate::network::{FetchRequest, InterceptOutcome, Transport};
use crate::web::types::{api_error, ApiError, AppState};

/// 转发前移除的请求头
const STRIPPED_REQUEST_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
    "accept-encoding",
];

/// 返回前移除的响应头，响应体已解压且可能被改写
const STRIPPED_RESPONSE_HEADERS: &[&str] = &["content-length", "content-encoding", "transfer-encoding"];

fn strip_headers(headers: &mut HeaderMap, names: &[&str]) {
    for name in names {
        headers.remove(*name);
    }
}

/// 拼接上游地址
pub fn upstream_url(upstream: &str, uri: &Uri) -> String {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!("{}{}", upstream.trim_end_matches('/'), path)
}

/// 代理处理器
pub async fn proxy<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    method: Method,
    uri: Uri,
    mut headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    strip_headers(&mut headers, STRIPPED_REQUEST_HEADERS);

    let request = FetchRequest {
        url: upstream_url(&state.upstream_url, &uri),
        method,
        headers,
        body: (!body.is_empty()).then(|| body.to_vec()),
    };

    tracing::debug!("代理请求: {} {}", request.method, request.url);

    let intercepted = state.interceptor.intercept(request).await.map_err(|e| {
        tracing::warn!("上游请求失败: {}", e);
        api_error(StatusCode::BAD_GATEWAY, format!("上游请求失败: {}", e))
    })?;

    if let InterceptOutcome::Patched {
        title_changes,
        description_changes,
    } = intercepted.outcome
    {
        tracing::debug!(
            "响应已修补: 标题 {}, 描述 {}",
            title_changes,
            description_changes
        );
    }

    let fetched = intercepted.response;
    let mut response = Response::new(Body::from(fetched.body));
    *response.status_mut() = StatusCode::from_u16(fetched.status).unwrap_or(StatusCode::BAD_GATEWAY);
    *response.headers_mut() = fetched.headers;
    strip_headers(response.headers_mut(), STRIPPED_RESPONSE_HEADERS);

    Ok(response)
}
