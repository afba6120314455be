//! 请求原语抽象
//!
//! [`Transport`] 代表页面使用的 fetch 原语。拦截器包装任意 `Transport`，
//! 自身也实现 `Transport`，因此可以层层叠加。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;

use crate::recovery::error::{RecoveryError, RecoveryResult};

/// 发出的请求
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// 以 JSON 为请求体的 POST 请求
    pub fn post_json(url: impl Into<String>, body: &Value) -> RecoveryResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self {
            url: url.into(),
            method: Method::POST,
            headers,
            body: Some(serde_json::to_vec(body)?),
        })
    }

    /// 由页面调用的两个参数组装请求：`init` 中的字段覆盖请求对象自带的字段
    pub fn from_input(input: RequestInput, init: RequestInit) -> RecoveryResult<Self> {
        let mut request = match input {
            RequestInput::Url(url) => {
                let parsed = url::Url::parse(&url)?;
                Self::get(parsed.to_string())
            }
            RequestInput::Parsed(url) => Self::get(url.to_string()),
            RequestInput::Request(request) => request,
        };

        if let Some(method) = init.method {
            request.method = method;
        }
        if let Some(headers) = init.headers {
            request.headers = headers;
        }
        if let Some(body) = init.body {
            request.body = Some(body.into_bytes());
        }

        Ok(request)
    }

    /// 请求体的文本形式；不存在或不是 UTF-8 时返回 `None`
    pub fn body_text(&self) -> Option<&str> {
        self.body
            .as_deref()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }
}

/// 请求的第一个参数：字符串 URL、已解析的 URL 或自带请求体的请求对象
#[derive(Debug, Clone)]
pub enum RequestInput {
    Url(String),
    Parsed(url::Url),
    Request(FetchRequest),
}

impl From<&str> for RequestInput {
    fn from(url: &str) -> Self {
        RequestInput::Url(url.to_string())
    }
}

impl From<url::Url> for RequestInput {
    fn from(url: url::Url) -> Self {
        RequestInput::Parsed(url)
    }
}

impl From<FetchRequest> for RequestInput {
    fn from(request: FetchRequest) -> Self {
        RequestInput::Request(request)
    }
}

/// 请求的第二个参数
#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    pub method: Option<Method>,
    pub headers: Option<HeaderMap>,
    /// 纯文本请求体，或不存在
    pub body: Option<String>,
}

/// 收到的响应
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or_default()
            .to_string();

        Self {
            url: url.into(),
            status,
            status_text,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 解析响应体为 JSON
    pub fn json(&self) -> RecoveryResult<Value> {
        serde_json::from_slice(&self.body).map_err(|e| {
            RecoveryError::ParseError(format!("响应不是有效的JSON: {}", e)).with_context(&self.url)
        })
    }

    /// 构造携带新 JSON 响应体的响应，状态码、状态文本和响应头原样复制
    pub fn with_json_body(&self, data: &Value) -> RecoveryResult<Self> {
        Ok(Self {
            url: self.url.clone(),
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            body: serde_json::to_vec(data)?,
        })
    }
}

/// fetch 原语
pub trait Transport: Send + Sync {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = RecoveryResult<FetchResponse>> + Send;

    /// 以页面调用的形式发出请求
    fn fetch_input(
        &self,
        input: RequestInput,
        init: RequestInit,
    ) -> impl Future<Output = RecoveryResult<FetchResponse>> + Send {
        async move {
            let request = FetchRequest::from_input(input, init)?;
            self.fetch(request).await
        }
    }
}

impl<T: Transport> Transport for Arc<T> {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = RecoveryResult<FetchResponse>> + Send {
        (**self).fetch(request)
    }
}

/// 基于 reqwest 的真实网络请求
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> RecoveryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| RecoveryError::ConfigError(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = RecoveryResult<FetchResponse>> + Send {
        let client = self.client.clone();
        async move {
            let mut builder = client
                .request(request.method, &request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;
            let status = response.status();
            let url = response.url().to_string();
            let mut headers = response.headers().clone();
            // 响应体已被解压，原始长度不再适用
            headers.remove(CONTENT_LENGTH);
            let body = response.bytes().await?.to_vec();

            tracing::trace!("{} {} ({} 字节)", status, url, body.len());

            Ok(FetchResponse {
                url,
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
                body,
            })
        }
    }
}
