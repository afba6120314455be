//! 响应拦截
//!
//! 对命中的接口同时发出原始请求和一个语言被替换为"不翻译"的影子请求，
//! 用影子响应中的原文修补原始响应。任何环节失败都原样返回原始响应。
//!
//! 状态流转：`PassThrough` 直接转发；否则 `ShadowInFlight` → `Patching` → `Done`。

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::history::ResponseHistory;
use super::transport::{FetchRequest, FetchResponse, Transport};
use crate::recovery::config::{LiveConfig, NetworkConfig};
use crate::recovery::error::{helpers, RecoveryError, RecoveryResult};
use crate::recovery::processor::{DataProcessor, ProcessOutcome};
use crate::utils::path::{get_value_by_path_mut, PathSegment};

tokio::task_local! {
    /// 影子请求执行期间有效；其中到达的任何拦截器都直接转发
    static SHADOW_SCOPE: ();
}

/// 当前是否处于影子请求内部
pub fn in_shadow_scope() -> bool {
    SHADOW_SCOPE.try_with(|_| ()).is_ok()
}

const CLIENT_CONTEXT: &[PathSegment<'static>] =
    &[PathSegment::Key("context"), PathSegment::Key("client")];

/// 拦截阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PassThrough,
    ShadowInFlight,
    Patching,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::PassThrough => "PassThrough",
            Phase::ShadowInFlight => "ShadowInFlight",
            Phase::Patching => "Patching",
            Phase::Done => "Done",
        };
        f.write_str(name)
    }
}

/// 直接转发的原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum PassReason {
    /// 影子请求内部
    Reentrant,
    /// 无法读取配置
    ConfigUnavailable,
    /// 接口不在拦截列表中
    NotMatched,
    /// 所有功能都已关闭
    FeaturesDisabled,
    /// 请求体缺失、不是 JSON 或没有 `context.client`
    UnusableBody,
    /// 原始响应不是成功状态
    OriginalStatus(u16),
    /// 影子请求或修补失败
    RecoveryFailed(String),
}

/// 一次拦截的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InterceptOutcome {
    PassThrough(PassReason),
    /// 修补没有产生变化，返回原始响应
    Unchanged,
    Patched {
        title_changes: usize,
        description_changes: usize,
    },
}

/// 拦截后的响应及其结果
#[derive(Debug, Clone)]
pub struct Intercepted {
    pub response: FetchResponse,
    pub outcome: InterceptOutcome,
}

/// 拦截统计
#[derive(Debug, Default)]
pub struct InterceptStats {
    intercepted: AtomicU64,
    passed_through: AtomicU64,
    unchanged: AtomicU64,
    patched: AtomicU64,
    shadow_failures: AtomicU64,
}

/// 拦截统计快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterceptStatsSnapshot {
    pub intercepted: u64,
    pub passed_through: u64,
    pub unchanged: u64,
    pub patched: u64,
    pub shadow_failures: u64,
}

impl InterceptStats {
    pub fn snapshot(&self) -> InterceptStatsSnapshot {
        InterceptStatsSnapshot {
            intercepted: self.intercepted.load(Ordering::Relaxed),
            passed_through: self.passed_through.load(Ordering::Relaxed),
            unchanged: self.unchanged.load(Ordering::Relaxed),
            patched: self.patched.load(Ordering::Relaxed),
            shadow_failures: self.shadow_failures.load(Ordering::Relaxed),
        }
    }

    fn record(&self, outcome: &InterceptOutcome) {
        match outcome {
            InterceptOutcome::PassThrough(reason) => {
                self.passed_through.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("notranslate_passthrough_total").increment(1);
                if matches!(reason, PassReason::RecoveryFailed(_)) {
                    self.shadow_failures.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!("notranslate_shadow_failures_total").increment(1);
                }
            }
            InterceptOutcome::Unchanged => {
                self.unchanged.fetch_add(1, Ordering::Relaxed);
            }
            InterceptOutcome::Patched { .. } => {
                self.patched.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("notranslate_patched_total").increment(1);
            }
        }
    }
}

/// 构造影子请求：同一 URL，请求体中 `context.client.hl` 被替换为指定语言
pub fn build_shadow_request(request: &FetchRequest, locale: &str) -> RecoveryResult<FetchRequest> {
    let text = request
        .body_text()
        .ok_or_else(|| helpers::validation_error("请求体缺失或不是UTF-8"))?;
    let mut body: Value = serde_json::from_str(text)?;

    match get_value_by_path_mut(&mut body, CLIENT_CONTEXT) {
        Some(Value::Object(client)) => {
            client.insert("hl".to_string(), Value::String(locale.to_string()));
        }
        _ => return Err(helpers::validation_error("请求体中没有 context.client")),
    }

    let mut headers = request.headers.clone();
    headers.remove(CONTENT_LENGTH);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(FetchRequest {
        url: request.url.clone(),
        method: Method::POST,
        headers,
        body: Some(serde_json::to_vec(&body)?),
    })
}

/// 网络拦截器
pub struct NetworkInterceptor<T> {
    inner: T,
    config: LiveConfig,
    stats: Arc<InterceptStats>,
    history: Arc<ResponseHistory>,
}

impl<T: Transport> NetworkInterceptor<T> {
    pub fn new(inner: T, config: LiveConfig) -> Self {
        Self {
            inner,
            config,
            stats: Arc::new(InterceptStats::default()),
            history: Arc::new(ResponseHistory::new()),
        }
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    pub fn stats(&self) -> &InterceptStats {
        &self.stats
    }

    pub fn history(&self) -> &ResponseHistory {
        &self.history
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    async fn pass_through(
        &self,
        request: FetchRequest,
        reason: PassReason,
    ) -> RecoveryResult<Intercepted> {
        tracing::trace!("{} {}: {:?}", Phase::PassThrough, request.url, reason);
        let response = self.inner.fetch(request).await?;
        Ok(self.finish(response, InterceptOutcome::PassThrough(reason)))
    }

    fn finish(&self, response: FetchResponse, outcome: InterceptOutcome) -> Intercepted {
        self.stats.record(&outcome);
        Intercepted { response, outcome }
    }

    /// 拦截一次请求
    ///
    /// 只有原始请求本身失败时才返回 `Err`，与未拦截时调用方看到的错误一致。
    pub async fn intercept(&self, request: FetchRequest) -> RecoveryResult<Intercepted> {
        if in_shadow_scope() {
            return self.pass_through(request, PassReason::Reentrant).await;
        }

        // 每次调用开始时读取一次配置，之后的更新只影响下一次调用
        let config = match self.config.snapshot() {
            Ok(config) => config,
            Err(e) => {
                helpers::trace_error(&e);
                return self
                    .pass_through(request, PassReason::ConfigUnavailable)
                    .await;
            }
        };

        if !config.matches(&request.url) {
            return self.pass_through(request, PassReason::NotMatched).await;
        }

        if !config.features.any() {
            return self
                .pass_through(request, PassReason::FeaturesDisabled)
                .await;
        }

        let url = request.url.clone();
        let template = request.clone();

        // 原始请求先被轮询并发出，影子请求随后才构造；两个响应的到达顺序不作要求
        let shadow_future = async {
            let shadow_request = build_shadow_request(&template, &config.locale_override)?;

            self.stats.intercepted.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("notranslate_intercepted_total").increment(1);
            tracing::debug!("{} {}", Phase::ShadowInFlight, url);

            Ok::<_, RecoveryError>(
                SHADOW_SCOPE
                    .scope(
                        (),
                        tokio::time::timeout(
                            config.shadow_timeout(),
                            self.inner.fetch(shadow_request),
                        ),
                    )
                    .await,
            )
        };
        let (original, shadow) = tokio::join!(self.inner.fetch(request), shadow_future);

        let original = original?;
        let shadow = match shadow {
            Ok(shadow) => shadow,
            Err(e) => {
                tracing::debug!("无法构造影子请求 {}: {}", url, e);
                return Ok(self.finish(
                    original,
                    InterceptOutcome::PassThrough(PassReason::UnusableBody),
                ));
            }
        };

        if !original.is_success() {
            let reason = PassReason::OriginalStatus(original.status);
            return Ok(self.finish(original, InterceptOutcome::PassThrough(reason)));
        }

        let shadow = match shadow {
            Ok(Ok(response)) if response.is_success() => Ok(response),
            Ok(Ok(response)) => Err(RecoveryError::ShadowRequestRejected(format!(
                "状态码 {}",
                response.status
            ))),
            Ok(Err(e)) => Err(e),
            Err(elapsed) => Err(RecoveryError::from(elapsed)),
        };

        match shadow.and_then(|shadow| self.patch(&config, &original, &shadow)) {
            Ok((response, outcome)) => {
                tracing::debug!("{} {}: {:?}", Phase::Done, url, outcome);
                Ok(self.finish(response, outcome))
            }
            Err(e) => {
                helpers::trace_error(&e.clone().with_context(&url));
                Ok(self.finish(
                    original,
                    InterceptOutcome::PassThrough(PassReason::RecoveryFailed(e.to_string())),
                ))
            }
        }
    }

    fn patch(
        &self,
        config: &NetworkConfig,
        original: &FetchResponse,
        shadow: &FetchResponse,
    ) -> RecoveryResult<(FetchResponse, InterceptOutcome)> {
        tracing::debug!("{} {}", Phase::Patching, original.url);

        let original_json = original.json()?;
        let clean_json = shadow.json()?;

        let ProcessOutcome {
            data,
            title_changes,
            description_changes,
        } = DataProcessor::new(config.features).process(&original_json, &clean_json);

        if title_changes + description_changes == 0 {
            return Ok((original.clone(), InterceptOutcome::Unchanged));
        }

        let response = original.with_json_body(&data)?;
        tracing::info!(
            "已修补 {}: 标题 {} 个, 描述 {} 个",
            original.url,
            title_changes,
            description_changes
        );

        if let Err(e) = self.history.record(
            &original.url,
            title_changes,
            description_changes,
            data,
            config.history_size,
        ) {
            helpers::trace_error(&e);
        }

        Ok((
            response,
            InterceptOutcome::Patched {
                title_changes,
                description_changes,
            },
        ))
    }
}

impl<T: Transport> Transport for NetworkInterceptor<T> {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl std::future::Future<Output = RecoveryResult<FetchResponse>> + Send {
        async move {
            self.intercept(request)
                .await
                .map(|intercepted| intercepted.response)
        }
    }
}
