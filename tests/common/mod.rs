// 集成测试公共模块
//
// 提供可编程的 fetch 原语和响应 JSON 构造器

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Value};

use notranslate::network::{FetchRequest, FetchResponse, Transport};
use notranslate::recovery::error::{RecoveryError, RecoveryResult};

pub const SEARCH_URL: &str = "https://www.youtube.com/youtubei/v1/search?prettyPrint=false";
pub const PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";

type Responder = Box<dyn Fn(&FetchRequest) -> RecoveryResult<FetchResponse> + Send + Sync>;

/// 记录请求并返回预设响应的 fetch 原语
pub struct MockTransport {
    requests: Mutex<Vec<FetchRequest>>,
    completed: Mutex<Vec<bool>>,
    responder: Responder,
    shadow_delay: Option<Duration>,
    original_delay: Option<Duration>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&FetchRequest) -> RecoveryResult<FetchResponse> + Send + Sync + 'static,
    {
        Self {
            requests: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            shadow_delay: None,
            original_delay: None,
        }
    }

    /// 按请求语言返回：影子请求得到 `clean`，其余得到 `translated`
    pub fn locale_aware(translated: Value, clean: Value) -> Self {
        Self::new(move |request| {
            let body = if is_shadow(request) { &clean } else { &translated };
            Ok(json_response(&request.url, 200, body))
        })
    }

    /// 影子请求在响应前等待
    pub fn with_shadow_delay(mut self, delay: Duration) -> Self {
        self.shadow_delay = Some(delay);
        self
    }

    /// 非影子请求在响应前等待
    pub fn with_original_delay(mut self, delay: Duration) -> Self {
        self.original_delay = Some(delay);
        self
    }

    /// 响应完成顺序，`true` 表示影子请求
    pub fn completion_order(&self) -> Vec<bool> {
        self.completed.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn shadow_count(&self) -> usize {
        self.requests().iter().filter(|r| is_shadow(r)).count()
    }
}

impl Transport for MockTransport {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = RecoveryResult<FetchResponse>> + Send {
        async move {
            let shadow = is_shadow(&request);
            let delay = if shadow {
                self.shadow_delay
            } else {
                self.original_delay
            };
            self.requests.lock().unwrap().push(request.clone());

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.completed.lock().unwrap().push(shadow);
            (self.responder)(&request)
        }
    }
}

/// 请求体中的 `context.client.hl`
pub fn request_locale(request: &FetchRequest) -> Option<String> {
    let body: Value = serde_json::from_slice(request.body.as_deref()?).ok()?;
    body["context"]["client"]["hl"].as_str().map(str::to_owned)
}

pub fn is_shadow(request: &FetchRequest) -> bool {
    request_locale(request).as_deref() == Some("lo")
}

pub fn json_response(url: &str, status: u16, body: &Value) -> FetchResponse {
    let mut response = FetchResponse::new(url, status, serde_json::to_vec(body).unwrap());
    response
        .headers
        .insert("content-type", "application/json".parse().unwrap());
    response
}

pub fn network_failure(message: &str) -> RecoveryResult<FetchResponse> {
    Err(RecoveryError::NetworkError(message.to_string()))
}

/// 页面发出的接口请求
pub fn page_request(url: &str) -> FetchRequest {
    FetchRequest::post_json(
        url,
        &json!({
            "context": {"client": {"hl": "fr", "gl": "FR", "clientName": "WEB"}},
            "query": "rust"
        }),
    )
    .unwrap()
}

// ============================================================================
// 响应构造器
// ============================================================================

/// 搜索结果：一个视频和一个频道
pub fn search_response(video_title: &str, snippet: &[&str], channel_title: &str) -> Value {
    let runs: Vec<Value> = snippet.iter().map(|text| json!({"text": text})).collect();
    json!({
        "contents": {"sectionListRenderer": {"contents": [{"itemSectionRenderer": {"contents": [
            {"videoRenderer": {
                "videoId": "vid001",
                "title": {"runs": [{"text": video_title}]},
                "descriptionSnippet": {"runs": runs}
            }},
            {"channelRenderer": {
                "channelId": "UCchan01",
                "title": {"simpleText": channel_title}
            }}
        ]}}]}}
    })
}

/// 观看页：主视频标题和描述
pub fn watch_response(title: &str, description: &str) -> Value {
    json!({
        "contents": {"twoColumnWatchNextResults": {"results": {"results": {"contents": [
            {"videoPrimaryInfoRenderer": {"title": {"runs": [{"text": title}]}}},
            {"videoSecondaryInfoRenderer": {"attributedDescription": {"content": description}}}
        ]}}}}
    })
}

/// 频道页眉
pub fn channel_header(page_title: Option<&str>, title: &str, description: &str) -> Value {
    let mut view_model = json!({
        "title": {"dynamicTextViewModel": {"text": {"content": title}}},
        "description": {"descriptionPreviewViewModel": {"description": {"content": description}}}
    });
    if let Some(page_title) = page_title {
        view_model["pageTitle"] = json!(page_title);
    }
    json!({"header": {"pageHeaderRenderer": {"content": {"pageHeaderViewModel": view_model}}}})
}

/// 独立播放器返回的数据
pub fn player_response(video_id: &str, title: &str, description: &str) -> Value {
    json!({
        "videoDetails": {
            "videoId": video_id,
            "title": title,
            "shortDescription": description
        }
    })
}
