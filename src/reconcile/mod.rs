//! # 页面对账
//!
//! 页面上的变化被归一为少量语义事件，通过通道交给 [`Reconciler`]。
//! 对账器把渲染出的文本与缓存的原文比较，不一致时恢复原文。
//! 原文通过独立的播放器数据源获取，再交给与网络拦截相同的提取函数。
//!
//! - `cache` - 按视频缓存的原文

use std::future::Future;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;

pub mod cache;

pub use cache::{CachedTexts, TextCache, TextCacheStats};

use crate::env::{reconcile as reconcile_env, EnvVar};
use crate::recovery::chapters::{parse_chapters, Chapter};
use crate::recovery::descriptions::extract_descriptions;
use crate::recovery::error::{helpers, ErrorStats, RecoveryError, RecoveryResult};
use crate::utils::path::{get_text, PathSegment};
use crate::utils::text::{is_description_original, is_title_original};

const VIDEO_DETAILS_TITLE: &[PathSegment<'static>] =
    &[PathSegment::Key("videoDetails"), PathSegment::Key("title")];

/// 语义事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// 切换到新视频
    VideoChanged { video_id: String },
    /// 描述被展开
    DescriptionExpanded { video_id: String },
    /// 页面内容发生变化
    ContentMutated,
}

/// 独立播放器实例提供的数据
pub trait PlayerDataSource: Send + Sync {
    /// 获取视频的播放器响应 JSON
    fn player_response(&self, video_id: &str)
        -> impl Future<Output = RecoveryResult<Value>> + Send;
}

/// 页面上渲染出的内容
pub trait RenderedPage: Send {
    fn rendered_title(&self) -> Option<String>;
    fn rendered_description(&self) -> Option<String>;
    fn restore_title(&mut self, title: &str);
    fn restore_description(&mut self, description: &str);
    fn restore_chapters(&mut self, chapters: &[Chapter]);
}

/// 对账配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileConfig {
    pub cache_size: usize,
    pub cache_ttl: std::time::Duration,
    pub similarity_threshold: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            cache_size: TextCache::DEFAULT_CAPACITY,
            cache_ttl: TextCache::DEFAULT_TTL,
            similarity_threshold: 0.75,
        }
    }
}

impl ReconcileConfig {
    /// 从环境变量读取，无效值回退到默认值
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_size: reconcile_env::CacheSize::get_or_default(defaults.cache_size),
            cache_ttl: reconcile_env::CacheTtl::get_or_default(defaults.cache_ttl),
            similarity_threshold: reconcile_env::SimilarityThreshold::get_or_default(
                defaults.similarity_threshold,
            ),
        }
    }
}

/// 一次页面会话：从进入某个视频开始，到切换到下一个视频为止
#[derive(Debug, Clone)]
pub struct PageSession {
    pub video_id: String,
    pub started_at: DateTime<Utc>,
    pub title_restored: bool,
    pub description_restored: bool,
    pub chapters: Vec<Chapter>,
}

impl PageSession {
    pub fn new(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            started_at: Utc::now(),
            title_restored: false,
            description_restored: false,
            chapters: Vec::new(),
        }
    }
}

/// 一次事件处理的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub title_restored: bool,
    pub description_restored: bool,
    pub chapters_restored: usize,
}

/// 对账器
pub struct Reconciler<S, P> {
    source: S,
    page: P,
    cache: TextCache,
    session: Option<PageSession>,
    similarity_threshold: f64,
    errors: ErrorStats,
}

impl<S: PlayerDataSource, P: RenderedPage> Reconciler<S, P> {
    pub fn new(source: S, page: P, config: ReconcileConfig) -> Self {
        Self {
            source,
            page,
            cache: TextCache::new(config.cache_size, config.cache_ttl),
            session: None,
            similarity_threshold: config.similarity_threshold,
            errors: ErrorStats::default(),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn session(&self) -> Option<&PageSession> {
        self.session.as_ref()
    }

    pub fn cache(&self) -> &TextCache {
        &self.cache
    }

    pub fn error_stats(&self) -> &ErrorStats {
        &self.errors
    }

    /// 消费事件直到通道关闭；单个事件失败只记录，不会终止循环
    pub async fn run(mut self, mut events: mpsc::Receiver<ReconcileEvent>) -> Self {
        while let Some(event) = events.recv().await {
            if let Err(e) = self.handle(event).await {
                helpers::trace_error(&e);
                self.errors.record_error(&e);
            }
        }
        tracing::debug!("对账事件通道已关闭");
        self
    }

    /// 处理单个事件
    pub async fn handle(&mut self, event: ReconcileEvent) -> RecoveryResult<ReconcileReport> {
        tracing::debug!("对账事件: {:?}", event);
        match event {
            ReconcileEvent::VideoChanged { video_id } => {
                self.start_session(&video_id);
                let texts = self.load_texts(&video_id).await?;
                Ok(self.restore(&texts, false))
            }
            ReconcileEvent::DescriptionExpanded { video_id } => {
                if self.session.as_ref().map(|s| s.video_id.as_str()) != Some(video_id.as_str()) {
                    self.start_session(&video_id);
                }
                let texts = self.load_texts(&video_id).await?;
                Ok(self.restore(&texts, true))
            }
            ReconcileEvent::ContentMutated => {
                let Some(video_id) = self.session.as_ref().map(|s| s.video_id.clone()) else {
                    return Ok(ReconcileReport::default());
                };
                // 只与缓存比较，不触发新的获取
                match self.cache.get(&video_id) {
                    Some(texts) => Ok(self.restore(&texts, false)),
                    None => Ok(ReconcileReport::default()),
                }
            }
        }
    }

    fn start_session(&mut self, video_id: &str) {
        if let Some(previous) = self.session.replace(PageSession::new(video_id)) {
            tracing::debug!(
                "结束会话 {} (开始于 {})",
                previous.video_id,
                previous.started_at.to_rfc3339()
            );
        }
    }

    async fn load_texts(&mut self, video_id: &str) -> RecoveryResult<CachedTexts> {
        if let Some(texts) = self.cache.get(video_id) {
            return Ok(texts);
        }

        let data = self
            .source
            .player_response(video_id)
            .await
            .map_err(|e| e.with_context(format!("视频 {}", video_id)))?;

        let descriptions = extract_descriptions(&data);
        let texts = CachedTexts {
            title: get_text(&data, VIDEO_DETAILS_TITLE).map(str::to_owned),
            description: descriptions
                .video_descriptions
                .get(video_id)
                .cloned()
                .or(descriptions.main_video_description),
        };

        if texts.is_empty() {
            return Err(RecoveryError::ParseError(format!(
                "播放器数据中没有视频 {} 的原文",
                video_id
            )));
        }

        self.cache.insert(video_id, texts.clone());
        Ok(texts)
    }

    /// 恢复与原文不一致的渲染文本；`force_description` 时总是写入描述和章节
    fn restore(&mut self, texts: &CachedTexts, force_description: bool) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        if let (Some(original), Some(rendered)) = (&texts.title, self.page.rendered_title()) {
            if !is_title_original(original, &rendered) {
                self.page.restore_title(original);
                report.title_restored = true;
            }
        }

        if let Some(original) = &texts.description {
            let mismatched = self
                .page
                .rendered_description()
                .is_some_and(|rendered| {
                    !is_description_original(original, &rendered, self.similarity_threshold)
                });

            if force_description || mismatched {
                self.page.restore_description(original);
                report.description_restored = true;

                let chapters = parse_chapters(original);
                if !chapters.is_empty() {
                    self.page.restore_chapters(&chapters);
                    report.chapters_restored = chapters.len();
                }
                if let Some(session) = self.session.as_mut() {
                    session.chapters = chapters;
                }
            }
        }

        if let Some(session) = self.session.as_mut() {
            session.title_restored |= report.title_restored;
            session.description_restored |= report.description_restored;
        }

        if report.title_restored || report.description_restored {
            tracing::info!(
                "已恢复原文: 标题 {}, 描述 {}, 章节 {}",
                report.title_restored,
                report.description_restored,
                report.chapters_restored
            );
        }

        report
    }
}
