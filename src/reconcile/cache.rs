//! 原文缓存
//!
//! 按视频 ID 缓存原始标题和描述。容量有上限，超过清空周期后整体清空。

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;

/// 一个视频的原文
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedTexts {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl CachedTexts {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// 缓存统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub clears: u64,
}

/// 原文缓存
pub struct TextCache {
    entries: LruCache<String, CachedTexts>,
    ttl: Duration,
    last_cleared: Instant,
    stats: TextCacheStats,
}

impl TextCache {
    pub const DEFAULT_CAPACITY: usize = 500;
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            ttl,
            last_cleared: Instant::now(),
            stats: TextCacheStats::default(),
        }
    }

    /// 超过清空周期时清空全部条目，返回是否清空
    fn clear_if_due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_cleared) <= self.ttl {
            return false;
        }

        tracing::debug!("原文缓存过期，清空 {} 个条目", self.entries.len());
        self.entries.clear();
        self.last_cleared = now;
        self.stats.clears += 1;
        true
    }

    pub fn get(&mut self, video_id: &str) -> Option<CachedTexts> {
        self.get_at(video_id, Instant::now())
    }

    fn get_at(&mut self, video_id: &str, now: Instant) -> Option<CachedTexts> {
        self.clear_if_due(now);

        match self.entries.get(video_id) {
            Some(texts) => {
                self.stats.hits += 1;
                Some(texts.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, video_id: &str, texts: CachedTexts) {
        self.clear_if_due(Instant::now());
        self.entries.put(video_id.to_string(), texts);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_cleared = Instant::now();
    }

    pub fn stats(&self) -> TextCacheStats {
        self.stats
    }
}

impl Default for TextCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY, Self::DEFAULT_TTL)
    }
}
