//! 已修补响应的调试历史
//!
//! 保留最近若干条修补后的响应，便于排查替换结果。

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;

use crate::recovery::error::{RecoveryError, RecoveryResult};

/// 历史条目
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub url: String,
    /// RFC3339 时间戳
    pub recorded_at: String,
    pub title_changes: usize,
    pub description_changes: usize,
    pub json: Value,
}

/// 有界的响应历史，最新的在末尾
#[derive(Debug, Default)]
pub struct ResponseHistory {
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl ResponseHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条修补结果，超出容量时丢弃最旧的条目；容量为 0 时不记录
    pub fn record(
        &self,
        url: &str,
        title_changes: usize,
        description_changes: usize,
        json: Value,
        capacity: usize,
    ) -> RecoveryResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| RecoveryError::InternalError(format!("历史记录锁失败: {}", e)))?;

        if capacity == 0 {
            entries.clear();
            return Ok(());
        }

        entries.push_back(HistoryEntry {
            url: url.to_string(),
            recorded_at: chrono::Utc::now().to_rfc3339(),
            title_changes,
            description_changes,
            json,
        });

        while entries.len() > capacity {
            entries.pop_front();
        }

        Ok(())
    }

    /// 当前保留的全部条目
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn latest(&self) -> Option<HistoryEntry> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.back().cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
