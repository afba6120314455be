//! 数据处理器
//!
//! 按启用的功能依次处理标题和描述：从干净响应提取，再替换到真实响应中。
//! 不依赖网络层，任何来源的 JSON 树都可以直接交给它。

use serde::Serialize;
use serde_json::Value;

use super::config::Features;
use super::descriptions::{extract_descriptions, replace_descriptions};
use super::titles::{extract_titles, replace_titles};

/// 处理结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessOutcome {
    pub data: Value,
    pub title_changes: usize,
    pub description_changes: usize,
}

impl ProcessOutcome {
    pub fn total_changes(&self) -> usize {
        self.title_changes + self.description_changes
    }

    pub fn is_changed(&self) -> bool {
        self.total_changes() > 0
    }
}

/// 数据处理器
#[derive(Debug, Clone, Copy, Default)]
pub struct DataProcessor {
    features: Features,
}

impl DataProcessor {
    pub fn new(features: Features) -> Self {
        Self { features }
    }

    pub fn features(&self) -> Features {
        self.features
    }

    /// 用干净响应中的原文修补真实响应
    ///
    /// 返回的数据总是新的副本；某项提取为空时跳过该项的替换。
    pub fn process(&self, original: &Value, clean: &Value) -> ProcessOutcome {
        let mut outcome = ProcessOutcome {
            data: original.clone(),
            title_changes: 0,
            description_changes: 0,
        };

        if self.features.titles {
            let titles = extract_titles(clean);
            if titles.is_empty() {
                tracing::debug!("干净响应中没有标题");
            } else {
                let replaced = replace_titles(&outcome.data, &titles);
                outcome.data = replaced.data;
                outcome.title_changes = replaced.changes;
            }
        }

        if self.features.descriptions {
            let descriptions = extract_descriptions(clean);
            if descriptions.is_empty() {
                tracing::debug!("干净响应中没有描述");
            } else {
                let replaced = replace_descriptions(&outcome.data, &descriptions);
                outcome.data = replaced.data;
                outcome.description_changes = replaced.changes;
            }
        }

        outcome
    }
}
