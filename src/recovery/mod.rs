//! # 原文恢复模块
//!
//! 在两棵结构相似的响应树之间按实体标识符复制文本：
//! 从干净（未翻译）的树中提取原文，再写回到真实响应的副本中。
//!
//! ## 模块组织
//!
//! - `shapes` - 文本布局目录与读写
//! - `titles` - 标题提取与替换
//! - `descriptions` - 描述提取与替换
//! - `chapters` - 从描述中解析章节
//! - `processor` - 按功能开关组合标题与描述处理
//! - `config` - 拦截配置
//! - `error` - 错误类型

use serde::Serialize;
use serde_json::Value;

pub mod chapters;
pub mod config;
pub mod descriptions;
pub mod error;
pub mod processor;
pub mod shapes;
pub mod titles;

pub use chapters::{find_chapter_by_time, parse_chapters, time_string_to_seconds, Chapter};
pub use config::{ConfigManager, ConfigMessage, Features, LiveConfig, NetworkConfig};
pub use descriptions::{extract_descriptions, replace_descriptions, DescriptionExtraction};
pub use error::{RecoveryError, RecoveryResult};
pub use processor::{DataProcessor, ProcessOutcome};
pub use titles::{extract_titles, replace_titles, TitleExtraction};

/// 替换结果：修补后的副本与实际变化的字段数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replacement {
    pub data: Value,
    pub changes: usize,
}
