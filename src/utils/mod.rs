//! # 工具模块
//!
//! 这个模块包含各种工具函数和实用程序：
//!
//! - JSON 路径的安全读写
//! - 文本规范化与相似度比较
//!
//! # 模块组织
//!
//! - `path` - 按路径片段读写 JSON 树
//! - `text` - 文本规范化、相似度、原文判断

pub mod path;
pub mod text;

// Re-export commonly used items for convenience
pub use path::{
    get_text, get_value_by_path, get_value_by_path_mut, set_value_by_path, walk_objects,
    walk_objects_mut, PathSegment,
};
pub use text::{calculate_similarity, is_description_original, is_title_original, normalize_text};
