//! JSON 路径访问工具
//!
//! 按属性名/数组下标组成的路径安全地读取和写入 `serde_json::Value`。
//! 任意一段缺失、类型不符或下标越界都视为"不存在"，从不 panic。

use serde_json::Value;

/// 路径片段：对象属性名或数组下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathSegment<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for PathSegment<'a> {
    fn from(key: &'a str) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment<'_> {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

fn step<'v>(value: &'v Value, segment: &PathSegment<'_>) -> Option<&'v Value> {
    match (segment, value) {
        (PathSegment::Key(key), Value::Object(map)) => map.get(*key),
        (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
        _ => None,
    }
}

fn step_mut<'v>(value: &'v mut Value, segment: &PathSegment<'_>) -> Option<&'v mut Value> {
    match (segment, value) {
        (PathSegment::Key(key), Value::Object(map)) => map.get_mut(*key),
        (PathSegment::Index(index), Value::Array(items)) => items.get_mut(*index),
        _ => None,
    }
}

/// 读取路径上的值；空路径返回根节点本身
pub fn get_value_by_path<'v>(value: &'v Value, path: &[PathSegment<'_>]) -> Option<&'v Value> {
    path.iter().try_fold(value, step)
}

/// 可变版本的 [`get_value_by_path`]
pub fn get_value_by_path_mut<'v>(
    value: &'v mut Value,
    path: &[PathSegment<'_>],
) -> Option<&'v mut Value> {
    path.iter().try_fold(value, step_mut)
}

/// 写入路径上的值
///
/// 最后一段必须已经存在，写入才会发生，因此这里永远不会新增字段。
/// 返回是否真正写入。
pub fn set_value_by_path(root: &mut Value, path: &[PathSegment<'_>], new_value: Value) -> bool {
    if path.is_empty() {
        return false;
    }

    match get_value_by_path_mut(root, path) {
        Some(slot) => {
            *slot = new_value;
            true
        }
        None => false,
    }
}

/// 读取路径上的非空字符串（对应"真值"字符串）
pub fn get_text<'v>(value: &'v Value, path: &[PathSegment<'_>]) -> Option<&'v str> {
    match get_value_by_path(value, path) {
        Some(Value::String(text)) if !text.is_empty() => Some(text.as_str()),
        _ => None,
    }
}

/// 深度优先遍历树中的每个对象节点，每个节点恰好访问一次
pub fn walk_objects<F>(value: &Value, visit: &mut F)
where
    F: FnMut(&Value),
{
    match value {
        Value::Object(map) => {
            visit(value);
            for child in map.values() {
                walk_objects(child, visit);
            }
        }
        Value::Array(items) => {
            for child in items {
                walk_objects(child, visit);
            }
        }
        _ => {}
    }
}

/// 可变版本的 [`walk_objects`]
///
/// 先访问节点本身再进入子节点，访问中对子树的改写会被后续遍历看到。
pub fn walk_objects_mut<F>(value: &mut Value, visit: &mut F)
where
    F: FnMut(&mut Value),
{
    if value.is_object() {
        visit(value);
    }

    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                walk_objects_mut(child, visit);
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                walk_objects_mut(child, visit);
            }
        }
        _ => {}
    }
}
