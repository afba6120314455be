//! 文本形状目录
//!
//! 同一段逻辑文本在接口响应中会以不同的嵌套布局出现：
//! 单个字符串（`simpleText`、`content`），或者 run 列表（`runs: [{text}, ...]`）。
//! 每个 [`ShapePattern`] 描述一种布局相对于实体节点的位置，
//! 提取时按优先级读取，替换时改写所有存在的布局。

use serde_json::Value;

use crate::utils::path::{get_value_by_path, get_value_by_path_mut, PathSegment};

use PathSegment::{Index, Key};

/// 形状种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// 路径直接指向字符串
    Scalar,
    /// 路径指向 run 列表，文本为各 run 的 `text` 拼接
    RunList,
}

/// 一种文本布局
#[derive(Debug, Clone, Copy)]
pub struct ShapePattern {
    pub name: &'static str,
    pub kind: ShapeKind,
    pub path: &'static [PathSegment<'static>],
}

impl ShapePattern {
    pub const fn scalar(name: &'static str, path: &'static [PathSegment<'static>]) -> Self {
        Self {
            name,
            kind: ShapeKind::Scalar,
            path,
        }
    }

    pub const fn run_list(name: &'static str, path: &'static [PathSegment<'static>]) -> Self {
        Self {
            name,
            kind: ShapeKind::RunList,
            path,
        }
    }

    /// 读取该布局下的文本
    ///
    /// 标量要求非空字符串，否则视为布局不存在。
    /// run 列表只要是数组就算存在，空数组或各 run 都没有文本时返回空字符串。
    pub fn read(&self, node: &Value) -> Option<String> {
        match (self.kind, get_value_by_path(node, self.path)?) {
            (ShapeKind::Scalar, Value::String(text)) if !text.is_empty() => Some(text.clone()),
            (ShapeKind::RunList, Value::Array(runs)) => Some(join_runs(runs)),
            _ => None,
        }
    }

    /// 用目标文本改写该布局，返回是否发生了变化
    ///
    /// 只改写已有的值；值与目标相同则跳过。run 列表的全文写入第一个 run，
    /// 其余 run 被移除，第一个 run 必须已有 `text` 字段。
    pub fn rewrite(&self, node: &mut Value, text: &str) -> bool {
        if self.kind == ShapeKind::Scalar {
            return rewrite_scalar_at(node, self.path, text);
        }

        match get_value_by_path_mut(node, self.path) {
            Some(Value::Array(runs)) => {
                if runs.is_empty() || join_runs(runs) == text {
                    return false;
                }
                let Some(Value::String(first)) = runs.get_mut(0).and_then(|run| run.get_mut("text"))
                else {
                    return false;
                };
                *first = text.to_string();
                runs.truncate(1);
                true
            }
            _ => false,
        }
    }
}

/// 改写固定路径上已有的非空字符串，返回是否发生了变化
pub fn rewrite_scalar_at(root: &mut Value, path: &[PathSegment<'_>], text: &str) -> bool {
    match get_value_by_path_mut(root, path) {
        Some(Value::String(current)) if !current.is_empty() && current.as_str() != text => {
            *current = text.to_string();
            true
        }
        _ => false,
    }
}

/// 拼接 run 列表中的文本，缺少 `text` 的 run 视为空串
pub fn join_runs(runs: &[Value]) -> String {
    runs.iter()
        .filter_map(|run| run.get("text").and_then(Value::as_str))
        .collect()
}

/// 按顺序返回第一个非空文本
pub fn first_non_empty(node: &Value, shapes: &[ShapePattern]) -> Option<String> {
    shapes
        .iter()
        .filter_map(|shape| shape.read(node))
        .find(|text| !text.is_empty())
}

/// 按顺序返回第一个存在的布局的文本；命中后不再查看后续布局
pub fn first_present(node: &Value, shapes: &[ShapePattern]) -> Option<String> {
    shapes
        .iter()
        .find_map(|shape| shape.read(node))
        .filter(|text| !text.is_empty())
}

/// 改写所有存在的布局，返回变化数
pub fn rewrite_all(node: &mut Value, shapes: &[ShapePattern], text: &str) -> usize {
    let mut changed = 0;
    for shape in shapes {
        if shape.rewrite(node, text) {
            tracing::trace!("改写布局 {} -> {}", shape.name, text);
            changed += 1;
        }
    }
    changed
}

/// 读取节点上的非空字符串标识符
pub fn identifier<'v>(node: &'v Value, key: &str) -> Option<&'v str> {
    match node.get(key) {
        Some(Value::String(id)) if !id.is_empty() => Some(id.as_str()),
        _ => None,
    }
}

// ============================================================================
// 实体标识符与布局目录
// ============================================================================

pub const VIDEO_ID_KEY: &str = "videoId";
pub const CHANNEL_ID_KEY: &str = "channelId";

/// 页眉实体没有自带标识时使用的固定键
pub const HEADER_FALLBACK_KEY: &str = "headerChannel";

/// 页眉视图模型相对于节点的位置
pub const PAGE_HEADER_VIEW_MODEL: &[PathSegment<'static>] = &[
    Key("pageHeaderRenderer"),
    Key("content"),
    Key("pageHeaderViewModel"),
];

const HEADER_PAGE_TITLE: &[PathSegment<'static>] = &[
    Key("pageHeaderRenderer"),
    Key("content"),
    Key("pageHeaderViewModel"),
    Key("pageTitle"),
];

const HEADER_EXTERNAL_ID: &[PathSegment<'static>] = &[
    Key("metadata"),
    Key("channelMetadataRenderer"),
    Key("externalId"),
];

/// 观看页主要内容列表
pub const WATCH_CONTENTS: &[PathSegment<'static>] = &[
    Key("contents"),
    Key("twoColumnWatchNextResults"),
    Key("results"),
    Key("results"),
    Key("contents"),
];

/// 视频标题布局（按优先级）
pub const VIDEO_TITLE_SHAPES: &[ShapePattern] = &[
    ShapePattern::scalar("title.runs[0].text", &[Key("title"), Key("runs"), Index(0), Key("text")]),
    ShapePattern::scalar("title.simpleText", &[Key("title"), Key("simpleText")]),
];

/// 频道标题布局
pub const CHANNEL_TITLE_SHAPES: &[ShapePattern] = &[ShapePattern::scalar(
    "title.simpleText",
    &[Key("title"), Key("simpleText")],
)];

/// 页眉标题布局
pub const HEADER_TITLE_SHAPES: &[ShapePattern] = &[ShapePattern::scalar(
    "pageHeaderViewModel.title.dynamicTextViewModel.text.content",
    &[
        Key("pageHeaderRenderer"),
        Key("content"),
        Key("pageHeaderViewModel"),
        Key("title"),
        Key("dynamicTextViewModel"),
        Key("text"),
        Key("content"),
    ],
)];

/// 视频描述布局（按优先级）
pub const VIDEO_DESCRIPTION_SHAPES: &[ShapePattern] = &[
    ShapePattern::run_list("descriptionSnippet.runs", &[Key("descriptionSnippet"), Key("runs")]),
    ShapePattern::run_list(
        "detailedMetadataSnippets[0].snippetText.runs",
        &[
            Key("detailedMetadataSnippets"),
            Index(0),
            Key("snippetText"),
            Key("runs"),
        ],
    ),
    ShapePattern::run_list("snippetText.runs", &[Key("snippetText"), Key("runs")]),
    ShapePattern::scalar("shortDescription", &[Key("shortDescription")]),
    ShapePattern::run_list("description.runs", &[Key("description"), Key("runs")]),
];

/// 频道描述布局
pub const CHANNEL_DESCRIPTION_SHAPES: &[ShapePattern] = &[ShapePattern::run_list(
    "descriptionSnippet.runs",
    &[Key("descriptionSnippet"), Key("runs")],
)];

/// 页眉描述布局
pub const HEADER_DESCRIPTION_SHAPES: &[ShapePattern] = &[ShapePattern::scalar(
    "pageHeaderViewModel.description.descriptionPreviewViewModel.description.content",
    &[
        Key("pageHeaderRenderer"),
        Key("content"),
        Key("pageHeaderViewModel"),
        Key("description"),
        Key("descriptionPreviewViewModel"),
        Key("description"),
        Key("content"),
    ],
)];

/// 计算页眉节点的键
///
/// 依次使用页眉标题、频道外部 ID，都没有时使用 [`HEADER_FALLBACK_KEY`]。
/// 节点不是页眉节点时返回 `None`。
pub fn header_key(node: &Value) -> Option<String> {
    match get_value_by_path(node, PAGE_HEADER_VIEW_MODEL) {
        Some(Value::Object(_)) => {}
        _ => return None,
    }

    let key = [HEADER_PAGE_TITLE, HEADER_EXTERNAL_ID]
        .iter()
        .find_map(|path| match get_value_by_path(node, path) {
            Some(Value::String(key)) if !key.is_empty() => Some(key.clone()),
            _ => None,
        })
        .unwrap_or_else(|| HEADER_FALLBACK_KEY.to_string());

    Some(key)
}

/// 在观看页内容列表中查找第一个包含指定渲染器的下标
pub fn find_watch_renderer(data: &Value, renderer: &str) -> Option<usize> {
    match get_value_by_path(data, WATCH_CONTENTS) {
        Some(Value::Array(items)) => items.iter().position(|item| item.get(renderer).is_some()),
        _ => None,
    }
}
