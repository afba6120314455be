//! 标题提取与替换
//!
//! 从干净（未翻译）的响应中收集视频、频道和页眉的原始标题，
//! 再按标识符写回到真实响应的副本中。

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::shapes::{
    find_watch_renderer, first_non_empty, header_key, identifier, rewrite_all, rewrite_scalar_at,
    CHANNEL_ID_KEY, CHANNEL_TITLE_SHAPES, HEADER_TITLE_SHAPES, VIDEO_ID_KEY, VIDEO_TITLE_SHAPES,
    WATCH_CONTENTS,
};
use super::Replacement;
use crate::utils::path::{get_text, walk_objects, walk_objects_mut, PathSegment};

const PRIMARY_INFO_RENDERER: &str = "videoPrimaryInfoRenderer";

/// 标题提取结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TitleExtraction {
    /// videoId -> 原始标题
    pub video_titles: BTreeMap<String, String>,
    /// channelId 或页眉键 -> 原始标题
    pub channel_titles: BTreeMap<String, String>,
    /// 观看页主视频标题
    pub main_video_title: Option<String>,
}

impl TitleExtraction {
    pub fn is_empty(&self) -> bool {
        self.video_titles.is_empty()
            && self.channel_titles.is_empty()
            && self.main_video_title.is_none()
    }

    /// 提取到的标题总数（含主视频标题）
    pub fn len(&self) -> usize {
        self.video_titles.len()
            + self.channel_titles.len()
            + usize::from(self.main_video_title.is_some())
    }
}

/// 主视频标题所在的固定路径
fn main_title_path(index: usize) -> Vec<PathSegment<'static>> {
    let mut path = WATCH_CONTENTS.to_vec();
    path.extend([
        PathSegment::Index(index),
        PathSegment::Key(PRIMARY_INFO_RENDERER),
        PathSegment::Key("title"),
        PathSegment::Key("runs"),
        PathSegment::Index(0),
        PathSegment::Key("text"),
    ]);
    path
}

fn extract_main_title(data: &Value) -> Option<String> {
    let index = find_watch_renderer(data, PRIMARY_INFO_RENDERER)?;
    get_text(data, &main_title_path(index)).map(str::to_owned)
}

/// 从干净响应中提取原始标题
pub fn extract_titles(data: &Value) -> TitleExtraction {
    let mut result = TitleExtraction {
        main_video_title: extract_main_title(data),
        ..Default::default()
    };

    walk_objects(data, &mut |node| {
        // 同时带有 videoId 的节点是视频实体，其中的 channelId 只是引用
        if let Some(video_id) = identifier(node, VIDEO_ID_KEY) {
            if let Some(title) = first_non_empty(node, VIDEO_TITLE_SHAPES) {
                result.video_titles.insert(video_id.to_string(), title);
            }
        } else if let Some(channel_id) = identifier(node, CHANNEL_ID_KEY) {
            if let Some(title) = first_non_empty(node, CHANNEL_TITLE_SHAPES) {
                result.channel_titles.insert(channel_id.to_string(), title);
            }
        }

        if let Some(key) = header_key(node) {
            if let Some(title) = first_non_empty(node, HEADER_TITLE_SHAPES) {
                result.channel_titles.insert(key, title);
            }
        }
    });

    tracing::debug!(
        "提取标题: 视频 {} 个, 频道 {} 个, 主标题 {}",
        result.video_titles.len(),
        result.channel_titles.len(),
        result.main_video_title.is_some()
    );

    result
}

/// 将原始标题写回真实响应的副本
///
/// 输入不会被修改；只改写已存在且与目标不同的字段。
pub fn replace_titles(data: &Value, extraction: &TitleExtraction) -> Replacement {
    let mut patched = data.clone();
    let mut changes = 0;

    walk_objects_mut(&mut patched, &mut |node| {
        let title = match identifier(node, VIDEO_ID_KEY) {
            Some(video_id) => extraction
                .video_titles
                .get(video_id)
                .map(|title| (VIDEO_TITLE_SHAPES, title.clone())),
            None => identifier(node, CHANNEL_ID_KEY)
                .and_then(|channel_id| extraction.channel_titles.get(channel_id))
                .map(|title| (CHANNEL_TITLE_SHAPES, title.clone())),
        };
        if let Some((shapes, title)) = title {
            changes += rewrite_all(node, shapes, &title);
        }

        if let Some(title) = header_key(node).and_then(|key| extraction.channel_titles.get(&key)) {
            changes += rewrite_all(node, HEADER_TITLE_SHAPES, title);
        }
    });

    if let Some(main_title) = &extraction.main_video_title {
        if let Some(index) = find_watch_renderer(&patched, PRIMARY_INFO_RENDERER) {
            if rewrite_scalar_at(&mut patched, &main_title_path(index), main_title) {
                changes += 1;
            }
        }
    }

    if changes > 0 {
        tracing::info!("替换了 {} 个标题", changes);
    }

    Replacement {
        data: patched,
        changes,
    }
}
