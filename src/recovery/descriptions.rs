//! 描述提取与替换
//!
//! 与标题处理相同的遍历方式，另外处理两个固定路径上的单例字段：
//! 观看页主视频描述和频道"关于"面板的长描述。

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::shapes::{
    find_watch_renderer, first_non_empty, first_present, header_key, identifier, rewrite_all,
    rewrite_scalar_at, CHANNEL_DESCRIPTION_SHAPES, CHANNEL_ID_KEY, HEADER_DESCRIPTION_SHAPES,
    VIDEO_DESCRIPTION_SHAPES, VIDEO_ID_KEY, WATCH_CONTENTS,
};
use super::Replacement;
use crate::utils::path::{
    get_text, get_value_by_path, set_value_by_path, walk_objects, walk_objects_mut, PathSegment,
};

use PathSegment::{Index, Key};

const SECONDARY_INFO_RENDERER: &str = "videoSecondaryInfoRenderer";

/// 频道长描述的固定路径
pub const LONG_DESCRIPTION_PATH: &[PathSegment<'static>] = &[
    Key("onResponseReceivedEndpoints"),
    Index(0),
    Key("appendContinuationItemsAction"),
    Key("continuationItems"),
    Index(0),
    Key("aboutChannelRenderer"),
    Key("metadata"),
    Key("aboutChannelViewModel"),
    Key("description"),
];

/// 描述提取结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DescriptionExtraction {
    pub video_descriptions: BTreeMap<String, String>,
    pub channel_descriptions: BTreeMap<String, String>,
    pub main_video_description: Option<String>,
    pub channel_long_description: Option<String>,
}

impl DescriptionExtraction {
    pub fn is_empty(&self) -> bool {
        self.video_descriptions.is_empty()
            && self.channel_descriptions.is_empty()
            && self.main_video_description.is_none()
            && self.channel_long_description.is_none()
    }

    pub fn len(&self) -> usize {
        self.video_descriptions.len()
            + self.channel_descriptions.len()
            + usize::from(self.main_video_description.is_some())
            + usize::from(self.channel_long_description.is_some())
    }
}

fn main_description_path(index: usize) -> Vec<PathSegment<'static>> {
    let mut path = WATCH_CONTENTS.to_vec();
    path.extend([
        Index(index),
        Key(SECONDARY_INFO_RENDERER),
        Key("attributedDescription"),
        Key("content"),
    ]);
    path
}

fn extract_main_description(data: &Value) -> Option<String> {
    let index = find_watch_renderer(data, SECONDARY_INFO_RENDERER)?;
    get_text(data, &main_description_path(index)).map(str::to_owned)
}

/// 从干净响应中提取原始描述
pub fn extract_descriptions(data: &Value) -> DescriptionExtraction {
    let mut result = DescriptionExtraction {
        main_video_description: extract_main_description(data),
        channel_long_description: get_text(data, LONG_DESCRIPTION_PATH).map(str::to_owned),
        ..Default::default()
    };

    walk_objects(data, &mut |node| {
        if let Some(video_id) = identifier(node, VIDEO_ID_KEY) {
            if let Some(description) = first_present(node, VIDEO_DESCRIPTION_SHAPES) {
                result
                    .video_descriptions
                    .insert(video_id.to_string(), description);
            }
        } else if let Some(channel_id) = identifier(node, CHANNEL_ID_KEY) {
            if let Some(description) = first_present(node, CHANNEL_DESCRIPTION_SHAPES) {
                result
                    .channel_descriptions
                    .insert(channel_id.to_string(), description);
            }
        }

        if let Some(key) = header_key(node) {
            if let Some(description) = first_non_empty(node, HEADER_DESCRIPTION_SHAPES) {
                result.channel_descriptions.insert(key, description);
            }
        }
    });

    tracing::debug!(
        "提取描述: 视频 {} 个, 频道 {} 个, 主描述 {}, 长描述 {}",
        result.video_descriptions.len(),
        result.channel_descriptions.len(),
        result.main_video_description.is_some(),
        result.channel_long_description.is_some()
    );

    result
}

/// 将原始描述写回真实响应的副本
pub fn replace_descriptions(data: &Value, extraction: &DescriptionExtraction) -> Replacement {
    let mut patched = data.clone();
    let mut changes = 0;

    walk_objects_mut(&mut patched, &mut |node| {
        let description = match identifier(node, VIDEO_ID_KEY) {
            Some(video_id) => extraction
                .video_descriptions
                .get(video_id)
                .map(|text| (VIDEO_DESCRIPTION_SHAPES, text.clone())),
            None => identifier(node, CHANNEL_ID_KEY)
                .and_then(|channel_id| extraction.channel_descriptions.get(channel_id))
                .map(|text| (CHANNEL_DESCRIPTION_SHAPES, text.clone())),
        };
        if let Some((shapes, description)) = description {
            changes += rewrite_all(node, shapes, &description);
        }

        if let Some(description) =
            header_key(node).and_then(|key| extraction.channel_descriptions.get(&key))
        {
            changes += rewrite_all(node, HEADER_DESCRIPTION_SHAPES, description);
        }
    });

    if let Some(main_description) = &extraction.main_video_description {
        if let Some(index) = find_watch_renderer(&patched, SECONDARY_INFO_RENDERER) {
            if rewrite_scalar_at(&mut patched, &main_description_path(index), main_description) {
                changes += 1;
            }
        }
    }

    let mut long_changes = 0;
    if let Some(long_description) = &extraction.channel_long_description {
        let differs = get_value_by_path(&patched, LONG_DESCRIPTION_PATH)
            .is_some_and(|current| current.as_str() != Some(long_description.as_str()));
        if differs
            && set_value_by_path(
                &mut patched,
                LONG_DESCRIPTION_PATH,
                Value::String(long_description.clone()),
            )
        {
            long_changes += 1;
        }
    }

    if changes > 0 || long_changes > 0 {
        tracing::info!("替换了 {} 个描述, 长描述: {}", changes, long_changes);
    }

    Replacement {
        data: patched,
        changes: changes + long_changes,
    }
}
