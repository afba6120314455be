//! 章节解析
//!
//! 从原始描述中解析带时间戳的章节行，用于把播放器中被翻译的章节标题换回原文。

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// 章节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub start_seconds: u64,
    pub title: String,
}

const TITLE_SEPARATORS: &[char] = &[
    '-', '–', '—', '•', '·', '▪', '▫', '‣', '⁃', ':', '→', '>',
];

fn chapter_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^.*?([0-9]{1,2}):([0-9]{2})(?::([0-9]{2}))?\s*(.+)$")
            .unwrap_or_else(|e| panic!("章节正则无效: {}", e))
    })
}

/// 把 `m:ss`、`mm:ss` 或 `h:mm:ss` 转为秒数，无法识别或溢出时返回 0
pub fn time_string_to_seconds(time: &str) -> u64 {
    let parts: Option<Vec<u64>> = time
        .trim()
        .split(':')
        .map(|part| part.parse::<u64>().ok())
        .collect();

    let seconds = match parts.as_deref() {
        Some([minutes, seconds]) => clock_seconds(0, *minutes, *seconds),
        Some([hours, minutes, seconds]) => clock_seconds(*hours, *minutes, *seconds),
        _ => None,
    };
    seconds.unwrap_or(0)
}

/// 溢出时返回 `None`
fn clock_seconds(hours: u64, minutes: u64, seconds: u64) -> Option<u64> {
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// 从描述中解析章节
///
/// 时间戳前的任意前缀（表情、项目符号）会被忽略，标题开头的分隔符会被去掉，
/// 少于两个字符的标题不计入。
pub fn parse_chapters(description: &str) -> Vec<Chapter> {
    let re = chapter_line_regex();

    description
        .lines()
        .filter_map(|line| {
            let caps = re.captures(line.trim())?;
            let first: u64 = caps.get(1)?.as_str().parse().ok()?;
            let second: u64 = caps.get(2)?.as_str().parse().ok()?;

            let start_seconds = match caps.get(3) {
                Some(third) => clock_seconds(first, second, third.as_str().parse().ok()?)?,
                None => clock_seconds(0, first, second)?,
            };

            let title = caps
                .get(4)?
                .as_str()
                .trim()
                .trim_start_matches(|c: char| c.is_whitespace() || TITLE_SEPARATORS.contains(&c))
                .trim();

            if title.chars().count() < 2 {
                return None;
            }

            Some(Chapter {
                start_seconds,
                title: title.to_string(),
            })
        })
        .collect()
}

/// 查找给定时间所在的章节：开始时间不晚于该时间的最后一个章节，否则第一个章节
pub fn find_chapter_by_time(time_seconds: u64, chapters: &[Chapter]) -> Option<&Chapter> {
    chapters
        .iter()
        .rev()
        .find(|chapter| chapter.start_seconds <= time_seconds)
        .or_else(|| chapters.first())
}
