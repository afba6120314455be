//! 文本比较工具
//!
//! 用于判断页面上渲染的文本是否仍然是缓存的原文

use std::collections::HashMap;

/// 规范化文本：合并空白并去除首尾空白，可选忽略大小写
pub fn normalize_text(text: &str, ignore_case: bool) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if ignore_case {
        collapsed.to_lowercase()
    } else {
        collapsed
    }
}

fn bigrams(text: &str) -> HashMap<(char, char), usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut counts = HashMap::new();
    for pair in chars.windows(2) {
        *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
    }
    counts
}

/// 计算两个文本的相似度（Dice 二元组系数），结果在 [0, 1] 之间
pub fn calculate_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let left = bigrams(a);
    let right = bigrams(b);
    let left_total: usize = left.values().sum();
    let right_total: usize = right.values().sum();

    if left_total == 0 || right_total == 0 {
        return 0.0;
    }

    let shared: usize = left
        .iter()
        .map(|(pair, count)| right.get(pair).map_or(0, |other| (*count).min(*other)))
        .sum();

    (2 * shared) as f64 / (left_total + right_total) as f64
}

/// 判断渲染出的描述是否是原文
///
/// 页面上的描述常被截断，所以缓存原文以渲染文本开头即可视为原文；
/// 否则退回到相似度比较。
pub fn is_description_original(cached: &str, rendered: &str, threshold: f64) -> bool {
    let cached = normalize_text(cached, true);
    let rendered = normalize_text(rendered, true);

    if rendered.is_empty() {
        return true;
    }

    cached.starts_with(&rendered) || calculate_similarity(&cached, &rendered) >= threshold
}

/// 判断渲染出的标题是否是原文
pub fn is_title_original(cached: &str, rendered: &str) -> bool {
    normalize_text(cached, false) == normalize_text(rendered, false)
}
