//! 提取与替换集成测试
//!
//! 在完整的响应树上验证修补行为

use serde_json::{json, Value};

use notranslate::recovery::config::Features;
use notranslate::recovery::descriptions::{extract_descriptions, replace_descriptions};
use notranslate::recovery::processor::DataProcessor;
use notranslate::recovery::titles::{extract_titles, replace_titles};
use notranslate::utils::path::{get_value_by_path, PathSegment};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{channel_header, search_response, watch_response};

const ALL_FEATURES: Features = Features {
    titles: true,
    descriptions: true,
};

fn video_renderer(data: &Value) -> &Value {
    &data["contents"]["sectionListRenderer"]["contents"][0]["itemSectionRenderer"]["contents"][0]
        ["videoRenderer"]
}

/// 测试完整修补流程
#[test]
fn test_search_response_is_restored() {
    let translated = search_response("Titre traduit", &["Description ", "traduite"], "Chaîne");
    let clean = search_response("Original title", &["Original ", "snippet"], "Channel");

    let outcome = DataProcessor::new(ALL_FEATURES).process(&translated, &clean);

    let video = video_renderer(&outcome.data);
    assert_eq!(video["title"]["runs"][0]["text"], "Original title");
    assert_eq!(video["descriptionSnippet"]["runs"], json!([{"text": "Original snippet"}]));
    assert_eq!(outcome.title_changes, 2);
    assert_eq!(outcome.description_changes, 1);

    println!("✅ Search response restored with {} changes", outcome.total_changes());
}

/// 测试幂等：对已修补的数据再次替换不产生变化
#[test]
fn test_replacement_is_idempotent() {
    let translated = search_response("Titre", &["a", "b"], "Chaîne");
    let clean = search_response("Title", &["original"], "Channel");

    let titles = extract_titles(&clean);
    let descriptions = extract_descriptions(&clean);

    let once = replace_descriptions(&replace_titles(&translated, &titles).data, &descriptions).data;
    let twice_titles = replace_titles(&once, &titles);
    let twice = replace_descriptions(&twice_titles.data, &descriptions);

    assert_eq!(twice_titles.changes, 0);
    assert_eq!(twice.changes, 0);
    assert_eq!(twice.data, once);

    println!("✅ Second replacement is a no-op");
}

/// 测试按标识符匹配：顺序无关，未知实体不受影响
#[test]
fn test_identifier_consistency() {
    let clean = json!({"items": [
        {"videoRenderer": {"videoId": "a", "title": {"simpleText": "Alpha"}}},
        {"videoRenderer": {"videoId": "b", "title": {"simpleText": "Beta"}}}
    ]});
    let translated = json!({"sections": [
        {"compactVideoRenderer": {"videoId": "b", "title": {"simpleText": "Bêta"}}},
        {"compactVideoRenderer": {"videoId": "c", "title": {"simpleText": "Gamma traduit"}}},
        {"compactVideoRenderer": {"videoId": "a", "title": {"simpleText": "Alpha traduit"}}}
    ]});

    let result = replace_titles(&translated, &extract_titles(&clean));

    assert_eq!(result.changes, 2);
    let sections = &result.data["sections"];
    assert_eq!(sections[0]["compactVideoRenderer"]["title"]["simpleText"], "Beta");
    assert_eq!(sections[1]["compactVideoRenderer"]["title"]["simpleText"], "Gamma traduit");
    assert_eq!(sections[2]["compactVideoRenderer"]["title"]["simpleText"], "Alpha");

    println!("✅ Entities matched by id regardless of position");
}

/// 测试不会创建原本不存在的字段
#[test]
fn test_replacement_never_fabricates_fields() {
    let clean = json!({"videoId": "v", "title": {"runs": [{"text": "Original"}]}, "shortDescription": "Desc"});
    let translated = json!({"videoId": "v", "title": {"simpleText": "Traduit"}});

    let outcome = DataProcessor::new(ALL_FEATURES).process(&translated, &clean);

    assert_eq!(
        outcome.data,
        json!({"videoId": "v", "title": {"simpleText": "Original"}})
    );
    assert_eq!(outcome.description_changes, 0);

    println!("✅ Only existing fields were rewritten");
}

/// 测试同一实体的多个布局都被改写
#[test]
fn test_every_present_shape_is_rewritten() {
    let clean = json!({"videoId": "v", "title": {"runs": [{"text": "Original"}]}});
    let translated = json!({
        "videoId": "v",
        "title": {"runs": [{"text": "Traduit"}], "simpleText": "Traduit"}
    });

    let result = replace_titles(&translated, &extract_titles(&clean));

    assert_eq!(result.changes, 2);
    assert_eq!(result.data["title"]["runs"][0]["text"], "Original");
    assert_eq!(result.data["title"]["simpleText"], "Original");

    println!("✅ Both title shapes rewritten");
}

/// 测试 run 列表被合并为第一个 run，并保留其其他字段
#[test]
fn test_run_list_collapses_into_first_run() {
    let clean = json!({"videoId": "v", "descriptionSnippet": {"runs": [{"text": "Full original"}]}});
    let translated = json!({"videoId": "v", "descriptionSnippet": {"runs": [
        {"text": "Part one ", "bold": true},
        {"text": "part two"},
        {"navigationEndpoint": {}}
    ]}});

    let result = replace_descriptions(&translated, &extract_descriptions(&clean));

    assert_eq!(result.changes, 1);
    assert_eq!(
        result.data["descriptionSnippet"]["runs"],
        json!([{"text": "Full original", "bold": true}])
    );

    println!("✅ Run list collapsed");
}

/// 测试往返：修补后的数据提取出的原文与干净响应一致
#[test]
fn test_round_trip_through_extraction() {
    let translated = search_response("Titre", &["traduit"], "Chaîne");
    let clean = search_response("Title", &["original"], "Channel");

    let outcome = DataProcessor::new(ALL_FEATURES).process(&translated, &clean);

    assert_eq!(extract_titles(&outcome.data), extract_titles(&clean));
    assert_eq!(
        extract_descriptions(&outcome.data).video_descriptions,
        extract_descriptions(&clean).video_descriptions
    );

    println!("✅ Round trip preserved originals");
}

/// 测试干净响应缺少字段时原样返回
#[test]
fn test_absent_fields_leave_response_untouched() {
    let translated = search_response("Titre", &["traduit"], "Chaîne");
    let clean = json!({"responseContext": {}, "contents": {}});

    let outcome = DataProcessor::new(ALL_FEATURES).process(&translated, &clean);

    assert_eq!(outcome.data, translated);
    assert!(!outcome.is_changed());

    println!("✅ Nothing to recover, response unchanged");
}

/// 测试观看页主标题和主描述
#[test]
fn test_watch_page_singletons() {
    let translated = watch_response("Titre principal", "Description traduite");
    let clean = watch_response("Main title", "0:00 Intro\n1:30 Main part");

    let outcome = DataProcessor::new(ALL_FEATURES).process(&translated, &clean);
    let contents = &outcome.data["contents"]["twoColumnWatchNextResults"]["results"]["results"]
        ["contents"];

    assert_eq!(contents[0]["videoPrimaryInfoRenderer"]["title"]["runs"][0]["text"], "Main title");
    assert_eq!(
        contents[1]["videoSecondaryInfoRenderer"]["attributedDescription"]["content"],
        "0:00 Intro\n1:30 Main part"
    );
    assert_eq!(outcome.title_changes, 1);
    assert_eq!(outcome.description_changes, 1);

    println!("✅ Watch page singletons restored");
}

/// 测试页眉键：页眉标题缺失时使用固定键
#[test]
fn test_header_key_fallback() {
    let clean = channel_header(None, "Original Channel", "About the channel");
    let translated = channel_header(None, "Chaîne traduite", "À propos");

    let extraction = extract_titles(&clean);
    assert_eq!(
        extraction.channel_titles.get("headerChannel").map(String::as_str),
        Some("Original Channel")
    );

    let outcome = DataProcessor::new(ALL_FEATURES).process(&translated, &clean);
    let view_model = &outcome.data["header"]["pageHeaderRenderer"]["content"]["pageHeaderViewModel"];
    assert_eq!(view_model["title"]["dynamicTextViewModel"]["text"]["content"], "Original Channel");
    assert_eq!(
        view_model["description"]["descriptionPreviewViewModel"]["description"]["content"],
        "About the channel"
    );

    println!("✅ Header matched through fallback key");
}

/// 测试页眉标题不同的页眉不会相互匹配
#[test]
fn test_header_keys_must_match() {
    let clean = channel_header(Some("Original Page"), "Original Channel", "About");
    let translated = channel_header(Some("Page traduite"), "Chaîne traduite", "À propos");

    let outcome = DataProcessor::new(ALL_FEATURES).process(&translated, &clean);
    assert_eq!(outcome.data, translated);

    println!("✅ Headers with different keys left alone");
}

/// 测试功能开关
#[test]
fn test_disabled_features_are_skipped() {
    let translated = search_response("Titre", &["traduit"], "Chaîne");
    let clean = search_response("Title", &["original"], "Channel");

    let titles_only = DataProcessor::new(Features::default()).process(&translated, &clean);
    assert!(titles_only.title_changes > 0);
    assert_eq!(titles_only.description_changes, 0);

    let snippet_path = [
        PathSegment::Key("contents"),
        PathSegment::Key("sectionListRenderer"),
        PathSegment::Key("contents"),
        PathSegment::Index(0),
        PathSegment::Key("itemSectionRenderer"),
        PathSegment::Key("contents"),
        PathSegment::Index(0),
        PathSegment::Key("videoRenderer"),
        PathSegment::Key("descriptionSnippet"),
    ];
    assert_eq!(
        get_value_by_path(&titles_only.data, &snippet_path),
        get_value_by_path(&translated, &snippet_path)
    );

    let nothing = DataProcessor::new(Features {
        titles: false,
        descriptions: false,
    })
    .process(&translated, &clean);
    assert_eq!(nothing.data, translated);

    println!("✅ Feature flags respected");
}

/// 测试往返场景：单个视频节点
#[test]
fn test_single_video_round_trip() {
    let real = json!({"videoId": "abc", "title": {"runs": [{"text": "Translated"}]}});
    let shadow = json!({"videoId": "abc", "title": {"runs": [{"text": "Original"}]}});

    let result = replace_titles(&real, &extract_titles(&shadow));

    assert_eq!(result.data, shadow);
    assert_eq!(result.changes, 1);

    println!("✅ Single node round trip");
}

/// 测试同一视频的多个描述布局都被改写
#[test]
fn test_every_present_description_shape_is_rewritten() {
    let clean = json!({"videoId": "v", "descriptionSnippet": {"runs": [{"text": "Original"}]}});
    let translated = json!({
        "videoId": "v",
        "descriptionSnippet": {"runs": [{"text": "Traduit"}]},
        "shortDescription": "Traduit aussi"
    });

    let result = replace_descriptions(&translated, &extract_descriptions(&clean));

    assert_eq!(result.changes, 2);
    assert_eq!(result.data["descriptionSnippet"]["runs"][0]["text"], "Original");
    assert_eq!(result.data["shortDescription"], "Original");

    println!("✅ Both description shapes rewritten");
}

/// 测试页眉键：页眉标题缺失时使用频道外部 ID
#[test]
fn test_header_keyed_by_external_id() {
    fn header(title: &str) -> Value {
        json!({"header": {
            "pageHeaderRenderer": {"content": {"pageHeaderViewModel": {
                "title": {"dynamicTextViewModel": {"text": {"content": title}}}
            }}},
            "metadata": {"channelMetadataRenderer": {"externalId": "UCexternal"}}
        }})
    }

    let extraction = extract_titles(&header("Original Channel"));
    assert_eq!(
        extraction.channel_titles.get("UCexternal").map(String::as_str),
        Some("Original Channel")
    );

    let result = replace_titles(&header("Chaîne traduite"), &extraction);
    assert_eq!(result.changes, 1);
    assert_eq!(result.data, header("Original Channel"));

    println!("✅ Header matched through external id");
}

/// 测试没有任何标识符的树
#[test]
fn test_tree_without_identifiers() {
    let data = json!({"responseContext": {"visitorData": "x"}, "items": [1, "two", null, {"a": []}]});

    let titles = extract_titles(&data);
    let descriptions = extract_descriptions(&data);

    assert!(titles.video_titles.is_empty());
    assert!(titles.main_video_title.is_none());
    assert!(descriptions.main_video_description.is_none());
    assert!(descriptions.channel_long_description.is_none());

    println!("✅ Empty extraction without errors");
}
