//! 页面对账集成测试

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;

use notranslate::reconcile::{
    PlayerDataSource, ReconcileConfig, ReconcileEvent, ReconcileReport, Reconciler, RenderedPage,
};
use notranslate::recovery::chapters::Chapter;
use notranslate::recovery::error::{RecoveryError, RecoveryResult};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::player_response;

const DESCRIPTION: &str = "0:00 Intro\n1:30 Setup\n12:05 Results\nThanks for watching";

/// 预设的播放器数据
#[derive(Clone, Default)]
struct FakePlayer {
    responses: HashMap<String, Value>,
    calls: Arc<AtomicUsize>,
}

impl FakePlayer {
    fn with_video(mut self, video_id: &str, title: &str, description: &str) -> Self {
        self.responses
            .insert(video_id.to_string(), player_response(video_id, title, description));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PlayerDataSource for FakePlayer {
    fn player_response(&self, video_id: &str) -> impl Future<Output = RecoveryResult<Value>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .responses
            .get(video_id)
            .cloned()
            .ok_or_else(|| RecoveryError::NetworkError(format!("no player for {}", video_id)));
        async move { result }
    }
}

/// 记录恢复操作的页面
#[derive(Debug, Default)]
struct FakePage {
    title: Option<String>,
    description: Option<String>,
    title_writes: usize,
    description_writes: usize,
    chapters: Vec<Chapter>,
}

impl FakePage {
    fn showing(title: &str, description: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }
}

impl RenderedPage for FakePage {
    fn rendered_title(&self) -> Option<String> {
        self.title.clone()
    }

    fn rendered_description(&self) -> Option<String> {
        self.description.clone()
    }

    fn restore_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
        self.title_writes += 1;
    }

    fn restore_description(&mut self, description: &str) {
        self.description = Some(description.to_string());
        self.description_writes += 1;
    }

    fn restore_chapters(&mut self, chapters: &[Chapter]) {
        self.chapters = chapters.to_vec();
    }
}

fn video_changed(video_id: &str) -> ReconcileEvent {
    ReconcileEvent::VideoChanged {
        video_id: video_id.to_string(),
    }
}

/// 测试切换视频时恢复标题、描述和章节
#[tokio::test]
async fn test_video_change_restores_translated_page() {
    let player = FakePlayer::default().with_video("vid001", "Original Title", DESCRIPTION);
    let page = FakePage::showing("Titre traduit", "Une description complètement différente");
    let mut reconciler = Reconciler::new(player, page, ReconcileConfig::default());

    let report = reconciler.handle(video_changed("vid001")).await.unwrap();

    assert_eq!(
        report,
        ReconcileReport {
            title_restored: true,
            description_restored: true,
            chapters_restored: 3,
        }
    );
    let page = reconciler.page();
    assert_eq!(page.title.as_deref(), Some("Original Title"));
    assert_eq!(page.description.as_deref(), Some(DESCRIPTION));
    assert_eq!(page.chapters[2].start_seconds, 725);

    let session = reconciler.session().unwrap();
    assert_eq!(session.video_id, "vid001");
    assert!(session.title_restored && session.description_restored);

    println!("✅ Translated page restored");
}

/// 测试截断或相同的渲染文本不会被改写
#[tokio::test]
async fn test_original_page_is_left_alone() {
    let player = FakePlayer::default().with_video("vid001", "Original Title", DESCRIPTION);
    let page = FakePage::showing("  Original   Title ", "0:00 intro 1:30");
    let mut reconciler = Reconciler::new(player, page, ReconcileConfig::default());

    let report = reconciler.handle(video_changed("vid001")).await.unwrap();

    assert_eq!(report, ReconcileReport::default());
    assert_eq!(reconciler.page().title_writes, 0);
    assert_eq!(reconciler.page().description_writes, 0);

    println!("✅ Original texts untouched");
}

/// 测试原文缓存：同一视频只获取一次
#[tokio::test]
async fn test_texts_are_cached_per_video() {
    let player = FakePlayer::default()
        .with_video("a", "Title A", "Description A")
        .with_video("b", "Title B", "Description B");
    let calls = player.calls.clone();
    let mut reconciler = Reconciler::new(player, FakePage::default(), ReconcileConfig::default());

    reconciler.handle(video_changed("a")).await.unwrap();
    reconciler.handle(video_changed("b")).await.unwrap();
    reconciler.handle(video_changed("a")).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(reconciler.cache().len(), 2);
    assert_eq!(reconciler.session().unwrap().video_id, "a");

    println!("✅ Player fetched once per video");
}

/// 测试内容变化只与缓存比较
#[tokio::test]
async fn test_content_mutation_uses_cache_only() {
    let player = FakePlayer::default().with_video("vid001", "Original Title", DESCRIPTION);
    let calls = player.calls.clone();
    let mut reconciler = Reconciler::new(
        player,
        FakePage::showing("Original Title", DESCRIPTION),
        ReconcileConfig::default(),
    );

    // 没有会话时什么都不做
    let report = reconciler.handle(ReconcileEvent::ContentMutated).await.unwrap();
    assert_eq!(report, ReconcileReport::default());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    reconciler.handle(video_changed("vid001")).await.unwrap();

    let report = reconciler.handle(ReconcileEvent::ContentMutated).await.unwrap();
    assert_eq!(report, ReconcileReport::default());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    println!("✅ Mutations compared against cache");
}

/// 测试展开描述时总是写入描述和章节
#[tokio::test]
async fn test_description_expansion_forces_restore() {
    let player = FakePlayer::default().with_video("vid001", "Original Title", DESCRIPTION);
    let page = FakePage::showing("Original Title", "0:00 Intro");
    let mut reconciler = Reconciler::new(player, page, ReconcileConfig::default());

    let report = reconciler
        .handle(ReconcileEvent::DescriptionExpanded {
            video_id: "vid001".to_string(),
        })
        .await
        .unwrap();

    assert!(report.description_restored);
    assert!(!report.title_restored);
    assert_eq!(report.chapters_restored, 3);
    assert_eq!(reconciler.page().description.as_deref(), Some(DESCRIPTION));
    assert_eq!(reconciler.session().unwrap().chapters.len(), 3);

    println!("✅ Expanded description rewritten");
}

/// 测试事件循环：失败被记录，循环继续运行
#[tokio::test]
async fn test_run_loop_survives_failures() {
    let player = FakePlayer::default().with_video("good", "Good Title", "Good description");
    let reconciler = Reconciler::new(
        player.clone(),
        FakePage::showing("Mauvais titre", "Mauvaise description"),
        ReconcileConfig {
            cache_size: 10,
            cache_ttl: Duration::from_secs(60),
            similarity_threshold: 0.75,
        },
    );

    let (sender, receiver) = mpsc::channel(8);
    let handle = tokio::spawn(reconciler.run(receiver));

    sender.send(video_changed("missing")).await.unwrap();
    sender.send(video_changed("good")).await.unwrap();
    sender.send(ReconcileEvent::ContentMutated).await.unwrap();
    drop(sender);

    let reconciler = handle.await.unwrap();

    assert_eq!(reconciler.error_stats().total_errors, 1);
    assert_eq!(reconciler.page().title.as_deref(), Some("Good Title"));
    assert_eq!(reconciler.session().unwrap().video_id, "good");
    assert_eq!(player.calls(), 2);

    println!("✅ Loop kept running after a failed fetch");
}
