mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use steamsync::application::scheduler::{
    BroadcastScheduler, Schedule, WatchPoller, run_broadcast_scheduler, run_watch_poller,
};
use steamsync::application::usecases::BroadcastOnceUseCase;
use steamsync::application::{
    AppError, AppResult, BroadcastTargetStore, ContentProvider, WatchRegistry,
};
use steamsync::domain::{BroadcastTarget, NewNotifyRequest, Scope};
use steamsync::infrastructure::fake_source::FakeProfileSource;
use steamsync::infrastructure::memory_store::{
    InMemoryBroadcastTargetStore, InMemoryWatchRegistry,
};

use common::{RecordingTransport, group};

#[derive(Clone, Default)]
struct CountingContent {
    calls: Arc<Mutex<u32>>,
    broken: bool,
}

impl CountingContent {
    fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ContentProvider for CountingContent {
    async fn generate(&self, purpose: &str) -> AppResult<Option<String>> {
        *self.calls.lock().unwrap() += 1;
        if self.broken {
            return Err(AppError::SourceUnavailable("store down".into()));
        }
        match purpose {
            "deals" => Ok(Some("today's deals".into())),
            _ => Ok(None),
        }
    }
}

async fn store_with(targets: &[(&str, Option<&str>, &str)]) -> InMemoryBroadcastTargetStore {
    let store = InMemoryBroadcastTargetStore::new();
    for (dest, channel, purpose) in targets {
        store
            .upsert_target(&BroadcastTarget::new(dest, *channel, purpose).unwrap())
            .await
            .unwrap();
    }
    store
}

#[tokio::test]
async fn failed_target_does_not_abort_the_tick() {
    let store = store_with(&[
        ("g1", Some("5"), "deals"),
        ("g2", None, "deals"),
        ("g3", None, "deals"),
    ])
    .await;
    let content = CountingContent::default();
    let transport = RecordingTransport::new();
    transport.fail_for(group("g2", None));
    let dispatcher = transport.dispatcher();
    let purposes = vec!["deals".to_string()];

    let report = BroadcastOnceUseCase {
        targets: &store,
        content: &content,
        dispatcher: &dispatcher,
        purposes: &purposes,
    }
    .execute()
    .await;

    assert_eq!(report.targets, 3);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed, 1);
    // content is generated once per purpose, not per target
    assert_eq!(content.calls(), 1);

    let to: Vec<_> = transport.sent().into_iter().map(|(d, _)| d).collect();
    assert_eq!(to, vec![group("g1", Some("5")), group("g3", None)]);
}

#[tokio::test]
async fn broken_content_skips_the_purpose() {
    let store = store_with(&[("g1", None, "deals"), ("g2", None, "news")]).await;
    let content = CountingContent {
        broken: true,
        ..CountingContent::default()
    };
    let transport = RecordingTransport::new();
    let dispatcher = transport.dispatcher();
    let purposes = vec!["deals".to_string(), "news".to_string()];

    let report = BroadcastOnceUseCase {
        targets: &store,
        content: &content,
        dispatcher: &dispatcher,
        purposes: &purposes,
    }
    .execute()
    .await;

    assert_eq!(report.skipped_purposes, 2);
    assert_eq!(transport.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_send_times_out_and_next_target_still_runs() {
    let store = store_with(&[("g1", None, "deals"), ("g2", None, "deals")]).await;
    let content = CountingContent::default();
    let transport = RecordingTransport::slow(Duration::from_secs(30));
    let dispatcher = transport.dispatcher();
    let purposes = vec!["deals".to_string()];

    let report = BroadcastOnceUseCase {
        targets: &store,
        content: &content,
        dispatcher: &dispatcher,
        purposes: &purposes,
    }
    .execute()
    .await;

    assert_eq!(report.failed, 2);
    assert_eq!(transport.attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn broadcast_runs_after_warmup_then_at_fixed_interval() {
    let store = store_with(&[("g1", None, "deals")]).await;
    let content = CountingContent::default();
    let transport = RecordingTransport::new();
    let shutdown = CancellationToken::new();

    let task = tokio::spawn(run_broadcast_scheduler(
        BroadcastScheduler {
            targets: Arc::new(store),
            content: Arc::new(content.clone()),
            dispatcher: transport.dispatcher(),
            purposes: vec!["deals".to_string()],
        },
        Schedule {
            warmup: Duration::from_secs(10),
            interval: Duration::from_secs(60),
        },
        shutdown.clone(),
    ));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(transport.sent().len(), 0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(transport.sent().len(), 1);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(transport.sent().len(), 2);

    shutdown.cancel();
    task.await.unwrap();
    assert_eq!(content.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_an_in_flight_poll_pass() {
    let registry = InMemoryWatchRegistry::new();
    registry
        .add(NewNotifyRequest {
            watcher_id: "W".into(),
            target_handle: "T".into(),
            game_pattern: "Rust".into(),
            scope: Scope::Private,
            group_id: None,
        })
        .await
        .unwrap();
    let source = FakeProfileSource::new();
    source.set_playing("T", Some("Rust"));
    source.set_delay("T", Duration::from_secs(30));
    let transport = RecordingTransport::new();
    let shutdown = CancellationToken::new();

    let task = tokio::spawn(run_watch_poller(
        WatchPoller {
            registry: Arc::new(registry.clone()),
            source: Arc::new(source.clone()),
            dispatcher: transport.dispatcher(),
            lookup_timeout: Duration::from_secs(60),
        },
        Schedule {
            warmup: Duration::ZERO,
            interval: Duration::from_secs(300),
        },
        shutdown.clone(),
    ));

    // the first pass is now waiting on the slow lookup
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(source.calls("T"), 1);

    shutdown.cancel();
    task.await.unwrap();

    assert!(transport.sent().is_empty());
    assert_eq!(registry.scan_all().await.unwrap().len(), 1);
}
