mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use todo_app::config::ImageCacheConfig;
use todo_app::engine::service::ImageService;

use common::{jpeg_bytes, set_age, FakeSource, MINUTE};

fn service(dir: &std::path::Path, source: Arc<FakeSource>, interval: Duration) -> ImageService {
    let mut config = ImageCacheConfig::with_cache_dir(dir);
    config.refresh_interval = interval;
    ImageService::new(config, source)
}

#[tokio::test]
async fn test_refreshes_on_every_tick_regardless_of_freshness() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FakeSource::new(jpeg_bytes(1)));
    let images = service(dir.path(), source.clone(), Duration::from_millis(50));

    // Fresh artifact: the scheduler still downloads.
    images.ensure_fresh().await.unwrap();
    assert_eq!(source.calls(), 1);

    let token = CancellationToken::new();
    let handle = images.spawn_scheduler(token.clone());

    tokio::time::sleep(Duration::from_millis(280)).await;
    token.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();

    assert!(source.calls() >= 3, "calls = {}", source.calls());
}

#[tokio::test]
async fn test_first_tick_waits_one_interval() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FakeSource::new(jpeg_bytes(1)));
    let images = service(dir.path(), source.clone(), Duration::from_secs(30));
    images.cache().ensure_dir().await.unwrap();

    let token = CancellationToken::new();
    let handle = images.spawn_scheduler(token.clone());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(source.calls(), 0);

    // Cancellation interrupts a long wait promptly.
    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_failures_do_not_stop_the_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FakeSource::failing("upstream 503"));
    let images = service(dir.path(), source.clone(), Duration::from_millis(40));
    images.cache().ensure_dir().await.unwrap();

    let token = CancellationToken::new();
    let handle = images.spawn_scheduler(token.clone());

    tokio::time::sleep(Duration::from_millis(150)).await;
    let failed_calls = source.calls();
    assert!(failed_calls >= 2, "calls = {}", failed_calls);
    assert!(!images.cache().path().exists());

    source.respond_with(jpeg_bytes(9));
    tokio::time::sleep(Duration::from_millis(150)).await;
    token.cancel();
    handle.await.unwrap();

    assert_eq!(std::fs::read(images.cache().path()).unwrap(), jpeg_bytes(9));
    assert!(images.stats().failures >= 2);
}

#[tokio::test]
async fn test_scheduled_refresh_makes_stale_artifact_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FakeSource::new(jpeg_bytes(2)));
    let images = service(dir.path(), source.clone(), Duration::from_millis(40));

    images.cache().ensure_dir().await.unwrap();
    std::fs::write(images.cache().path(), jpeg_bytes(1)).unwrap();
    set_age(images.cache().path(), 90 * MINUTE);
    assert!(images.is_stale().await);

    let token = CancellationToken::new();
    let handle = images.spawn_scheduler(token.clone());
    tokio::time::sleep(Duration::from_millis(120)).await;
    token.cancel();
    handle.await.unwrap();

    assert!(!images.is_stale().await);
    assert_eq!(std::fs::read(images.cache().path()).unwrap(), jpeg_bytes(2));
}
