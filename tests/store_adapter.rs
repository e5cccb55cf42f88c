use anyhow::anyhow;
use snapmag::gallery::menu::MenuAction;
use snapmag::gallery::record::{ContentKey, ImageRecord, Locator};
use snapmag::gallery::Gallery;
use snapmag::store::worker::execute;
use snapmag::store::{
    ChangeCallback, ChangeNotifier, ImageStore, StoreAdapter, StoreOutcome, StoreRequest, StoreWorker,
    Subscription,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct FakeStore {
    calls: Mutex<Vec<String>>,
    images: Mutex<Vec<ImageRecord>>,
    fail_delete: bool,
    notifier: ChangeNotifier,
}

impl FakeStore {
    fn with_images(images: Vec<ImageRecord>) -> Self {
        Self {
            images: Mutex::new(images),
            ..Default::default()
        }
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageStore for FakeStore {
    fn list(&self) -> anyhow::Result<Vec<ImageRecord>> {
        self.log("list");
        Ok(self.images.lock().unwrap().clone())
    }

    fn delete(&self, identity: &ContentKey) -> anyhow::Result<()> {
        self.log(format!("delete {identity}"));
        if self.fail_delete {
            return Err(anyhow!("disk on fire"));
        }
        self.images.lock().unwrap().retain(|r| &r.identity != identity);
        Ok(())
    }

    fn clear_all(&self) -> anyhow::Result<()> {
        self.log("clear");
        self.images.lock().unwrap().clear();
        Ok(())
    }

    fn reset_capture_state(&self) -> anyhow::Result<()> {
        self.log("reset");
        Ok(())
    }

    fn copy_to_clipboard(&self, locator: &Locator) -> anyhow::Result<()> {
        self.log(format!("copy {locator}"));
        // the watcher records the copy-back as a fresh capture
        let mut images = self.images.lock().unwrap();
        if let Some(existing) = images.iter().find(|r| &r.locator == locator).cloned() {
            images.insert(
                0,
                ImageRecord::new(existing.identity, Locator::new(format!("{locator}.again")), 1_000),
            );
        }
        Ok(())
    }

    fn read_bytes(&self, locator: &Locator) -> anyhow::Result<Vec<u8>> {
        self.log(format!("read {locator}"));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(image::RgbaImage::new(400, 200))
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)?;
        Ok(png)
    }

    fn on_external_change(&self, callback: ChangeCallback) -> Subscription {
        self.notifier.subscribe(callback)
    }
}

fn record(id: &str, path: &str, created_at: i64) -> ImageRecord {
    ImageRecord::new(ContentKey::new(id), Locator::new(path), created_at)
}

#[test]
fn unavailable_store_reads_empty_and_ignores_writes() {
    let adapter = StoreAdapter::unavailable();
    assert!(!adapter.is_available());
    assert!(adapter.list().unwrap().is_empty());
    adapter.delete(&ContentKey::new("a")).unwrap();
    adapter.clear_all().unwrap();
    adapter.copy_to_clipboard(&Locator::new("/a.png")).unwrap();
    assert!(adapter.read_bytes(&Locator::new("/a.png")).is_err());
    let refreshed = adapter.copy_back(&Locator::new("/a.png"), Duration::ZERO).unwrap();
    assert!(refreshed.is_empty());
}

#[test]
fn copy_back_runs_reset_copy_list_in_order() {
    let store = Arc::new(FakeStore::with_images(vec![record("a", "/a.png", 10)]));
    let adapter = StoreAdapter::new(store.clone());
    let refreshed = adapter.copy_back(&Locator::new("/a.png"), Duration::from_millis(5)).unwrap();
    assert_eq!(store.calls(), ["reset", "copy /a.png", "list"]);
    assert_eq!(refreshed.len(), 2);
}

#[test]
fn copy_back_outcome_collapses_resurfaced_capture() {
    let store = Arc::new(FakeStore::with_images(vec![
        record("b", "/b.png", 20),
        record("a", "/a.png", 10),
    ]));
    let adapter = StoreAdapter::new(store);
    let mut gallery = Gallery::default();
    gallery.replace_images(adapter.list().unwrap());

    match execute(&adapter, StoreRequest::CopyBack(Locator::new("/a.png")), Duration::ZERO) {
        StoreOutcome::CopiedBack(list) => gallery.apply_copy_back(list),
        other => panic!("unexpected outcome {other:?}"),
    }
    let paths: Vec<&str> = gallery.images().iter().map(|r| r.locator.as_str()).collect();
    assert_eq!(paths, ["/b.png", "/a.png"]);
}

#[test]
fn failed_delete_leaves_list_unchanged() {
    let store = Arc::new(FakeStore {
        images: Mutex::new(vec![record("a", "/a.png", 10)]),
        fail_delete: true,
        ..Default::default()
    });
    let adapter = StoreAdapter::new(store);
    let mut gallery = Gallery::default();
    gallery.replace_images(adapter.list().unwrap());

    let request = StoreRequest::from(MenuAction::Delete(record("a", "/a.png", 10)));
    match execute(&adapter, request, Duration::ZERO) {
        StoreOutcome::Failed { request, error } => {
            assert_eq!(request, StoreRequest::Delete(ContentKey::new("a")));
            assert!(error.contains("disk on fire"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(gallery.images().len(), 1);
}

#[test]
fn load_scales_to_requested_size() {
    let adapter = StoreAdapter::new(Arc::new(FakeStore::default()));
    let request = StoreRequest::Load {
        locator: Locator::new("/a.png"),
        max_side: 100,
    };
    match execute(&adapter, request, Duration::ZERO) {
        StoreOutcome::Loaded { image, max_side, .. } => {
            assert_eq!(max_side, 100);
            assert_eq!(image.dimensions(), (100, 50));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn worker_runs_requests_in_submission_order() {
    let store = Arc::new(FakeStore::with_images(vec![record("a", "/a.png", 10)]));
    let woken = Arc::new(AtomicUsize::new(0));
    let counter = woken.clone();
    let worker = StoreWorker::spawn(
        StoreAdapter::new(store.clone()),
        Duration::ZERO,
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    worker.submit(StoreRequest::Delete(ContentKey::new("a")));
    worker.submit(StoreRequest::Refresh);

    let first = worker.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(first, StoreOutcome::Deleted(ref id) if id.as_str() == "a"));
    let second = worker.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(second, StoreOutcome::Listed(ref list) if list.is_empty()));
    drop(worker);
    assert_eq!(woken.load(Ordering::SeqCst), 2);
    assert_eq!(store.calls(), ["delete a", "list"]);
}

#[test]
fn external_change_reaches_subscriber_until_dropped() {
    let store = Arc::new(FakeStore::default());
    let adapter = StoreAdapter::new(store.clone());
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let sub = adapter.on_external_change(Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    store.notifier.notify();
    drop(sub);
    store.notifier.notify();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
