//! Clipboard capture watcher and the store that combines it with
//! [`DiskStore`].

use crate::gallery::record::{ContentKey, ImageRecord, Locator};
use crate::settings::Settings;
use crate::store::disk::{content_hash, DiskStore};
use crate::store::{ChangeCallback, ChangeNotifier, ImageStore, Subscription};
use anyhow::Context;
use std::borrow::Cow;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// New content; store it.
    Capture,
    /// Same content as last time.
    Unchanged,
    /// Skipped because the gallery caused this change itself.
    Ignored,
    /// New content arrived too soon after the previous capture.
    CoolingDown,
}

/// Decides which clipboard changes become captures.
#[derive(Debug, Clone)]
pub struct CaptureGate {
    last_hash: Option<String>,
    last_capture: Option<Instant>,
    ignore_next: bool,
    cooldown: Duration,
}

impl CaptureGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            last_hash: None,
            last_capture: None,
            ignore_next: false,
            cooldown,
        }
    }

    pub fn observe(&mut self, hash: &str, now: Instant) -> GateDecision {
        if self.last_hash.as_deref() == Some(hash) {
            return GateDecision::Unchanged;
        }
        if self.ignore_next {
            self.ignore_next = false;
            self.last_hash = Some(hash.to_string());
            return GateDecision::Ignored;
        }
        if let Some(last) = self.last_capture {
            if now.saturating_duration_since(last) < self.cooldown {
                // hash not recorded so the content is picked up once the
                // cooldown has passed
                return GateDecision::CoolingDown;
            }
        }
        self.last_hash = Some(hash.to_string());
        self.last_capture = Some(now);
        GateDecision::Capture
    }

    /// Forget the last hash and skip the next change.
    pub fn reset(&mut self) {
        self.last_hash = None;
        self.ignore_next = true;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WatcherConfig {
    pub poll_interval: Duration,
    pub cooldown: Duration,
}

impl From<&Settings> for WatcherConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            cooldown: Duration::from_millis(settings.capture_cooldown_ms),
        }
    }
}

/// Hash of a clipboard bitmap including its dimensions.
pub fn bitmap_hash(width: usize, height: usize, rgba: &[u8]) -> String {
    let mut data = Vec::with_capacity(rgba.len() + 16);
    data.extend_from_slice(&(width as u64).to_le_bytes());
    data.extend_from_slice(&(height as u64).to_le_bytes());
    data.extend_from_slice(rgba);
    content_hash(&data)
}

fn encode_png(width: usize, height: usize, rgba: Vec<u8>) -> anyhow::Result<Vec<u8>> {
    let buffer = image::RgbaImage::from_raw(width as u32, height as u32, rgba)
        .context("clipboard bitmap has unexpected length")?;
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(buffer)
        .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .context("encoding clipboard bitmap")?;
    Ok(png)
}

/// Background thread polling the clipboard for images.
pub struct ClipboardWatcher {
    running: Arc<AtomicBool>,
    gate: Arc<Mutex<CaptureGate>>,
    handle: Option<JoinHandle<()>>,
}

impl ClipboardWatcher {
    pub fn start(store: Arc<DiskStore>, notifier: ChangeNotifier, config: WatcherConfig) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let gate = Arc::new(Mutex::new(CaptureGate::new(config.cooldown)));
        let thread_running = Arc::clone(&running);
        let thread_gate = Arc::clone(&gate);
        let spawned = thread::Builder::new()
            .name("clipboard-watcher".into())
            .spawn(move || listen_loop(store, notifier, thread_gate, thread_running, config.poll_interval));
        let handle = match spawned {
            Ok(handle) => {
                tracing::info!("clipboard watcher started");
                Some(handle)
            }
            Err(e) => {
                tracing::error!("failed to spawn clipboard watcher: {e}");
                None
            }
        };
        Self { running, gate, handle }
    }

    pub fn reset_capture_state(&self) {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner).reset();
        tracing::info!("clipboard capture state reset");
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ClipboardWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn listen_loop(
    store: Arc<DiskStore>,
    notifier: ChangeNotifier,
    gate: Arc<Mutex<CaptureGate>>,
    running: Arc<AtomicBool>,
    poll_interval: Duration,
) {
    let mut clipboard = match arboard::Clipboard::new() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("failed to init clipboard: {e}");
            return;
        }
    };
    while running.load(Ordering::SeqCst) {
        thread::sleep(poll_interval);
        let img = match clipboard.get_image() {
            Ok(img) => img,
            Err(arboard::Error::ContentNotAvailable) => continue,
            Err(e) => {
                tracing::debug!("clipboard read error: {e}");
                continue;
            }
        };
        let hash = bitmap_hash(img.width, img.height, &img.bytes);
        let decision = gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(&hash, Instant::now());
        if decision != GateDecision::Capture {
            if decision != GateDecision::Unchanged {
                tracing::debug!(?decision, "clipboard change not captured");
            }
            continue;
        }
        let png = match encode_png(img.width, img.height, img.bytes.into_owned()) {
            Ok(png) => png,
            Err(e) => {
                tracing::error!("{e:#}");
                continue;
            }
        };
        match store.save_image(&png) {
            Ok((record, false)) => {
                tracing::info!(identity = %record.identity, "captured clipboard image");
                notifier.notify();
            }
            Ok((record, true)) => {
                tracing::debug!(identity = %record.identity, "clipboard image already stored");
            }
            Err(e) => tracing::error!("failed to store clipboard image: {e:#}"),
        }
    }
    tracing::info!("clipboard watcher stopped");
}

/// [`ImageStore`] backed by a [`DiskStore`] and fed by a [`ClipboardWatcher`].
pub struct WatchedStore {
    disk: Arc<DiskStore>,
    notifier: ChangeNotifier,
    watcher: ClipboardWatcher,
}

impl WatchedStore {
    pub fn open(settings: &Settings) -> anyhow::Result<Self> {
        let disk = Arc::new(DiskStore::open(settings.storage_dir())?);
        if let Some(hours) = settings.retention_hours {
            if let Err(e) = disk.cleanup_older_than(hours) {
                tracing::warn!("cleanup of old captures failed: {e:#}");
            }
        }
        let notifier = ChangeNotifier::default();
        let watcher = ClipboardWatcher::start(Arc::clone(&disk), notifier.clone(), WatcherConfig::from(settings));
        Ok(Self {
            disk,
            notifier,
            watcher,
        })
    }
}

impl ImageStore for WatchedStore {
    fn list(&self) -> anyhow::Result<Vec<ImageRecord>> {
        Ok(self.disk.list())
    }

    fn delete(&self, identity: &ContentKey) -> anyhow::Result<()> {
        self.disk.delete(identity)
    }

    fn clear_all(&self) -> anyhow::Result<()> {
        self.disk.clear_all()
    }

    fn reset_capture_state(&self) -> anyhow::Result<()> {
        self.watcher.reset_capture_state();
        Ok(())
    }

    fn copy_to_clipboard(&self, locator: &Locator) -> anyhow::Result<()> {
        let bytes = self.disk.read_bytes(locator)?;
        let img = image::load_from_memory(&bytes)
            .with_context(|| format!("decoding {locator}"))?
            .to_rgba8();
        let (w, h) = img.dimensions();
        let mut cb = arboard::Clipboard::new()?;
        cb.set_image(arboard::ImageData {
            width: w as usize,
            height: h as usize,
            bytes: Cow::Owned(img.into_raw()),
        })?;
        tracing::info!(%locator, "image placed on clipboard");
        Ok(())
    }

    fn read_bytes(&self, locator: &Locator) -> anyhow::Result<Vec<u8>> {
        self.disk.read_bytes(locator)
    }

    fn on_external_change(&self, callback: ChangeCallback) -> Subscription {
        self.notifier.subscribe(callback)
    }
}
