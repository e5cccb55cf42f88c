use super::StoreAdapter;
use crate::gallery::menu::MenuAction;
use crate::gallery::record::{ContentKey, ImageRecord, Locator};
use anyhow::Context;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
    Refresh,
    Delete(ContentKey),
    ClearAll,
    /// Reset capture state, copy, settle, then re-list.
    CopyBack(Locator),
    /// Read and decode an image, scaled to fit `max_side` (0 keeps full size).
    Load { locator: Locator, max_side: u32 },
}

impl From<MenuAction> for StoreRequest {
    fn from(action: MenuAction) -> Self {
        match action {
            MenuAction::Copy(record) => StoreRequest::CopyBack(record.locator),
            MenuAction::Delete(record) => StoreRequest::Delete(record.identity),
            MenuAction::ClearAll => StoreRequest::ClearAll,
        }
    }
}

#[derive(Debug)]
pub enum StoreOutcome {
    Listed(Vec<ImageRecord>),
    CopiedBack(Vec<ImageRecord>),
    Deleted(ContentKey),
    Cleared,
    Loaded {
        locator: Locator,
        max_side: u32,
        image: image::RgbaImage,
    },
    Failed {
        request: StoreRequest,
        error: String,
    },
}

/// Run one request against the adapter. Failures are logged and reported as
/// [`StoreOutcome::Failed`].
pub fn execute(adapter: &StoreAdapter, request: StoreRequest, settle: Duration) -> StoreOutcome {
    let result = match &request {
        StoreRequest::Refresh => adapter.list().map(StoreOutcome::Listed),
        StoreRequest::Delete(identity) => adapter
            .delete(identity)
            .map(|_| StoreOutcome::Deleted(identity.clone())),
        StoreRequest::ClearAll => adapter.clear_all().map(|_| StoreOutcome::Cleared),
        StoreRequest::CopyBack(locator) => adapter
            .copy_back(locator, settle)
            .map(StoreOutcome::CopiedBack),
        StoreRequest::Load { locator, max_side } => {
            load_image(adapter, locator, *max_side).map(|image| StoreOutcome::Loaded {
                locator: locator.clone(),
                max_side: *max_side,
                image,
            })
        }
    };
    result.unwrap_or_else(|e| {
        tracing::error!(?request, error = %format!("{e:#}"), "store request failed");
        StoreOutcome::Failed {
            request,
            error: format!("{e:#}"),
        }
    })
}

fn load_image(adapter: &StoreAdapter, locator: &Locator, max_side: u32) -> anyhow::Result<image::RgbaImage> {
    let bytes = adapter.read_bytes(locator)?;
    let img = image::load_from_memory(&bytes).with_context(|| format!("decoding {locator}"))?;
    let img = if max_side > 0 && (img.width() > max_side || img.height() > max_side) {
        img.thumbnail(max_side, max_side)
    } else {
        img
    };
    Ok(img.to_rgba8())
}

/// Single background thread executing store requests one at a time, in
/// submission order.
pub struct StoreWorker {
    tx: Option<Sender<StoreRequest>>,
    rx: Receiver<StoreOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl StoreWorker {
    /// `wake` runs after every outcome so the UI can schedule a frame.
    pub fn spawn(adapter: StoreAdapter, settle: Duration, wake: Box<dyn Fn() + Send>) -> Self {
        let (req_tx, req_rx) = channel::<StoreRequest>();
        let (out_tx, out_rx) = channel::<StoreOutcome>();
        let spawned = thread::Builder::new()
            .name("store-worker".into())
            .spawn(move || {
                for request in req_rx {
                    let outcome = execute(&adapter, request, settle);
                    if out_tx.send(outcome).is_err() {
                        break;
                    }
                    wake();
                }
                tracing::debug!("store worker stopped");
            });
        let handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!("failed to spawn store worker: {e}");
                None
            }
        };
        Self {
            tx: Some(req_tx),
            rx: out_rx,
            handle,
        }
    }

    pub fn submit(&self, request: StoreRequest) {
        if let Some(tx) = &self.tx {
            if let Err(e) = tx.send(request) {
                tracing::error!(request = ?e.0, "store worker is gone");
            }
        }
    }

    pub fn try_recv(&self) -> Option<StoreOutcome> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<StoreOutcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for StoreWorker {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
