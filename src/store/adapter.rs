use super::{ChangeCallback, ImageStore, Subscription};
use crate::gallery::record::{ContentKey, ImageRecord, Locator};
use anyhow::anyhow;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Façade over an optional [`ImageStore`].
///
/// Without a store every read returns an empty list and every mutation is a
/// silent no-op so the gallery keeps working in an empty state.
#[derive(Clone, Default)]
pub struct StoreAdapter {
    store: Option<Arc<dyn ImageStore>>,
}

impl StoreAdapter {
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn unavailable() -> Self {
        Self { store: None }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    pub fn list(&self) -> anyhow::Result<Vec<ImageRecord>> {
        match &self.store {
            Some(store) => store.list(),
            None => Ok(Vec::new()),
        }
    }

    pub fn delete(&self, identity: &ContentKey) -> anyhow::Result<()> {
        match &self.store {
            Some(store) => store.delete(identity),
            None => {
                tracing::debug!(%identity, "store unavailable; delete skipped");
                Ok(())
            }
        }
    }

    pub fn clear_all(&self) -> anyhow::Result<()> {
        match &self.store {
            Some(store) => store.clear_all(),
            None => {
                tracing::debug!("store unavailable; clear skipped");
                Ok(())
            }
        }
    }

    pub fn reset_capture_state(&self) -> anyhow::Result<()> {
        match &self.store {
            Some(store) => store.reset_capture_state(),
            None => Ok(()),
        }
    }

    pub fn copy_to_clipboard(&self, locator: &Locator) -> anyhow::Result<()> {
        match &self.store {
            Some(store) => store.copy_to_clipboard(locator),
            None => {
                tracing::debug!(%locator, "store unavailable; copy skipped");
                Ok(())
            }
        }
    }

    pub fn read_bytes(&self, locator: &Locator) -> anyhow::Result<Vec<u8>> {
        match &self.store {
            Some(store) => store.read_bytes(locator),
            None => Err(anyhow!("image store unavailable")),
        }
    }

    pub fn on_external_change(&self, callback: ChangeCallback) -> Subscription {
        match &self.store {
            Some(store) => store.on_external_change(callback),
            None => Subscription::noop(),
        }
    }

    /// Put `locator` back on the clipboard and re-list the store.
    ///
    /// Runs reset, copy, settle delay and refresh strictly in that order; the
    /// store needs the delay to reflect the copy-back before it is listed.
    pub fn copy_back(&self, locator: &Locator, settle: Duration) -> anyhow::Result<Vec<ImageRecord>> {
        self.reset_capture_state()?;
        self.copy_to_clipboard(locator)?;
        thread::sleep(settle);
        let list = self.list()?;
        tracing::info!(%locator, listed = list.len(), "copied image back to clipboard");
        Ok(list)
    }
}
