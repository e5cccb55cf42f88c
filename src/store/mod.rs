//! Image store collaborator and the thin layers between it and the gallery.

pub mod adapter;
pub mod disk;
pub mod notify;
pub mod worker;

use crate::gallery::record::{ContentKey, ImageRecord, Locator};

pub use adapter::StoreAdapter;
pub use notify::{ChangeNotifier, Subscription};
pub use worker::{StoreOutcome, StoreRequest, StoreWorker};

/// Callback fired whenever the watcher stores a new capture.
pub type ChangeCallback = Box<dyn Fn() + Send + Sync>;

/// Persistence and clipboard operations the gallery consumes.
///
/// Every method may fail; callers go through [`StoreAdapter`], which turns an
/// absent store into empty reads and no-op writes.
pub trait ImageStore: Send + Sync {
    fn list(&self) -> anyhow::Result<Vec<ImageRecord>>;
    fn delete(&self, identity: &ContentKey) -> anyhow::Result<()>;
    fn clear_all(&self) -> anyhow::Result<()>;
    /// Make the watcher skip the next clipboard change, which the gallery is
    /// about to cause itself.
    fn reset_capture_state(&self) -> anyhow::Result<()>;
    fn copy_to_clipboard(&self, locator: &Locator) -> anyhow::Result<()>;
    fn read_bytes(&self, locator: &Locator) -> anyhow::Result<Vec<u8>>;
    fn on_external_change(&self, callback: ChangeCallback) -> Subscription;
}
