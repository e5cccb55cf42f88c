use crate::gallery::record::{ContentKey, ImageRecord, Locator};
use anyhow::Context;
use image::ImageFormat;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Lowercase hex SHA-256 of `data`.
pub fn content_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Content-addressed image files in a single directory.
///
/// Each capture is stored as `<sha256>.<ext>`; the hash is the record's
/// identity and the file path its locator.
pub struct DiskStore {
    dir: PathBuf,
    images: Mutex<HashMap<ContentKey, ImageRecord>>,
}

impl DiskStore {
    /// Open `dir`, creating it if needed, and index the images already there.
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        let images = index_dir(&dir)?;
        tracing::info!(dir = %dir.display(), images = images.len(), "image store opened");
        Ok(Self {
            dir,
            images: Mutex::new(images),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn index(&self) -> MutexGuard<'_, HashMap<ContentKey, ImageRecord>> {
        self.images.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `data` unless identical bytes are already present. The flag is
    /// `true` when an existing record was returned.
    pub fn save_image(&self, data: &[u8]) -> anyhow::Result<(ImageRecord, bool)> {
        let identity = ContentKey::new(content_hash(data));
        let mut images = self.index();
        if let Some(existing) = images.get(&identity) {
            tracing::debug!(%identity, "capture already stored");
            return Ok((existing.clone(), true));
        }

        let (ext, bytes) = match image::guess_format(data) {
            Ok(ImageFormat::Png) => ("png", Cow::Borrowed(data)),
            Ok(ImageFormat::Jpeg) => ("jpg", Cow::Borrowed(data)),
            Ok(ImageFormat::Gif) => ("gif", Cow::Borrowed(data)),
            Ok(ImageFormat::WebP) => ("webp", Cow::Borrowed(data)),
            Ok(ImageFormat::Bmp) => ("bmp", Cow::Borrowed(data)),
            _ => {
                let img = image::load_from_memory(data).context("decoding capture")?;
                let mut png = Vec::new();
                img.write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
                    .context("re-encoding capture as png")?;
                ("png", Cow::Owned(png))
            }
        };

        let path = self.dir.join(format!("{identity}.{ext}"));
        fs::write(&path, bytes.as_ref()).with_context(|| format!("writing {}", path.display()))?;
        let record = ImageRecord::new(identity.clone(), Locator::from(path.as_path()), now_millis());
        tracing::info!(%identity, path = %path.display(), "stored capture");
        images.insert(identity, record.clone());
        Ok((record, false))
    }

    /// All records, newest first.
    pub fn list(&self) -> Vec<ImageRecord> {
        let mut images: Vec<ImageRecord> = self.index().values().cloned().collect();
        images.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.identity.cmp(&b.identity))
        });
        images
    }

    pub fn delete(&self, identity: &ContentKey) -> anyhow::Result<()> {
        let mut images = self.index();
        let Some(record) = images.get(identity) else {
            return Ok(());
        };
        let path = record.locator.to_path();
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("deleting {}", path.display()))?;
        }
        images.remove(identity);
        tracing::info!(%identity, "deleted capture");
        Ok(())
    }

    pub fn clear_all(&self) -> anyhow::Result<()> {
        let mut images = self.index();
        for record in images.values() {
            let path = record.locator.to_path();
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    tracing::error!("failed to delete {} during clear: {e}", path.display());
                }
            }
        }
        let removed = images.len();
        images.clear();
        tracing::info!(removed, "cleared all captures");
        Ok(())
    }

    /// Delete captures older than `hours`. Returns how many were removed.
    pub fn cleanup_older_than(&self, hours: i64) -> anyhow::Result<usize> {
        let threshold = now_millis() - hours * 3_600_000;
        let stale: Vec<ContentKey> = self
            .index()
            .values()
            .filter(|r| r.created_at < threshold)
            .map(|r| r.identity.clone())
            .collect();
        for identity in &stale {
            self.delete(identity)?;
        }
        if !stale.is_empty() {
            tracing::info!(removed = stale.len(), hours, "removed old captures");
        }
        Ok(stale.len())
    }

    pub fn read_bytes(&self, locator: &Locator) -> anyhow::Result<Vec<u8>> {
        fs::read(locator.to_path()).with_context(|| format!("reading {locator}"))
    }
}

fn index_dir(dir: &Path) -> anyhow::Result<HashMap<ContentKey, ImageRecord>> {
    let mut images = HashMap::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false);
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !is_image {
            continue;
        }
        let created_at = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map(|t| chrono::DateTime::<chrono::Utc>::from(t).timestamp_millis())
            .unwrap_or_else(|_| now_millis());
        let identity = ContentKey::new(stem);
        images.insert(
            identity.clone(),
            ImageRecord::new(identity, Locator::from(path.as_path()), created_at),
        );
    }
    Ok(images)
}
