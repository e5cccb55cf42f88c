use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Content-derived key shared by every capture of the same logical image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(String);

impl ContentKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to the file backing a single record. Unique per record even when
/// several records share a [`ContentKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }
}

impl From<&Path> for Locator {
    fn from(path: &Path) -> Self {
        Self(path.to_string_lossy().to_string())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored clipboard image as the gallery sees it.
///
/// Serialized as `{ "id", "path", "created_at" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(rename = "id")]
    pub identity: ContentKey,
    #[serde(rename = "path")]
    pub locator: Locator,
    /// Capture time in Unix milliseconds.
    pub created_at: i64,
}

impl ImageRecord {
    pub fn new(identity: ContentKey, locator: Locator, created_at: i64) -> Self {
        Self {
            identity,
            locator,
            created_at,
        }
    }
}

/// Window coordinates in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Resolve a locator to the record currently listed under it.
pub fn find_by_locator<'a>(images: &'a [ImageRecord], locator: &Locator) -> Option<&'a ImageRecord> {
    images.iter().find(|r| &r.locator == locator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_legacy_field_names() {
        let rec = ImageRecord::new(ContentKey::new("abc"), Locator::new("/tmp/abc.png"), 42);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["path"], "/tmp/abc.png");
        assert_eq!(json["created_at"], 42);
        let back: ImageRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn stale_locator_resolves_to_nothing() {
        let images = vec![ImageRecord::new(ContentKey::new("a"), Locator::new("a.png"), 1)];
        assert!(find_by_locator(&images, &Locator::new("a.png")).is_some());
        assert!(find_by_locator(&images, &Locator::new("gone.png")).is_none());
    }
}
