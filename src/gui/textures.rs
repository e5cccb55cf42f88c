use crate::gallery::record::{ImageRecord, Locator};
use eframe::egui;
use std::collections::{HashMap, HashSet};

type Key = (Locator, u32);

enum Slot {
    Pending,
    Ready(egui::TextureHandle),
    Failed,
}

/// What the cache knows about an image.
pub enum Lookup<'a> {
    Ready(&'a egui::TextureHandle),
    Loading,
    Failed,
}

/// Decoded textures keyed by locator and requested size.
///
/// Misses are queued and handed out through [`TextureCache::take_requests`]
/// so decoding happens on the store worker, not the UI thread.
#[derive(Default)]
pub struct TextureCache {
    slots: HashMap<Key, Slot>,
    queued: Vec<Key>,
}

impl TextureCache {
    pub fn get(&mut self, locator: &Locator, max_side: u32) -> Lookup<'_> {
        let key = (locator.clone(), max_side);
        if !self.slots.contains_key(&key) {
            self.slots.insert(key.clone(), Slot::Pending);
            self.queued.push(key.clone());
        }
        match self.slots.get(&key) {
            Some(Slot::Ready(tex)) => Lookup::Ready(tex),
            Some(Slot::Failed) => Lookup::Failed,
            _ => Lookup::Loading,
        }
    }

    pub fn take_requests(&mut self) -> Vec<(Locator, u32)> {
        std::mem::take(&mut self.queued)
    }

    /// Fill a pending slot. Returns `false` and drops the image when the slot
    /// was evicted while the load was in flight.
    pub fn insert(&mut self, ctx: &egui::Context, locator: Locator, max_side: u32, image: &image::RgbaImage) -> bool {
        let key = (locator, max_side);
        if !self.is_pending(&key) {
            tracing::debug!(locator = %key.0, "dropping texture for unlisted image");
            return false;
        }
        let size = [image.width() as usize, image.height() as usize];
        let tex = ctx.load_texture(
            format!("{}@{}", key.0, key.1),
            egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw()),
            egui::TextureOptions::LINEAR,
        );
        self.slots.insert(key, Slot::Ready(tex));
        true
    }

    pub fn mark_failed(&mut self, locator: Locator, max_side: u32) {
        let key = (locator, max_side);
        if self.is_pending(&key) {
            self.slots.insert(key, Slot::Failed);
        }
    }

    fn is_pending(&self, key: &Key) -> bool {
        matches!(self.slots.get(key), Some(Slot::Pending))
    }

    /// Drop textures of images that are no longer listed.
    pub fn retain(&mut self, images: &[ImageRecord]) {
        let live: HashSet<&Locator> = images.iter().map(|r| &r.locator).collect();
        self.slots.retain(|(locator, _), _| live.contains(locator));
        self.queued.retain(|(locator, _)| live.contains(locator));
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Largest rect with `image`'s aspect ratio centred inside `outer`.
pub fn fit_rect(outer: egui::Rect, image: egui::Vec2) -> egui::Rect {
    if image.x <= 0.0 || image.y <= 0.0 {
        return outer;
    }
    let scale = (outer.width() / image.x).min(outer.height() / image.y);
    egui::Rect::from_center_size(outer.center(), image * scale)
}
