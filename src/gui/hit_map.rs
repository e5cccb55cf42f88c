use crate::gallery::router::HitTarget;
use eframe::egui::{Pos2, Rect};

/// Screen regions painted during the last frame, in paint order.
///
/// Right-clicks are resolved against the previous frame's map so the target
/// is whatever the user actually saw under the pointer.
#[derive(Debug, Default)]
pub struct HitMap {
    entries: Vec<(Rect, HitTarget)>,
}

impl HitMap {
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Register a region; later registrations sit on top of earlier ones.
    pub fn register(&mut self, rect: Rect, target: HitTarget) {
        if rect.is_positive() {
            self.entries.push((rect, target));
        }
    }

    pub fn hit_test(&self, pos: Pos2) -> HitTarget {
        self.entries
            .iter()
            .rev()
            .find(|(rect, _)| rect.contains(pos))
            .map(|(_, target)| target.clone())
            .unwrap_or(HitTarget::Outside)
    }

    /// Topmost region registered for `target`.
    pub fn rect_of(&self, target: &HitTarget) -> Option<Rect> {
        self.entries
            .iter()
            .rev()
            .find(|(_, t)| t == target)
            .map(|(rect, _)| *rect)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
