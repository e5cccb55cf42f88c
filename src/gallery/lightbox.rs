use super::record::{ImageRecord, Locator};
use super::router::{gate, HitTarget, MenuRequest, RouteDecision, Routed, SecondaryClick, SuppressionWindow};

pub fn next_index(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (index + 1) % len
    }
}

pub fn previous_index(index: usize, len: usize) -> usize {
    match (index, len) {
        (_, 0) => 0,
        (0, len) => len - 1,
        (index, _) => index - 1,
    }
}

/// Full-view overlay showing one record of the gallery list.
#[derive(Debug, Clone, PartialEq)]
pub struct Lightbox {
    index: usize,
    locator: Locator,
}

impl Lightbox {
    /// `None` when `index` is out of range.
    pub fn open(index: usize, images: &[ImageRecord]) -> Option<Self> {
        images.get(index).map(|record| Self {
            index,
            locator: record.locator.clone(),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn current<'a>(&self, images: &'a [ImageRecord]) -> Option<&'a ImageRecord> {
        images.get(self.index)
    }

    pub fn next(&mut self, images: &[ImageRecord]) {
        self.go_to(next_index(self.index, images.len()), images);
    }

    pub fn previous(&mut self, images: &[ImageRecord]) {
        self.go_to(previous_index(self.index, images.len()), images);
    }

    fn go_to(&mut self, index: usize, images: &[ImageRecord]) {
        if let Some(record) = images.get(index) {
            self.index = index;
            self.locator = record.locator.clone();
        }
    }

    /// Follow the displayed record through a list change. Returns `false`
    /// when the list is empty and the overlay has nothing left to show.
    pub fn sync(&mut self, images: &[ImageRecord]) -> bool {
        if images.is_empty() {
            return false;
        }
        match images.iter().position(|r| r.locator == self.locator) {
            Some(index) => self.index = index,
            None => {
                self.index = self.index.min(images.len() - 1);
                self.locator = images[self.index].locator.clone();
            }
        }
        true
    }

    /// Local router used while the overlay is open. Only the displayed image
    /// can open a menu; it always targets the current index.
    pub fn route(
        &self,
        click: &SecondaryClick,
        menu_open: bool,
        suppression: &SuppressionWindow,
        images: &[ImageRecord],
    ) -> Routed {
        if let Some(routed) = gate(suppression, click.now, menu_open) {
            return routed;
        }
        match (&click.hit, self.current(images)) {
            (HitTarget::FullView(_), Some(record)) => Routed {
                decision: RouteDecision::Open {
                    request: MenuRequest::Item(record.clone()),
                    at: click.at,
                },
                suppress_default: true,
            },
            _ => Routed {
                decision: RouteDecision::NoOp,
                suppress_default: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::record::{ContentKey, ScreenPoint};
    use std::time::Instant;

    fn images(n: usize) -> Vec<ImageRecord> {
        (0..n)
            .map(|i| ImageRecord::new(ContentKey::new(format!("k{i}")), Locator::new(format!("{i}.png")), i as i64))
            .collect()
    }

    #[test]
    fn wraps_both_directions() {
        assert_eq!(next_index(4, 5), 0);
        assert_eq!(previous_index(0, 5), 4);
        assert_eq!(next_index(1, 5), 2);
        assert_eq!(previous_index(3, 5), 2);
        assert_eq!(next_index(0, 0), 0);
        assert_eq!(previous_index(0, 0), 0);
    }

    #[test]
    fn sync_follows_record_after_reorder() {
        let list = images(3);
        let mut lb = Lightbox::open(1, &list).unwrap();
        let mut reordered = list.clone();
        reordered.reverse();
        assert!(lb.sync(&reordered));
        assert_eq!(lb.index(), 1);
        reordered.remove(0);
        assert!(lb.sync(&reordered));
        assert_eq!(lb.current(&reordered).unwrap().locator, Locator::new("1.png"));
    }

    #[test]
    fn sync_clamps_when_record_vanishes() {
        let list = images(3);
        let mut lb = Lightbox::open(2, &list).unwrap();
        let shorter = list[..2].to_vec();
        assert!(lb.sync(&shorter));
        assert_eq!(lb.index(), 1);
        assert!(!lb.sync(&[]));
    }

    #[test]
    fn backdrop_click_is_not_routed() {
        let list = images(2);
        let lb = Lightbox::open(0, &list).unwrap();
        let click = SecondaryClick {
            at: ScreenPoint::default(),
            hit: HitTarget::Backdrop,
            now: Instant::now(),
        };
        let routed = lb.route(&click, false, &SuppressionWindow::default(), &list);
        assert_eq!(routed.decision, RouteDecision::NoOp);
    }
}
