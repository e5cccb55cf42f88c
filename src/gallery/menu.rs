use super::record::{ImageRecord, ScreenPoint};
use super::router::{resolve, HitTarget, MenuRequest, SuppressionWindow};
use std::time::Instant;

/// Fixed width of the context menu in logical pixels.
pub const MENU_WIDTH: f32 = 192.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Copy,
    Delete,
    ClearAll,
}

impl MenuEntry {
    pub fn label(self) -> &'static str {
        match self {
            MenuEntry::Copy => "Copy",
            MenuEntry::Delete => "Delete",
            MenuEntry::ClearAll => "Clear all",
        }
    }
}

const ITEM_ENTRIES: &[MenuEntry] = &[MenuEntry::Copy, MenuEntry::Delete];
const CLEAR_ENTRIES: &[MenuEntry] = &[MenuEntry::ClearAll];

/// Position and target of the context menu. No position means hidden.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuState {
    pub position: Option<ScreenPoint>,
    pub target: Option<ImageRecord>,
}

impl MenuState {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn for_request(request: MenuRequest, at: ScreenPoint) -> Self {
        let target = match request {
            MenuRequest::Item(record) => Some(record),
            MenuRequest::ClearAll => None,
        };
        Self {
            position: Some(at),
            target,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.position.is_some()
    }

    pub fn entries(&self) -> &'static [MenuEntry] {
        match (&self.position, &self.target) {
            (None, _) => &[],
            (Some(_), Some(_)) => ITEM_ENTRIES,
            (Some(_), None) => CLEAR_ENTRIES,
        }
    }
}

/// Flip the menu left of the pointer when it would overflow the right edge.
/// The vertical anchor is never adjusted.
pub fn anchor_for(position: ScreenPoint, viewport_width: f32, menu_width: f32) -> ScreenPoint {
    if viewport_width - position.x < menu_width {
        ScreenPoint::new(position.x - menu_width, position.y)
    } else {
        position
    }
}

/// Store work requested by picking a menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    Copy(ImageRecord),
    Delete(ImageRecord),
    ClearAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reposition {
    /// The menu will reappear at the new anchor after one hidden frame.
    Moved,
    /// Nothing to show under the pointer; the menu was closed.
    Closed,
    /// The click landed on the menu itself and changed nothing.
    Ignored,
}

#[derive(Debug, Clone)]
struct Pending {
    state: MenuState,
    hidden_frames: u8,
}

/// Owns the visible menu from the moment it opens until it closes.
#[derive(Debug, Clone)]
pub struct MenuPresenter {
    state: MenuState,
    pending: Option<Pending>,
    width: f32,
}

impl Default for MenuPresenter {
    fn default() -> Self {
        Self::new(MENU_WIDTH)
    }
}

impl MenuPresenter {
    pub fn new(width: f32) -> Self {
        Self {
            state: MenuState::hidden(),
            pending: None,
            width,
        }
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Open or mid-reposition. A repositioning menu still owns right-clicks
    /// during its hidden frame.
    pub fn is_open(&self) -> bool {
        self.state.is_visible() || self.pending.is_some()
    }

    pub fn is_repositioning(&self) -> bool {
        self.pending.is_some()
    }

    /// Show the menu immediately. Used for the initial open only.
    pub fn open(&mut self, request: MenuRequest, at: ScreenPoint) {
        self.pending = None;
        self.state = MenuState::for_request(request, at);
    }

    /// Re-resolve a right-click that arrived while the menu is open.
    pub fn reposition(
        &mut self,
        hit: &HitTarget,
        at: ScreenPoint,
        images: &[ImageRecord],
        now: Instant,
        suppression: &mut SuppressionWindow,
    ) -> Reposition {
        if *hit == HitTarget::Menu {
            return Reposition::Ignored;
        }
        match resolve(hit, images) {
            Some(request) => {
                tracing::debug!(?request, x = at.x, y = at.y, "repositioning menu");
                self.state = MenuState::hidden();
                self.pending = Some(Pending {
                    state: MenuState::for_request(request, at),
                    hidden_frames: 1,
                });
                Reposition::Moved
            }
            None => {
                self.close(now, suppression);
                Reposition::Closed
            }
        }
    }

    /// Advance one render pass. Returns `true` while a reposition is still
    /// in flight so the caller keeps frames coming.
    pub fn begin_frame(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        if pending.hidden_frames > 0 {
            pending.hidden_frames -= 1;
            return true;
        }
        if let Some(pending) = self.pending.take() {
            self.state = pending.state;
        }
        false
    }

    /// Hide the menu and stamp the suppression window. Returns `false` when
    /// nothing was open.
    pub fn close(&mut self, now: Instant, suppression: &mut SuppressionWindow) -> bool {
        if !self.is_open() {
            return false;
        }
        self.state = MenuState::hidden();
        self.pending = None;
        suppression.record_close(now);
        true
    }

    /// Pick an entry. The menu closes whether or not an action results.
    pub fn select(
        &mut self,
        entry: MenuEntry,
        now: Instant,
        suppression: &mut SuppressionWindow,
    ) -> Option<MenuAction> {
        let action = match (entry, &self.state.target) {
            (MenuEntry::Copy, Some(record)) => Some(MenuAction::Copy(record.clone())),
            (MenuEntry::Delete, Some(record)) => Some(MenuAction::Delete(record.clone())),
            (MenuEntry::ClearAll, None) if self.state.is_visible() => Some(MenuAction::ClearAll),
            _ => None,
        };
        self.close(now, suppression);
        action
    }

    /// Top-left corner to draw at for a window `viewport_width` wide.
    pub fn anchor(&self, viewport_width: f32) -> Option<ScreenPoint> {
        self.state
            .position
            .map(|p| anchor_for(p, viewport_width, self.width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::record::{ContentKey, Locator};

    fn record(id: &str) -> ImageRecord {
        ImageRecord::new(ContentKey::new(id), Locator::new(format!("{id}.png")), 1)
    }

    #[test]
    fn flips_near_right_edge() {
        let p = anchor_for(ScreenPoint::new(900.0, 50.0), 1000.0, MENU_WIDTH);
        assert_eq!(p, ScreenPoint::new(900.0 - MENU_WIDTH, 50.0));
        let q = anchor_for(ScreenPoint::new(100.0, 50.0), 1000.0, MENU_WIDTH);
        assert_eq!(q, ScreenPoint::new(100.0, 50.0));
    }

    #[test]
    fn exact_width_does_not_flip() {
        let p = anchor_for(ScreenPoint::new(808.0, 0.0), 1000.0, MENU_WIDTH);
        assert_eq!(p.x, 808.0);
    }

    #[test]
    fn entries_match_target() {
        let item = MenuState::for_request(MenuRequest::Item(record("a")), ScreenPoint::default());
        assert_eq!(item.entries(), &[MenuEntry::Copy, MenuEntry::Delete]);
        let clear = MenuState::for_request(MenuRequest::ClearAll, ScreenPoint::default());
        assert_eq!(clear.entries(), &[MenuEntry::ClearAll]);
        assert!(MenuState::hidden().entries().is_empty());
    }

    #[test]
    fn reposition_passes_through_one_hidden_frame() {
        let images = vec![record("a"), record("b")];
        let mut suppression = SuppressionWindow::default();
        let mut menu = MenuPresenter::default();
        menu.open(MenuRequest::Item(images[0].clone()), ScreenPoint::new(1.0, 1.0));

        let hit = HitTarget::Thumbnail(images[1].locator.clone());
        let result = menu.reposition(&hit, ScreenPoint::new(5.0, 5.0), &images, Instant::now(), &mut suppression);
        assert_eq!(result, Reposition::Moved);
        assert!(!menu.state().is_visible());
        assert!(menu.is_open());

        assert!(menu.begin_frame());
        assert!(!menu.state().is_visible());

        assert!(!menu.begin_frame());
        assert_eq!(menu.state().target.as_ref(), Some(&images[1]));
        assert_eq!(menu.state().position, Some(ScreenPoint::new(5.0, 5.0)));
        assert!(suppression.last_close().is_none());
    }

    #[test]
    fn reposition_onto_nothing_closes_and_stamps() {
        let images = vec![record("a")];
        let mut suppression = SuppressionWindow::default();
        let mut menu = MenuPresenter::default();
        menu.open(MenuRequest::ClearAll, ScreenPoint::default());
        let now = Instant::now();
        let result = menu.reposition(&HitTarget::Outside, ScreenPoint::default(), &images, now, &mut suppression);
        assert_eq!(result, Reposition::Closed);
        assert!(!menu.is_open());
        assert_eq!(suppression.last_close(), Some(now));
    }

    #[test]
    fn select_closes_even_without_action() {
        let mut suppression = SuppressionWindow::default();
        let mut menu = MenuPresenter::default();
        menu.open(MenuRequest::ClearAll, ScreenPoint::default());
        assert_eq!(menu.select(MenuEntry::Copy, Instant::now(), &mut suppression), None);
        assert!(!menu.is_open());
        assert!(suppression.last_close().is_some());
    }
}
