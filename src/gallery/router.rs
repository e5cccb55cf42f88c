use super::record::{find_by_locator, ImageRecord, Locator, ScreenPoint};
use std::time::{Duration, Instant};

/// Default quiet period after a menu closes.
pub const MENU_SUPPRESSION: Duration = Duration::from_millis(300);

/// What lies under the pointer, topmost element first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    /// A thumbnail in the grid.
    Thumbnail(Locator),
    /// The image shown by the full-view overlay.
    FullView(Locator),
    /// Empty space on the main gallery surface.
    Surface,
    /// The context menu panel itself.
    Menu,
    /// The dimmed area around the full-view image.
    Backdrop,
    /// Anything the gallery does not own.
    Outside,
}

/// Which menu a right-click asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuRequest {
    Item(ImageRecord),
    ClearAll,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteDecision {
    Open { request: MenuRequest, at: ScreenPoint },
    NoOp,
}

/// Result of routing a single right-click.
#[derive(Debug, Clone, PartialEq)]
pub struct Routed {
    pub decision: RouteDecision,
    /// Whether the event must be kept from any default handling.
    pub suppress_default: bool,
}

impl Routed {
    fn open(request: MenuRequest, at: ScreenPoint) -> Self {
        Self {
            decision: RouteDecision::Open { request, at },
            suppress_default: true,
        }
    }

    fn swallowed() -> Self {
        Self {
            decision: RouteDecision::NoOp,
            suppress_default: true,
        }
    }

    fn passed() -> Self {
        Self {
            decision: RouteDecision::NoOp,
            suppress_default: false,
        }
    }
}

/// A secondary-button press at window coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryClick {
    pub at: ScreenPoint,
    pub hit: HitTarget,
    pub now: Instant,
}

/// Timestamp of the last menu close and the quiet period that follows it.
#[derive(Debug, Clone)]
pub struct SuppressionWindow {
    last_close: Option<Instant>,
    window: Duration,
}

impl Default for SuppressionWindow {
    fn default() -> Self {
        Self::new(MENU_SUPPRESSION)
    }
}

impl SuppressionWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            last_close: None,
            window,
        }
    }

    pub fn record_close(&mut self, now: Instant) {
        self.last_close = Some(now);
    }

    pub fn last_close(&self) -> Option<Instant> {
        self.last_close
    }

    pub fn suppresses(&self, now: Instant) -> bool {
        match self.last_close {
            Some(closed) => now.saturating_duration_since(closed) < self.window,
            None => false,
        }
    }
}

/// Map a hit target to the menu it asks for.
///
/// A thumbnail whose locator is no longer listed falls back to the surface
/// rule since thumbnails sit on the gallery surface. A stale full-view image
/// resolves to nothing.
pub fn resolve(hit: &HitTarget, images: &[ImageRecord]) -> Option<MenuRequest> {
    match hit {
        HitTarget::Thumbnail(locator) => match find_by_locator(images, locator) {
            Some(record) => Some(MenuRequest::Item(record.clone())),
            None => {
                tracing::debug!(%locator, "thumbnail no longer listed");
                surface_request(images)
            }
        },
        HitTarget::FullView(locator) => match find_by_locator(images, locator) {
            Some(record) => Some(MenuRequest::Item(record.clone())),
            None => {
                tracing::debug!(%locator, "full-view image no longer listed");
                None
            }
        },
        HitTarget::Surface => surface_request(images),
        HitTarget::Menu | HitTarget::Backdrop | HitTarget::Outside => None,
    }
}

fn surface_request(images: &[ImageRecord]) -> Option<MenuRequest> {
    if images.is_empty() {
        None
    } else {
        Some(MenuRequest::ClearAll)
    }
}

/// Gate shared by every router: debounce first, then defer to an open menu.
pub(crate) fn gate(suppression: &SuppressionWindow, now: Instant, menu_open: bool) -> Option<Routed> {
    if suppression.suppresses(now) {
        tracing::debug!("right-click inside suppression window");
        return Some(Routed::swallowed());
    }
    if menu_open {
        return Some(Routed::swallowed());
    }
    None
}

/// Top-level arbiter for right-clicks on the gallery window.
///
/// Owns the suppression window so every layer that closes a menu stamps the
/// same timestamp.
#[derive(Debug, Default)]
pub struct InteractionRouter {
    suppression: SuppressionWindow,
}

impl InteractionRouter {
    pub fn new(suppression: Duration) -> Self {
        Self {
            suppression: SuppressionWindow::new(suppression),
        }
    }

    pub fn suppression(&self) -> &SuppressionWindow {
        &self.suppression
    }

    pub fn suppression_mut(&mut self) -> &mut SuppressionWindow {
        &mut self.suppression
    }

    pub fn route(&self, click: &SecondaryClick, menu_open: bool, images: &[ImageRecord]) -> Routed {
        if let Some(routed) = gate(&self.suppression, click.now, menu_open) {
            return routed;
        }
        match resolve(&click.hit, images) {
            Some(request) => {
                tracing::debug!(?request, x = click.at.x, y = click.at.y, "opening menu");
                Routed::open(request, click.at)
            }
            None => Routed::passed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::record::ContentKey;

    fn images() -> Vec<ImageRecord> {
        vec![ImageRecord::new(ContentKey::new("a"), Locator::new("a.png"), 1)]
    }

    fn click(hit: HitTarget, now: Instant) -> SecondaryClick {
        SecondaryClick {
            at: ScreenPoint::new(10.0, 20.0),
            hit,
            now,
        }
    }

    #[test]
    fn debounce_after_close() {
        let t0 = Instant::now();
        let mut router = InteractionRouter::default();
        router.suppression_mut().record_close(t0);
        let early = router.route(
            &click(HitTarget::Surface, t0 + Duration::from_millis(150)),
            false,
            &images(),
        );
        assert_eq!(early.decision, RouteDecision::NoOp);
        let later = router.route(
            &click(HitTarget::Surface, t0 + Duration::from_millis(350)),
            false,
            &images(),
        );
        assert!(matches!(
            later.decision,
            RouteDecision::Open {
                request: MenuRequest::ClearAll,
                ..
            }
        ));
    }

    #[test]
    fn open_menu_defers_to_presenter() {
        let router = InteractionRouter::default();
        let routed = router.route(&click(HitTarget::Surface, Instant::now()), true, &images());
        assert_eq!(routed.decision, RouteDecision::NoOp);
        assert!(routed.suppress_default);
    }

    #[test]
    fn stale_thumbnail_falls_back_to_clear_menu() {
        let hit = HitTarget::Thumbnail(Locator::new("gone.png"));
        assert_eq!(resolve(&hit, &images()), Some(MenuRequest::ClearAll));
        assert_eq!(resolve(&hit, &[]), None);
    }

    #[test]
    fn stale_full_view_resolves_to_nothing() {
        let hit = HitTarget::FullView(Locator::new("gone.png"));
        assert_eq!(resolve(&hit, &images()), None);
    }

    #[test]
    fn outside_is_passed_through() {
        let router = InteractionRouter::default();
        let routed = router.route(&click(HitTarget::Outside, Instant::now()), false, &images());
        assert_eq!(routed.decision, RouteDecision::NoOp);
        assert!(!routed.suppress_default);
    }
}
