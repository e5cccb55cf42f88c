//! Interaction core of the gallery window.
//!
//! [`Gallery`] owns the image list, the context menu, the full-view overlay
//! and the suppression timestamp. Every pointer and keyboard event is
//! dispatched to whichever [`layers::Layer`] is on top, so exactly one
//! component answers each right-click.

pub mod layers;
pub mod lightbox;
pub mod menu;
pub mod merge;
pub mod record;
pub mod router;

use crate::settings::Settings;
use layers::{Layer, LayerStack};
use lightbox::Lightbox;
use menu::{MenuAction, MenuEntry, MenuPresenter, Reposition, MENU_WIDTH};
use record::{ContentKey, ImageRecord, Locator, ScreenPoint};
use router::{InteractionRouter, RouteDecision, Routed, SecondaryClick, SuppressionWindow, MENU_SUPPRESSION};
use std::collections::HashSet;
use std::time::{Duration, Instant};

pub use merge::merge;

#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub suppression: Duration,
    pub menu_width: f32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            suppression: MENU_SUPPRESSION,
            menu_width: MENU_WIDTH,
        }
    }
}

impl From<&Settings> for GalleryConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            suppression: Duration::from_millis(settings.menu_suppression_ms),
            menu_width: settings.menu_width,
        }
    }
}

/// How a right-click was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Opened,
    Repositioned,
    Closed,
    /// Handled without visible change.
    Swallowed,
    /// Not ours; default handling may proceed.
    Passed,
}

impl ClickOutcome {
    pub fn suppresses_default(self) -> bool {
        !matches!(self, ClickOutcome::Passed)
    }
}

#[derive(Debug)]
pub struct Gallery {
    images: Vec<ImageRecord>,
    router: InteractionRouter,
    menu: MenuPresenter,
    lightbox: Option<Lightbox>,
    layers: LayerStack,
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new(GalleryConfig::default())
    }
}

impl Gallery {
    pub fn new(config: GalleryConfig) -> Self {
        Self {
            images: Vec::new(),
            router: InteractionRouter::new(config.suppression),
            menu: MenuPresenter::new(config.menu_width),
            lightbox: None,
            layers: LayerStack::default(),
        }
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn menu(&self) -> &MenuPresenter {
        &self.menu
    }

    pub fn lightbox(&self) -> Option<&Lightbox> {
        self.lightbox.as_ref()
    }

    /// Record shown by the overlay, if it is open.
    pub fn lightbox_record(&self) -> Option<&ImageRecord> {
        self.lightbox.as_ref().and_then(|lb| lb.current(&self.images))
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn suppression(&self) -> &SuppressionWindow {
        self.router.suppression()
    }

    pub fn menu_anchor(&self, viewport_width: f32) -> Option<ScreenPoint> {
        self.menu.anchor(viewport_width)
    }

    /// Dispatch a right-click to the layer on top.
    pub fn secondary_click(&mut self, click: SecondaryClick) -> ClickOutcome {
        match self.layers.top() {
            Layer::Menu => {
                let result = self.menu.reposition(
                    &click.hit,
                    click.at,
                    &self.images,
                    click.now,
                    self.router.suppression_mut(),
                );
                match result {
                    Reposition::Moved => ClickOutcome::Repositioned,
                    Reposition::Closed => {
                        self.layers.remove(Layer::Menu);
                        ClickOutcome::Closed
                    }
                    Reposition::Ignored => ClickOutcome::Swallowed,
                }
            }
            Layer::Lightbox => {
                let routed = match &self.lightbox {
                    Some(lb) => lb.route(&click, self.menu.is_open(), self.router.suppression(), &self.images),
                    None => {
                        tracing::warn!("lightbox layer active without an overlay");
                        self.layers.remove(Layer::Lightbox);
                        return ClickOutcome::Passed;
                    }
                };
                self.apply_route(routed)
            }
            Layer::Gallery => {
                let routed = self.router.route(&click, self.menu.is_open(), &self.images);
                self.apply_route(routed)
            }
        }
    }

    fn apply_route(&mut self, routed: Routed) -> ClickOutcome {
        match routed.decision {
            RouteDecision::Open { request, at } => {
                self.menu.open(request, at);
                self.layers.push(Layer::Menu);
                ClickOutcome::Opened
            }
            RouteDecision::NoOp if routed.suppress_default => ClickOutcome::Swallowed,
            RouteDecision::NoOp => ClickOutcome::Passed,
        }
    }

    /// Pointer pressed or released on the dimming overlay.
    pub fn dismiss_menu(&mut self, now: Instant) -> bool {
        let closed = self.menu.close(now, self.router.suppression_mut());
        self.layers.remove(Layer::Menu);
        closed
    }

    /// Cancel key: closes whatever sits on top.
    pub fn escape(&mut self, now: Instant) -> bool {
        match self.layers.top() {
            Layer::Menu => self.dismiss_menu(now),
            Layer::Lightbox => self.close_lightbox(),
            Layer::Gallery => false,
        }
    }

    pub fn select(&mut self, entry: MenuEntry, now: Instant) -> Option<MenuAction> {
        let action = self.menu.select(entry, now, self.router.suppression_mut());
        self.layers.remove(Layer::Menu);
        if let Some(action) = &action {
            tracing::debug!(?action, "menu action selected");
        }
        action
    }

    /// Advance per-frame state. Returns `true` while another frame is needed.
    pub fn begin_frame(&mut self) -> bool {
        self.menu.begin_frame()
    }

    pub fn open_lightbox(&mut self, index: usize, now: Instant) -> bool {
        let Some(lb) = Lightbox::open(index, &self.images) else {
            return false;
        };
        self.dismiss_menu(now);
        self.lightbox = Some(lb);
        self.layers.push(Layer::Lightbox);
        true
    }

    pub fn open_lightbox_at(&mut self, locator: &Locator, now: Instant) -> bool {
        match self.images.iter().position(|r| &r.locator == locator) {
            Some(index) => self.open_lightbox(index, now),
            None => false,
        }
    }

    pub fn close_lightbox(&mut self) -> bool {
        self.layers.remove(Layer::Lightbox);
        self.lightbox.take().is_some()
    }

    pub fn show_next(&mut self) {
        if let Some(lb) = self.lightbox.as_mut() {
            lb.next(&self.images);
        }
    }

    pub fn show_previous(&mut self) {
        if let Some(lb) = self.lightbox.as_mut() {
            lb.previous(&self.images);
        }
    }

    /// Install a freshly listed set of records. Later duplicates of a locator
    /// are dropped.
    pub fn replace_images(&mut self, images: Vec<ImageRecord>) {
        let mut seen = HashSet::with_capacity(images.len());
        let before = images.len();
        self.images = images
            .into_iter()
            .filter(|r| seen.insert(r.locator.clone()))
            .collect();
        if self.images.len() != before {
            tracing::warn!(dropped = before - self.images.len(), "duplicate locators in listing");
        }
        self.sync_lightbox();
    }

    /// Install the listing that follows a copy-back, collapsing resurfaced
    /// captures.
    pub fn apply_copy_back(&mut self, refreshed: Vec<ImageRecord>) {
        self.replace_images(merge(&refreshed));
    }

    /// Remove every record of `identity` once the store confirmed the delete.
    pub fn confirm_delete(&mut self, identity: &ContentKey) {
        let showing = self
            .lightbox_record()
            .map(|r| &r.identity == identity)
            .unwrap_or(false);
        self.images.retain(|r| &r.identity != identity);
        if showing {
            self.close_lightbox();
        } else {
            self.sync_lightbox();
        }
    }

    pub fn confirm_clear(&mut self) {
        self.images.clear();
        self.close_lightbox();
    }

    fn sync_lightbox(&mut self) {
        let keep = match self.lightbox.as_mut() {
            Some(lb) => lb.sync(&self.images),
            None => return,
        };
        if !keep {
            self.close_lightbox();
        }
    }
}
