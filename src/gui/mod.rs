mod hit_map;
mod textures;

pub use hit_map::HitMap;
pub use textures::{fit_rect, Lookup, TextureCache};

use crate::gallery::menu::MenuEntry;
use crate::gallery::record::{Locator, ScreenPoint};
use crate::gallery::router::{HitTarget, SecondaryClick};
use crate::gallery::{Gallery, GalleryConfig};
use crate::settings::Settings;
use crate::store::{StoreAdapter, StoreOutcome, StoreRequest, StoreWorker, Subscription};
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

/// Full-size images are decoded without scaling.
const FULL_SIZE: u32 = 0;

const DIM: egui::Color32 = egui::Color32::from_rgba_premultiplied(0, 0, 0, 160);

#[derive(Clone, Copy)]
enum OverlayAction {
    Previous,
    Next,
    Close,
}

/// Which store request failed, for the error toast.
fn failure_message(request: &StoreRequest) -> &'static str {
    match request {
        StoreRequest::Refresh => "Failed to load images",
        StoreRequest::Delete(_) => "Failed to delete image",
        StoreRequest::ClearAll => "Failed to clear images",
        StoreRequest::CopyBack(_) => "Failed to copy image",
        StoreRequest::Load { .. } => "Failed to decode image",
    }
}

pub struct GalleryApp {
    gallery: Gallery,
    worker: StoreWorker,
    textures: TextureCache,
    hits: HitMap,
    /// Set when a primary press dismissed the menu; widgets stay inert until
    /// that button is released so the click does not reach them.
    swallow_primary: bool,
    changes: Receiver<()>,
    _subscription: Subscription,
    toasts: Toasts,
    enable_toasts: bool,
    toast_duration: f32,
    thumbnail_size: f32,
}

impl GalleryApp {
    pub fn new(ctx: &egui::Context, settings: &Settings, adapter: StoreAdapter) -> Self {
        let repaint = ctx.clone();
        let worker = StoreWorker::spawn(
            adapter.clone(),
            Duration::from_millis(settings.copy_settle_ms),
            Box::new(move || repaint.request_repaint()),
        );

        let (tx, rx) = channel();
        let repaint = ctx.clone();
        let subscription = adapter.on_external_change(Box::new(move || {
            let _ = tx.send(());
            repaint.request_repaint();
        }));

        if !adapter.is_available() {
            tracing::warn!("image store unavailable; gallery stays empty");
        }
        worker.submit(StoreRequest::Refresh);

        Self {
            gallery: Gallery::new(GalleryConfig::from(settings)),
            worker,
            textures: TextureCache::default(),
            hits: HitMap::default(),
            swallow_primary: false,
            changes: rx,
            _subscription: subscription,
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            enable_toasts: settings.enable_toasts,
            toast_duration: settings.toast_duration,
            thumbnail_size: settings.thumbnail_size,
        }
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    fn push_toast(&mut self, text: String, kind: ToastKind) {
        if !self.enable_toasts {
            return;
        }
        self.toasts.add(Toast {
            text: text.into(),
            kind,
            options: ToastOptions::default().duration_in_seconds(self.toast_duration as f64),
        });
    }

    fn handle_outcome(&mut self, ctx: &egui::Context, outcome: StoreOutcome) {
        match outcome {
            StoreOutcome::Listed(images) => {
                self.gallery.replace_images(images);
                self.textures.retain(self.gallery.images());
            }
            StoreOutcome::CopiedBack(images) => {
                self.gallery.apply_copy_back(images);
                self.textures.retain(self.gallery.images());
                self.push_toast("Copied to clipboard".into(), ToastKind::Success);
            }
            StoreOutcome::Deleted(identity) => {
                self.gallery.confirm_delete(&identity);
                self.textures.retain(self.gallery.images());
            }
            StoreOutcome::Cleared => {
                self.gallery.confirm_clear();
                self.textures.retain(self.gallery.images());
                self.push_toast("Gallery cleared".into(), ToastKind::Info);
            }
            StoreOutcome::Loaded {
                locator,
                max_side,
                image,
            } => {
                self.textures.insert(ctx, locator, max_side, &image);
            }
            StoreOutcome::Failed {
                request: StoreRequest::Load { locator, max_side },
                ..
            } => self.textures.mark_failed(locator, max_side),
            StoreOutcome::Failed { request, error } => {
                let text = format!("{}: {error}", failure_message(&request));
                self.push_toast(text, ToastKind::Error);
            }
        }
    }

    fn drain_store(&mut self, ctx: &egui::Context) {
        while let Some(outcome) = self.worker.try_recv() {
            self.handle_outcome(ctx, outcome);
        }
        let mut changed = false;
        while self.changes.try_recv().is_ok() {
            changed = true;
        }
        if changed {
            tracing::debug!("store changed externally; refreshing");
            self.worker.submit(StoreRequest::Refresh);
        }
    }

    /// Route this frame's input against what was painted last frame.
    fn handle_input(&mut self, ctx: &egui::Context) {
        let (secondary, primary, pos, escape, next, previous) = ctx.input(|i| {
            (
                i.pointer.button_pressed(egui::PointerButton::Secondary),
                i.pointer.button_pressed(egui::PointerButton::Primary),
                i.pointer.interact_pos(),
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::ArrowLeft),
            )
        });
        let now = Instant::now();

        if let Some(pos) = pos {
            let hit = self.hits.hit_test(pos);
            if primary && self.gallery.menu().is_open() && hit != HitTarget::Menu {
                self.gallery.dismiss_menu(now);
                self.swallow_primary = true;
            }
            if secondary {
                let outcome = self.gallery.secondary_click(SecondaryClick {
                    at: ScreenPoint::new(pos.x, pos.y),
                    hit: hit.clone(),
                    now,
                });
                if outcome.suppresses_default() {
                    tracing::debug!(?hit, ?outcome, "secondary click");
                }
            }
        }

        if escape {
            self.gallery.escape(now);
        }
        if self.gallery.lightbox().is_some() && !self.gallery.menu().is_open() {
            if next {
                self.gallery.show_next();
            } else if previous {
                self.gallery.show_previous();
            }
        }
    }

    fn grid_ui(&mut self, ctx: &egui::Context, interactive: bool) {
        let size = self.thumbnail_size;
        let max_side = size.round().max(1.0) as u32;
        let mut opened: Option<Locator> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            self.hits.register(ui.max_rect(), HitTarget::Surface);
            if self.gallery.images().is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("Copy an image to start your gallery");
                });
                return;
            }
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for record in self.gallery.images() {
                        let (rect, response) =
                            ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());
                        let visible = rect.intersect(ui.clip_rect());
                        self.hits
                            .register(visible, HitTarget::Thumbnail(record.locator.clone()));
                        if !ui.is_rect_visible(rect) {
                            continue;
                        }
                        ui.painter()
                            .rect_filled(rect, 4.0, ui.visuals().faint_bg_color);
                        match self.textures.get(&record.locator, max_side) {
                            Lookup::Ready(tex) => {
                                egui::Image::new(tex)
                                    .paint_at(ui, fit_rect(rect, tex.size_vec2()));
                            }
                            Lookup::Loading => {
                                ui.put(rect.shrink(size / 3.0), egui::Spinner::new());
                            }
                            Lookup::Failed => {
                                ui.painter().text(
                                    rect.center(),
                                    egui::Align2::CENTER_CENTER,
                                    "?",
                                    egui::FontId::proportional(24.0),
                                    ui.visuals().warn_fg_color,
                                );
                            }
                        }
                        if interactive && response.clicked() {
                            opened = Some(record.locator.clone());
                        }
                    }
                });
            });
        });

        if let Some(locator) = opened {
            self.gallery.open_lightbox_at(&locator, Instant::now());
        }
    }

    fn lightbox_ui(&mut self, ctx: &egui::Context, interactive: bool) {
        let Some(record) = self.gallery.lightbox_record().cloned() else {
            return;
        };
        let screen = ctx.screen_rect();
        let mut action: Option<OverlayAction> = None;

        egui::Area::new(egui::Id::new("lightbox"))
            .order(egui::Order::Middle)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                ui.set_min_size(screen.size());
                ui.painter().rect_filled(screen, 0.0, DIM);
                self.hits.register(screen, HitTarget::Backdrop);

                let frame = screen.shrink(48.0);
                match self.textures.get(&record.locator, FULL_SIZE) {
                    Lookup::Ready(tex) => {
                        let rect = fit_rect(frame, tex.size_vec2());
                        egui::Image::new(tex).paint_at(ui, rect);
                        self.hits
                            .register(rect, HitTarget::FullView(record.locator.clone()));
                    }
                    Lookup::Loading => {
                        ui.put(
                            egui::Rect::from_center_size(frame.center(), egui::vec2(32.0, 32.0)),
                            egui::Spinner::new(),
                        );
                    }
                    Lookup::Failed => {
                        ui.painter().text(
                            frame.center(),
                            egui::Align2::CENTER_CENTER,
                            "Image unavailable",
                            egui::FontId::proportional(18.0),
                            egui::Color32::WHITE,
                        );
                    }
                }

                let button = egui::vec2(36.0, 36.0);
                let prev = egui::Rect::from_center_size(
                    egui::pos2(screen.left() + 24.0, screen.center().y),
                    button,
                );
                let next = egui::Rect::from_center_size(
                    egui::pos2(screen.right() - 24.0, screen.center().y),
                    button,
                );
                let close = egui::Rect::from_center_size(
                    egui::pos2(screen.right() - 24.0, screen.top() + 24.0),
                    button,
                );
                if ui.put(prev, egui::Button::new("<")).clicked() {
                    action = Some(OverlayAction::Previous);
                }
                if ui.put(next, egui::Button::new(">")).clicked() {
                    action = Some(OverlayAction::Next);
                }
                if ui.put(close, egui::Button::new("x")).clicked() {
                    action = Some(OverlayAction::Close);
                }
            });

        if !interactive {
            return;
        }
        match action {
            Some(OverlayAction::Previous) => self.gallery.show_previous(),
            Some(OverlayAction::Next) => self.gallery.show_next(),
            Some(OverlayAction::Close) => {
                self.gallery.close_lightbox();
            }
            None => {}
        }
    }

    fn menu_ui(&mut self, ctx: &egui::Context) {
        if !self.gallery.menu().is_open() {
            return;
        }
        let screen = ctx.screen_rect();
        ctx.layer_painter(egui::LayerId::new(egui::Order::Foreground, egui::Id::new("menu_dim")))
            .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(40));

        let Some(anchor) = self.gallery.menu_anchor(screen.width()) else {
            // hidden frame of a reposition
            return;
        };
        let entries = self.gallery.menu().state().entries();
        let width = self.gallery.menu().width();
        let mut picked: Option<MenuEntry> = None;

        let response = egui::Area::new(egui::Id::new("context_menu"))
            .order(egui::Order::Tooltip)
            .fixed_pos(egui::pos2(anchor.x, anchor.y))
            .show(ctx, |ui| {
                egui::Frame::menu(ui.style()).show(ui, |ui| {
                    ui.set_width(width);
                    for entry in entries {
                        let button = egui::Button::new(entry.label()).min_size(egui::vec2(width, 0.0));
                        if ui.add(button).clicked() {
                            picked = Some(*entry);
                        }
                    }
                });
            })
            .response;
        self.hits.register(response.rect, HitTarget::Menu);

        if let Some(entry) = picked {
            if let Some(action) = self.gallery.select(entry, Instant::now()) {
                self.worker.submit(StoreRequest::from(action));
            }
        }
    }
}

impl GalleryApp {
    /// One frame of the gallery window.
    pub fn ui(&mut self, ctx: &egui::Context) {
        if self.enable_toasts {
            self.toasts.show(ctx);
        }
        self.drain_store(ctx);
        self.handle_input(ctx);
        if self.gallery.begin_frame() {
            ctx.request_repaint();
        }

        // widgets below an open menu or overlay stay inert
        let blocked = self.gallery.menu().is_open() || self.swallow_primary;
        let lightbox_open = self.gallery.lightbox().is_some();
        self.hits.clear();
        self.grid_ui(ctx, !blocked && !lightbox_open);
        self.lightbox_ui(ctx, !blocked);
        self.menu_ui(ctx);

        if self.swallow_primary && !ctx.input(|i| i.pointer.primary_down()) {
            self.swallow_primary = false;
        }

        for (locator, max_side) in self.textures.take_requests() {
            self.worker.submit(StoreRequest::Load { locator, max_side });
        }
    }
}

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui(ctx);
    }
}
