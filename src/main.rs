use snapmag::gui::GalleryApp;
use snapmag::logging;
use snapmag::settings::{Settings, SETTINGS_FILE};
use snapmag::store::StoreAdapter;
use snapmag::watcher::WatchedStore;

use eframe::egui;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE).unwrap_or_else(|e| {
        eprintln!("invalid {SETTINGS_FILE}, using defaults: {e:#}");
        Settings::default()
    });
    logging::init(settings.debug_logging, settings.log_file());

    let adapter = match WatchedStore::open(&settings) {
        Ok(store) => StoreAdapter::new(Arc::new(store)),
        Err(e) => {
            tracing::error!("failed to open image store: {e:#}");
            StoreAdapter::unavailable()
        }
    };

    let (w, h) = settings.window_size.unwrap_or((960, 640));
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([w as f32, h as f32])
            .with_min_inner_size([320.0, 240.0])
            .with_title("Snapmag"),
        ..Default::default()
    };

    tracing::info!("starting gallery window");
    eframe::run_native(
        "Snapmag",
        native_options,
        Box::new(move |cc| Box::new(GalleryApp::new(&cc.egui_ctx, &settings, adapter))),
    )
    .map_err(|e| anyhow::anyhow!("gallery window failed: {e}"))
}
