pub mod gallery;
pub mod gui;
pub mod logging;
pub mod settings;
pub mod store;
pub mod watcher;
