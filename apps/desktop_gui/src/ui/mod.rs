//! UI layer for the desktop GUI: the eframe app shell and its views.

pub mod app;

pub use app::{DesktopGuiApp, PersistedDesktopSettings, StartupConfig, SETTINGS_STORAGE_KEY};
