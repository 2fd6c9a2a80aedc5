mod backend_bridge;
mod controller;
mod ui;

use anyhow::Result;
use clap::Parser;
use client_core::{
    config::{url_setting, API_URL_ENV},
    ClientConfig,
};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use backend_bridge::{commands::BackendCommand, runtime};
use controller::events::UiEvent;
use ui::{DesktopGuiApp, PersistedDesktopSettings, StartupConfig, SETTINGS_STORAGE_KEY};

#[derive(Parser, Debug)]
#[command(name = "todo-gui", about = "Desktop client for a to-do lists API server")]
struct Args {
    /// Base URL of the lists API; overrides TODO_API_URL and the last used server.
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let config = ClientConfig::resolve(args.api_url.as_deref())?;
    let env_url = std::env::var(API_URL_ENV).ok();
    let explicit_url = names_explicit_url(args.api_url.as_deref(), env_url.as_deref());
    tracing::info!(api_url = %config.api_url, explicit_url, "starting desktop gui");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let api_url = config.api_url.to_string();
    runtime::launch(config, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("To-Do Lists")
            .with_inner_size([720.0, 560.0])
            .with_min_inner_size([420.0, 320.0]),
        ..Default::default()
    };
    eframe::run_native(
        "To-Do Lists",
        options,
        Box::new(move |cc| {
            let persisted_settings = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedDesktopSettings>(&text).ok())
            });
            Ok(Box::new(DesktopGuiApp::new(
                cmd_tx,
                ui_rx,
                startup_config(api_url, explicit_url, persisted_settings),
            )))
        }),
    )
    .map_err(|err| anyhow::anyhow!("desktop window failed: {err}"))
}

/// Blank values are ignored here exactly as `ClientConfig` ignores them.
fn names_explicit_url(flag: Option<&str>, env_value: Option<&str>) -> bool {
    url_setting(flag).is_some() || url_setting(env_value).is_some()
}

/// The remembered server only wins when neither the flag nor the environment named one.
fn startup_config(
    api_url: String,
    explicit_url: bool,
    persisted: Option<PersistedDesktopSettings>,
) -> StartupConfig {
    let reconnect_to = if explicit_url {
        None
    } else {
        persisted
            .and_then(|settings| settings.api_url)
            .filter(|remembered| remembered != &api_url)
    };
    StartupConfig {
        api_url,
        reconnect_to,
    }
}
