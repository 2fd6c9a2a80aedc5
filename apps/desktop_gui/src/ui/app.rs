use std::time::Duration;

use client_core::AppSnapshot;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::domain::{ListId, ListSummary, ToDoList};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{events::UiEvent, orchestration::dispatch_backend_command};

pub const SETTINGS_STORAGE_KEY: &str = "todo_desktop_settings";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedDesktopSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

pub struct StartupConfig {
    pub api_url: String,
    /// Server remembered from the last session, used when no URL was given explicitly.
    pub reconnect_to: Option<String>,
}

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    view: AppSnapshot,
    api_url_input: String,
    new_list_name: String,
    new_item_label: String,

    status: String,
    /// Commands queued but not yet answered by a view update.
    in_flight: usize,
}

impl DesktopGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            view: AppSnapshot::Loading,
            api_url_input: startup.api_url,
            new_list_name: String::new(),
            new_item_label: String::new(),
            status: "Starting...".to_string(),
            in_flight: 1,
        };
        if let Some(api_url) = startup.reconnect_to {
            app.api_url_input = api_url.clone();
            app.dispatch(BackendCommand::Connect { api_url });
        }
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        if dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            self.in_flight += 1;
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::ViewChanged(view) => {
                    self.view = view;
                    self.in_flight = self.in_flight.saturating_sub(1);
                }
                UiEvent::Error(err) => {
                    tracing::warn!(context = ?err.context(), "{}", err.message());
                    self.status = err.status_line();
                    self.in_flight = self.in_flight.saturating_sub(1);
                }
            }
        }
    }

    fn show_server_bar(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();
        egui::TopBottomPanel::top("server_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Server");
                let response = ui.text_edit_singleline(&mut self.api_url_input);
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Connect").clicked() || submitted {
                    actions.push(BackendCommand::Connect {
                        api_url: self.api_url_input.trim().to_string(),
                    });
                }
                if matches!(self.view, AppSnapshot::Overview(_)) && ui.button("Refresh").clicked()
                {
                    actions.push(BackendCommand::Reload);
                }
            });
        });
        for cmd in actions {
            self.dispatch(cmd);
        }
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.in_flight > 0 {
                    ui.spinner();
                }
                ui.weak(self.status.as_str());
            });
        });
    }

    fn show_central(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| match &self.view {
            AppSnapshot::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading...");
                });
            }
            AppSnapshot::Overview(summaries) => {
                overview_ui(ui, summaries, &mut self.new_list_name, &mut actions);
            }
            AppSnapshot::Detail { list_id, list } => {
                detail_ui(
                    ui,
                    list_id,
                    list.as_ref(),
                    &mut self.new_item_label,
                    &mut actions,
                );
            }
        });
        for cmd in actions {
            self.dispatch(cmd);
        }
    }
}

fn overview_ui(
    ui: &mut egui::Ui,
    summaries: &[ListSummary],
    new_list_name: &mut String,
    actions: &mut Vec<BackendCommand>,
) {
    ui.heading("All To-Do Lists");
    ui.add_space(6.0);

    egui::ScrollArea::vertical()
        .auto_shrink([false, true])
        .show(ui, |ui| {
            if summaries.is_empty() {
                ui.weak("There are no to-do lists yet.");
            }
            for summary in summaries {
                ui.horizontal(|ui| {
                    if ui.link(summary.name.as_str()).clicked() {
                        actions.push(BackendCommand::OpenList {
                            list_id: summary.id.clone(),
                        });
                    }
                    ui.weak(format!("{} items", summary.item_count));
                    if ui.button("Delete").clicked() {
                        actions.push(BackendCommand::DeleteList {
                            list_id: summary.id.clone(),
                        });
                    }
                });
            }
        });

    ui.separator();
    ui.horizontal(|ui| {
        ui.label("New To-Do List:");
        let response = ui.text_edit_singleline(new_list_name);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Create").clicked() || submitted {
            if let Some(name) = take_submission(new_list_name) {
                actions.push(BackendCommand::CreateList { name });
            }
        }
    });
}

fn detail_ui(
    ui: &mut egui::Ui,
    list_id: &ListId,
    list: Option<&ToDoList>,
    new_item_label: &mut String,
    actions: &mut Vec<BackendCommand>,
) {
    if ui.button("Back").clicked() {
        actions.push(BackendCommand::BackToList);
    }

    let Some(list) = list else {
        ui.horizontal(|ui| {
            ui.label(format!("To-do list {list_id} is not loaded."));
            if ui.button("Retry").clicked() {
                actions.push(BackendCommand::OpenList {
                    list_id: list_id.clone(),
                });
            }
        });
        return;
    };

    ui.heading(list.name.as_str());
    ui.add_space(6.0);

    egui::ScrollArea::vertical()
        .auto_shrink([false, true])
        .show(ui, |ui| {
            if list.items.is_empty() {
                ui.weak("Nothing to do.");
            }
            for item in &list.items {
                ui.horizontal(|ui| {
                    let mut checked = item.checked;
                    let text = if item.checked {
                        egui::RichText::new(item.label.as_str()).strikethrough()
                    } else {
                        egui::RichText::new(item.label.as_str())
                    };
                    if ui.checkbox(&mut checked, text).changed() {
                        actions.push(BackendCommand::SetChecked {
                            item_id: item.id.clone(),
                            checked,
                        });
                    }
                    if ui.button("Delete").clicked() {
                        actions.push(BackendCommand::DeleteItem {
                            item_id: item.id.clone(),
                        });
                    }
                });
            }
        });

    ui.separator();
    ui.horizontal(|ui| {
        ui.label("New item:");
        let response = ui.text_edit_singleline(new_item_label);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Add").clicked() || submitted {
            if let Some(label) = take_submission(new_item_label) {
                actions.push(BackendCommand::AddItem { label });
            }
        }
    });
}

/// Takes the trimmed input and clears the field; blank input is left alone.
fn take_submission(input: &mut String) -> Option<String> {
    let value = input.trim();
    if value.is_empty() {
        return None;
    }
    let value = value.to_string();
    input.clear();
    Some(value)
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_server_bar(ctx);
        self.show_status_bar(ctx);
        self.show_central(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedDesktopSettings {
            api_url: Some(self.api_url_input.trim().to_string()).filter(|url| !url.is_empty()),
        };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}
