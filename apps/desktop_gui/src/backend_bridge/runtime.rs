//! Backend worker: owns the tokio runtime and the `TodoApp`, runs one command at a time.

use std::thread;

use client_core::{ClientConfig, TodoApp};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub struct Worker {
    app: TodoApp,
}

impl Worker {
    pub fn new(app: TodoApp) -> Self {
        Self { app }
    }

    /// Runs one command to completion and returns the events for the UI.
    pub async fn handle(&mut self, cmd: BackendCommand) -> Vec<UiEvent> {
        let mut events = Vec::new();
        match cmd {
            BackendCommand::Connect { api_url } => {
                match ClientConfig::resolve_from(Some(&api_url), None) {
                    Ok(config) => {
                        self.app = TodoApp::from_config(&config);
                        self.app.reload_data().await;
                        events.push(UiEvent::Info(format!("Using {}", config.api_url)));
                    }
                    Err(err) => {
                        events.push(UiEvent::Error(UiError::from_message(
                            UiErrorContext::Connect,
                            format!("{err:#}"),
                        )));
                        return events;
                    }
                }
            }
            BackendCommand::Reload => self.app.reload_data().await,
            BackendCommand::CreateList { name } => self.app.create_list(&name).await,
            BackendCommand::DeleteList { list_id } => self.app.delete_list(&list_id).await,
            BackendCommand::OpenList { list_id } => {
                self.app.select_list(list_id);
                self.app.load_selected().await;
            }
            BackendCommand::BackToList => self.app.back_to_list().await,
            BackendCommand::AddItem { label } => self.app.add_item(&label).await,
            BackendCommand::DeleteItem { item_id } => self.app.delete_item(&item_id).await,
            BackendCommand::SetChecked { item_id, checked } => {
                self.app.set_checked(&item_id, checked).await
            }
        }
        events.push(UiEvent::ViewChanged(self.app.snapshot()));
        events
    }
}

pub fn launch(config: ClientConfig, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let mut worker = Worker::new(TodoApp::from_config(&config));
            let _ = ui_tx.try_send(UiEvent::Info(format!("Using {}", config.api_url)));

            // Initial fetch, like any freshly mounted overview.
            for event in worker.handle(BackendCommand::Reload).await {
                if ui_tx.send(event).is_err() {
                    return;
                }
            }

            while let Ok(cmd) = cmd_rx.recv() {
                let name = cmd.name();
                tracing::debug!(command = name, "backend worker running command");
                for event in worker.handle(cmd).await {
                    if ui_tx.send(event).is_err() {
                        tracing::info!("ui event channel closed; backend worker exiting");
                        return;
                    }
                }
            }
            tracing::info!("ui command channel closed; backend worker exiting");
        });
    });
}
