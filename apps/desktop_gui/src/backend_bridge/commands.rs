//! Backend commands queued from UI to backend worker.

use shared::domain::{ItemId, ListId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    /// Point the worker at another API server and reload.
    Connect {
        api_url: String,
    },
    Reload,
    CreateList {
        name: String,
    },
    DeleteList {
        list_id: ListId,
    },
    OpenList {
        list_id: ListId,
    },
    BackToList,
    AddItem {
        label: String,
    },
    DeleteItem {
        item_id: ItemId,
    },
    SetChecked {
        item_id: ItemId,
        checked: bool,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Connect { .. } => "connect",
            BackendCommand::Reload => "reload",
            BackendCommand::CreateList { .. } => "create_list",
            BackendCommand::DeleteList { .. } => "delete_list",
            BackendCommand::OpenList { .. } => "open_list",
            BackendCommand::BackToList => "back_to_list",
            BackendCommand::AddItem { .. } => "add_item",
            BackendCommand::DeleteItem { .. } => "delete_item",
            BackendCommand::SetChecked { .. } => "set_checked",
        }
    }
}
