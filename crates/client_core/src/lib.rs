use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{ItemId, ListId, ListSummary, ToDoList},
    protocol::NewListResponse,
};
use tracing::{error, info, warn};

pub mod config;
pub mod error;
pub mod transport;

pub use config::ClientConfig;
pub use transport::HttpListsApi;

/// Remote collaborator for the to-do lists REST API.
#[async_trait]
pub trait ListsApi: Send + Sync {
    async fn list_summaries(&self) -> Result<Vec<ListSummary>>;
    async fn create_list(&self, name: &str) -> Result<NewListResponse>;
    async fn delete_list(&self, list_id: &ListId) -> Result<bool>;
    async fn get_list(&self, list_id: &ListId) -> Result<ToDoList>;
    async fn create_item(&self, list_id: &ListId, label: &str) -> Result<ToDoList>;
    async fn delete_item(&self, list_id: &ListId, item_id: &ItemId) -> Result<ToDoList>;
    async fn set_checked_state(
        &self,
        list_id: &ListId,
        item_id: &ItemId,
        checked: bool,
    ) -> Result<ToDoList>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView<'a> {
    /// No fetch has completed yet.
    Loading,
    Overview(&'a [ListSummary]),
    Detail {
        list_id: &'a ListId,
        list: Option<&'a ToDoList>,
    },
}

/// Owned copy of [`AppView`] for handing to another thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppSnapshot {
    Loading,
    Overview(Vec<ListSummary>),
    Detail {
        list_id: ListId,
        list: Option<ToDoList>,
    },
}

impl From<AppView<'_>> for AppSnapshot {
    fn from(view: AppView<'_>) -> Self {
        match view {
            AppView::Loading => AppSnapshot::Loading,
            AppView::Overview(summaries) => AppSnapshot::Overview(summaries.to_vec()),
            AppView::Detail { list_id, list } => AppSnapshot::Detail {
                list_id: list_id.clone(),
                list: list.cloned(),
            },
        }
    }
}

/// View state of the to-do lists front-end.
///
/// Every operation issues at most one request plus at most one refetch and
/// never surfaces an error: failures are logged and the state falls back as
/// documented per operation.
pub struct TodoApp {
    api: Arc<dyn ListsApi>,
    list_summaries: Option<Vec<ListSummary>>,
    selected: Option<ListId>,
    detail: Option<ToDoList>,
}

impl TodoApp {
    pub fn new(api: Arc<dyn ListsApi>) -> Self {
        Self {
            api,
            list_summaries: None,
            selected: None,
            detail: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(Arc::new(HttpListsApi::from_config(config)))
    }

    pub fn list_summaries(&self) -> Option<&[ListSummary]> {
        self.list_summaries.as_deref()
    }

    pub fn selected(&self) -> Option<&ListId> {
        self.selected.as_ref()
    }

    pub fn detail(&self) -> Option<&ToDoList> {
        self.detail.as_ref()
    }

    pub fn view(&self) -> AppView<'_> {
        if let Some(list_id) = &self.selected {
            return AppView::Detail {
                list_id,
                list: self.detail.as_ref(),
            };
        }
        match &self.list_summaries {
            None => AppView::Loading,
            Some(summaries) => AppView::Overview(summaries),
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        self.view().into()
    }

    /// Refetches the summaries; an empty list replaces them on failure.
    pub async fn reload_data(&mut self) {
        info!("loading todo list summaries");
        match self.api.list_summaries().await {
            Ok(summaries) => {
                info!(count = summaries.len(), "todo list summaries received");
                self.list_summaries = Some(summaries);
            }
            Err(err) => {
                error!(
                    error = %format!("{err:#}"),
                    status = ?error::http_status(&err),
                    "failed to load todo list summaries"
                );
                self.list_summaries = Some(Vec::new());
            }
        }
    }

    pub async fn create_list(&mut self, name: &str) {
        match self.api.create_list(name).await {
            Ok(created) => {
                info!(list_id = %created.id, "todo list created");
                self.reload_data().await;
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), name, "failed to create todo list");
            }
        }
    }

    pub async fn delete_list(&mut self, list_id: &ListId) {
        match self.api.delete_list(list_id).await {
            Ok(deleted) => {
                info!(%list_id, deleted, "todo list delete acknowledged");
                self.reload_data().await;
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), %list_id, "failed to delete todo list");
            }
        }
    }

    pub fn select_list(&mut self, list_id: ListId) {
        info!(%list_id, "selecting todo list");
        if self.selected.as_ref() != Some(&list_id) {
            self.detail = None;
        }
        self.selected = Some(list_id);
    }

    pub async fn back_to_list(&mut self) {
        self.selected = None;
        self.detail = None;
        self.reload_data().await;
    }

    /// Fetches the selected list; clears the detail on failure.
    pub async fn load_selected(&mut self) {
        let Some(list_id) = self.selected.clone() else {
            warn!("load requested with no todo list selected");
            return;
        };
        match self.api.get_list(&list_id).await {
            Ok(list) => self.accept_detail(&list_id, list),
            Err(err) => {
                error!(error = %format!("{err:#}"), %list_id, "failed to load todo list");
                self.detail = None;
            }
        }
    }

    pub async fn add_item(&mut self, label: &str) {
        let Some(list_id) = self.selected.clone() else {
            warn!("add item requested with no todo list selected");
            return;
        };
        let result = self.api.create_item(&list_id, label).await;
        self.apply_detail_update(&list_id, result, "failed to add item");
    }

    pub async fn delete_item(&mut self, item_id: &ItemId) {
        let Some(list_id) = self.selected.clone() else {
            warn!(%item_id, "delete item requested with no todo list selected");
            return;
        };
        let result = self.api.delete_item(&list_id, item_id).await;
        self.apply_detail_update(&list_id, result, "failed to delete item");
    }

    pub async fn set_checked(&mut self, item_id: &ItemId, checked: bool) {
        let Some(list_id) = self.selected.clone() else {
            warn!(%item_id, "checked state change requested with no todo list selected");
            return;
        };
        let result = self.api.set_checked_state(&list_id, item_id, checked).await;
        self.apply_detail_update(&list_id, result, "failed to update checked state");
    }

    fn apply_detail_update(&mut self, list_id: &ListId, result: Result<ToDoList>, what: &str) {
        match result {
            Ok(list) => self.accept_detail(list_id, list),
            Err(err) => error!(error = %format!("{err:#}"), %list_id, "{what}"),
        }
    }

    /// Responses for a list that is no longer selected are dropped.
    fn accept_detail(&mut self, list_id: &ListId, list: ToDoList) {
        if self.selected.as_ref() == Some(list_id) {
            self.detail = Some(list);
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
