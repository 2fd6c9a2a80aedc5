use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ItemId, ListId, ListSummary, ToDoList},
    error::ApiError,
    protocol::{
        checked_state_path, item_path, items_path, list_path, lists_path, NewItem, NewList,
        NewListResponse, ToDoItemUpdate,
    },
};
use tracing::debug;
use url::Url;

use crate::{config::ClientConfig, error::TransportError, ListsApi};

/// `ListsApi` over HTTP with JSON bodies.
pub struct HttpListsApi {
    http: Client,
    base_url: Url,
}

impl HttpListsApi {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base path; each one is percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::Endpoint {
                base_url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn json_headers(request: RequestBuilder) -> RequestBuilder {
        // Bodies get their content type from `RequestBuilder::json`.
        request.header(header::ACCEPT, "application/json")
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = Self::json_headers(request)
            .send()
            .await
            .with_context(|| format!("{what}: request failed"))?;
        decode(response)
            .await
            .with_context(|| format!("{what}: unexpected response"))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let api_error = serde_json::from_str::<ApiError>(&body).ok();
        let message = api_error
            .as_ref()
            .map(|err| err.message.clone())
            .unwrap_or(body);
        return Err(TransportError::Status {
            status: status.as_u16(),
            message,
            api_error,
        }
        .into());
    }
    let body = response.json::<T>().await?;
    Ok(body)
}

#[async_trait]
impl ListsApi for HttpListsApi {
    async fn list_summaries(&self) -> Result<Vec<ListSummary>> {
        let url = self.endpoint(&lists_path())?;
        debug!(%url, "GET list summaries");
        self.send(self.http.get(url), "list summaries").await
    }

    async fn create_list(&self, name: &str) -> Result<NewListResponse> {
        let url = self.endpoint(&lists_path())?;
        debug!(%url, "POST new list");
        let body = NewList {
            name: name.to_string(),
        };
        self.send(self.http.post(url).json(&body), "create list")
            .await
    }

    async fn delete_list(&self, list_id: &ListId) -> Result<bool> {
        let url = self.endpoint(&list_path(list_id))?;
        debug!(%url, "DELETE list");
        self.send(self.http.delete(url), "delete list").await
    }

    async fn get_list(&self, list_id: &ListId) -> Result<ToDoList> {
        let url = self.endpoint(&list_path(list_id))?;
        debug!(%url, "GET list");
        self.send(self.http.get(url), "load list").await
    }

    async fn create_item(&self, list_id: &ListId, label: &str) -> Result<ToDoList> {
        let url = self.endpoint(&items_path(list_id))?;
        debug!(%url, "POST new item");
        let body = NewItem {
            label: label.to_string(),
        };
        self.send(self.http.post(url).json(&body), "create item")
            .await
    }

    async fn delete_item(&self, list_id: &ListId, item_id: &ItemId) -> Result<ToDoList> {
        let url = self.endpoint(&item_path(list_id, item_id))?;
        debug!(%url, "DELETE item");
        self.send(self.http.delete(url), "delete item").await
    }

    async fn set_checked_state(
        &self,
        list_id: &ListId,
        item_id: &ItemId,
        checked: bool,
    ) -> Result<ToDoList> {
        let url = self.endpoint(&checked_state_path(list_id))?;
        debug!(%url, checked, "PATCH checked state");
        let body = ToDoItemUpdate {
            item_id: item_id.clone(),
            checked_state: checked,
        };
        self.send(self.http.patch(url).json(&body), "set checked state")
            .await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
