use chrono::Utc;
use shared::{
    domain::{ItemId, ListId, ListSummary, ToDoList},
    error::{ApiError, ErrorCode},
    protocol::{validate_text, DummyResponse, NewListResponse, ToDoItemUpdate},
};
use storage::Storage;
use tracing::error;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

/// Storage ping behind `/healthz`.
pub async fn health(ctx: &ApiContext) -> Result<(), ApiError> {
    ctx.storage.health_check().await.map_err(|err| {
        error!(error = %format!("{err:#}"), "health check failed");
        ApiError::new(ErrorCode::Unavailable, "storage unavailable")
    })
}

pub async fn list_summaries(ctx: &ApiContext) -> Result<Vec<ListSummary>, ApiError> {
    ctx.storage.list_summaries().await.map_err(internal)
}

pub async fn create_list(ctx: &ApiContext, name: &str) -> Result<NewListResponse, ApiError> {
    let name = validate_text("name", name)?;
    let id = ctx.storage.create_list(name).await.map_err(internal)?;
    Ok(NewListResponse {
        id,
        name: name.to_string(),
    })
}

pub async fn get_list(ctx: &ApiContext, list_id: &ListId) -> Result<ToDoList, ApiError> {
    ctx.storage
        .get_list(list_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| list_not_found(list_id))
}

pub async fn delete_list(ctx: &ApiContext, list_id: &ListId) -> Result<bool, ApiError> {
    ctx.storage.delete_list(list_id).await.map_err(internal)
}

pub async fn create_item(
    ctx: &ApiContext,
    list_id: &ListId,
    label: &str,
) -> Result<ToDoList, ApiError> {
    let label = validate_text("label", label)?;
    ctx.storage
        .create_item(list_id, label)
        .await
        .map_err(internal)?
        .ok_or_else(|| list_not_found(list_id))
}

pub async fn delete_item(
    ctx: &ApiContext,
    list_id: &ListId,
    item_id: &ItemId,
) -> Result<ToDoList, ApiError> {
    ctx.storage
        .delete_item(list_id, item_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| list_not_found(list_id))
}

pub async fn set_checked_state(
    ctx: &ApiContext,
    list_id: &ListId,
    update: &ToDoItemUpdate,
) -> Result<ToDoList, ApiError> {
    ctx.storage
        .set_checked_state(list_id, &update.item_id, update.checked_state)
        .await
        .map_err(internal)?
        .ok_or_else(|| list_not_found(list_id))
}

pub fn dummy() -> DummyResponse {
    DummyResponse {
        id: ListId::generate().0,
        when: Utc::now(),
    }
}

fn list_not_found(list_id: &ListId) -> ApiError {
    ApiError::not_found(format!("todo list {list_id} not found"))
}

fn internal(err: anyhow::Error) -> ApiError {
    error!(error = %format!("{err:#}"), "storage operation failed");
    ApiError::new(ErrorCode::Internal, "internal storage error")
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
