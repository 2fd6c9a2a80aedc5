use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use shared::{
    domain::{ItemId, ListId, ListSummary, ToDoList},
    error::ApiError,
    protocol::{DummyResponse, NewItem, NewList, NewListResponse, ToDoItemUpdate},
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::ApiContext;
use app_state::AppState;
use config::{load_settings, prepare_database_url};

const MAX_BODY_BYTES: usize = 64 * 1024;

type ApiFailure = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    let default_level = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    storage.health_check().await?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, debug = settings.debug, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/lists", get(http_list_summaries).post(http_create_list))
        .route(
            "/api/lists/:list_id",
            get(http_get_list).delete(http_delete_list),
        )
        .route("/api/lists/:list_id/items/", post(http_create_item))
        .route("/api/lists/:list_id/items", post(http_create_item))
        .route(
            "/api/lists/:list_id/items/:item_id",
            delete(http_delete_item),
        )
        .route(
            "/api/lists/:list_id/checked_state",
            patch(http_set_checked_state),
        )
        .route("/api/dummy", get(http_dummy))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

fn failure(err: ApiError) -> ApiFailure {
    let status = StatusCode::from_u16(err.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err))
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, ApiFailure> {
    api::health(&state.api).await.map_err(failure)?;
    Ok("ok")
}

async fn http_list_summaries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ListSummary>>, ApiFailure> {
    let summaries = api::list_summaries(&state.api).await.map_err(failure)?;
    Ok(Json(summaries))
}

async fn http_create_list(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewList>,
) -> Result<(StatusCode, Json<NewListResponse>), ApiFailure> {
    let created = api::create_list(&state.api, &req.name)
        .await
        .map_err(failure)?;
    info!(list_id = %created.id, "todo list created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn http_get_list(
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<String>,
) -> Result<Json<ToDoList>, ApiFailure> {
    let list = api::get_list(&state.api, &ListId(list_id))
        .await
        .map_err(failure)?;
    Ok(Json(list))
}

async fn http_delete_list(
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<String>,
) -> Result<Json<bool>, ApiFailure> {
    let list_id = ListId(list_id);
    let deleted = api::delete_list(&state.api, &list_id)
        .await
        .map_err(failure)?;
    info!(%list_id, deleted, "todo list delete requested");
    Ok(Json(deleted))
}

async fn http_create_item(
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<String>,
    Json(req): Json<NewItem>,
) -> Result<(StatusCode, Json<ToDoList>), ApiFailure> {
    let list = api::create_item(&state.api, &ListId(list_id), &req.label)
        .await
        .map_err(failure)?;
    Ok((StatusCode::CREATED, Json(list)))
}

async fn http_delete_item(
    State(state): State<Arc<AppState>>,
    Path((list_id, item_id)): Path<(String, String)>,
) -> Result<Json<ToDoList>, ApiFailure> {
    let list = api::delete_item(&state.api, &ListId(list_id), &ItemId(item_id))
        .await
        .map_err(failure)?;
    Ok(Json(list))
}

async fn http_set_checked_state(
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<String>,
    Json(update): Json<ToDoItemUpdate>,
) -> Result<Json<ToDoList>, ApiFailure> {
    let list = api::set_checked_state(&state.api, &ListId(list_id), &update)
        .await
        .map_err(failure)?;
    Ok(Json(list))
}

async fn http_dummy() -> Json<DummyResponse> {
    Json(api::dummy())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
