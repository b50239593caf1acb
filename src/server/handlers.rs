use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::{ListAssetsParams, ListModulesParams, StoreParams};
use crate::server::response::{ApiError, StoreOptionExt};
use crate::store::{AssetFilter, DEFAULT_PAGE_SIZE, SqliteStore, Store};
use crate::types::RepoKey;

/// Opens one store handle for this request, honoring the `db` override.
/// The handle drops with the response; nothing is shared across requests.
fn open_store(state: &AppState, db: Option<&str>) -> Result<SqliteStore, ApiError> {
    let path = db.map(PathBuf::from).unwrap_or_else(|| state.db_path.clone());
    Ok(SqliteStore::open_existing(path)?)
}

pub async fn list_repos(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StoreParams>,
) -> Result<impl IntoResponse, ApiError> {
    let store = open_store(&state, params.db.as_deref())?;
    let repos = store.list_repos()?;
    Ok(Json(repos))
}

pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListAssetsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let store = open_store(&state, params.db.as_deref())?;

    let filter = AssetFilter {
        repo: params.repo.as_deref().map(RepoKey::parse),
        extension: params.ext,
        search: params.q,
        limit: params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        offset: params.offset.unwrap_or(0),
    };

    let assets = store.list_assets(&filter)?;
    Ok(Json(assets))
}

pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<StoreParams>,
) -> Result<impl IntoResponse, ApiError> {
    let store = open_store(&state, params.db.as_deref())?;

    let asset = store.get_asset(id)?.or_not_found("asset not found")?;
    Ok(Json(asset))
}

pub async fn list_modules(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListModulesParams>,
) -> Result<impl IntoResponse, ApiError> {
    let store = open_store(&state, params.db.as_deref())?;

    let repo = params.repo.as_deref().map(RepoKey::parse);
    let modules = store.list_modules(repo.as_ref())?;
    Ok(Json(modules))
}

pub async fn list_module_files(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<StoreParams>,
) -> Result<impl IntoResponse, ApiError> {
    let store = open_store(&state, params.db.as_deref())?;

    let files = store.list_module_files(id)?;
    Ok(Json(files))
}
