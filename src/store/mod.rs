mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Filters for asset listings. Predicates compose with logical AND; an
/// absent filter leaves the corresponding clause out entirely.
#[derive(Debug, Clone)]
pub struct AssetFilter {
    /// Restrict to one repository.
    pub repo: Option<RepoKey>,
    /// Restrict to paths ending in `.<extension>`.
    pub extension: Option<String>,
    /// Restrict to paths containing this substring.
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for AssetFilter {
    fn default() -> Self {
        Self {
            repo: None,
            extension: None,
            search: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Repo operations
    /// Inserts or updates the repository identified by `(owner, name)` and
    /// returns its id. `default_branch` is last-write-wins, including when
    /// the new value is None. Atomic: concurrent calls for the same key
    /// resolve at the database, not in caller code.
    fn upsert_repo(&self, owner: &str, name: &str, default_branch: Option<&str>) -> Result<i64>;
    fn list_repos(&self) -> Result<Vec<Repo>>;

    // Asset operations
    fn insert_asset(&self, asset: &NewAsset) -> Result<i64>;
    fn list_assets(&self, filter: &AssetFilter) -> Result<Vec<Asset>>;
    fn get_asset(&self, id: i64) -> Result<Option<Asset>>;

    // Module operations
    fn insert_module(&self, module: &NewModule) -> Result<i64>;
    fn insert_module_file(&self, module_id: i64, file: &ModuleFile) -> Result<i64>;
    fn list_modules(&self, repo: Option<&RepoKey>) -> Result<Vec<Module>>;
    /// Files for a module in storage order. An unknown module id yields an
    /// empty list, not an error.
    fn list_module_files(&self, module_id: i64) -> Result<Vec<ModuleFile>>;

    // Batch boundaries used by ingestion. Statements issued between the two
    // calls commit atomically; an uncommitted batch rolls back when the
    // store is dropped.
    fn begin_batch(&self) -> Result<()>;
    fn commit_batch(&self) -> Result<()>;
}
