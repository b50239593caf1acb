use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository identity as it appears in catalog documents and query
/// filters: an `owner/name` string split on the first slash. A bare name
/// with no slash resolves to an empty owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoKey {
    pub owner: String,
    pub name: String,
}

impl RepoKey {
    pub fn parse(owner_repo: &str) -> Self {
        match owner_repo.split_once('/') {
            Some((owner, name)) => Self {
                owner: owner.to_string(),
                name: name.to_string(),
            },
            None => Self {
                owner: String::new(),
                name: owner_repo.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repo {
    pub id: i64,
    pub owner: String,
    pub name: String,
    pub default_branch: Option<String>,
}

/// One harvested file, joined with its owning repository for API output.
/// `metadata` is only populated by single-asset lookups; listings leave it
/// out of the row entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    /// Owning repository rendered as `owner/name`.
    pub repo: String,
    pub path: String,
    pub rel_path: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub sha: Option<String>,
    #[serde(rename = "ref")]
    pub source_ref: Option<String>,
    pub url: Option<String>,
    pub stored_path: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

/// A published bundle of files tied to a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: i64,
    /// Owning repository rendered as `owner/name`.
    pub repo: String,
    pub module_name: String,
    pub gist_id: Option<String>,
    pub gist_url: Option<String>,
    pub visibility: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleFile {
    pub filename: String,
    pub raw_url: String,
}

/// Asset fields supplied by ingestion. `created_at` is assigned by the
/// store; `metadata` is already serialized to its stored text form.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub repo_id: i64,
    pub path: String,
    pub rel_path: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub sha: Option<String>,
    pub source_ref: Option<String>,
    pub url: Option<String>,
    pub stored_path: Option<String>,
    pub metadata: Option<String>,
}

/// Module fields supplied by ingestion; files are inserted separately.
#[derive(Debug, Clone)]
pub struct NewModule {
    pub repo_id: i64,
    pub module_name: String,
    pub gist_id: Option<String>,
    pub gist_url: Option<String>,
    pub visibility: Option<String>,
    pub description: Option<String>,
}
