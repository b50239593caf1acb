use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use super::document::{AssetDescriptor, ModuleDescriptor};
use crate::error::{Error, Result};
use crate::store::{SqliteStore, Store};
use crate::types::{ModuleFile, NewAsset, NewModule, RepoKey};

#[derive(Debug, Default)]
pub struct IngestSummary {
    pub repos: usize,
    pub assets: usize,
    pub modules: usize,
    pub module_files: usize,
}

/// Ingests an asset catalog (and optionally a modules catalog) into the
/// store at `db_path`, creating it if needed. The whole run commits as one
/// batch: a failure anywhere rolls everything back, so no module row can
/// outlive its files' parse and no half-applied catalog survives.
pub fn ingest(
    catalog_path: &Path,
    modules_path: Option<&Path>,
    db_path: &Path,
) -> Result<IngestSummary> {
    let records: Vec<AssetDescriptor> = read_catalog(catalog_path)?;

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let store = SqliteStore::new(db_path)?;
    store.initialize()?;

    // Repo ids resolved during this run, shared across both passes. The
    // cache must not outlive the run; identities are store-specific.
    let mut repo_ids: HashMap<RepoKey, i64> = HashMap::new();
    let mut summary = IngestSummary::default();

    store.begin_batch()?;

    for record in &records {
        let repo_id = resolve_repo(
            &store,
            &mut repo_ids,
            &record.owner_repo,
            record.branch.as_deref(),
        )?;
        store.insert_asset(&NewAsset {
            repo_id,
            path: record.path.clone(),
            rel_path: record.rel_path.clone(),
            content_type: record.content_type.clone(),
            size: record.size_bytes(),
            sha: record.sha.clone(),
            source_ref: record.branch.clone(),
            url: record.url.clone(),
            stored_path: Some(record.rel_path.clone()),
            metadata: record.metadata_text(),
        })?;
        summary.assets += 1;
    }

    if let Some(path) = modules_path {
        if path.exists() {
            let modules: Vec<ModuleDescriptor> = read_catalog(path)?;
            for module in &modules {
                let repo_id = resolve_repo(
                    &store,
                    &mut repo_ids,
                    &module.owner_repo,
                    module.branch.as_deref(),
                )?;
                let module_id = store.insert_module(&NewModule {
                    repo_id,
                    module_name: module.module_name.clone(),
                    gist_id: module.gist_id.clone(),
                    gist_url: module.gist_url.clone(),
                    visibility: module.visibility.clone(),
                    description: module.description.clone(),
                })?;
                for file in &module.files {
                    store.insert_module_file(
                        module_id,
                        &ModuleFile {
                            filename: file.filename.clone(),
                            raw_url: file.raw_url.clone(),
                        },
                    )?;
                    summary.module_files += 1;
                }
                summary.modules += 1;
            }
        } else {
            tracing::warn!("modules catalog {} not found, skipping", path.display());
        }
    }

    store.commit_batch()?;
    summary.repos = repo_ids.len();

    Ok(summary)
}

fn read_catalog<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text = fs::read_to_string(path).map_err(|source| Error::CatalogRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| Error::CatalogParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves `owner/name` to a repo id, upserting on first sight in this
/// run. Later records for the same key reuse the cached id, so the branch
/// written as `default_branch` is the first one seen this run.
fn resolve_repo(
    store: &SqliteStore,
    cache: &mut HashMap<RepoKey, i64>,
    owner_repo: &str,
    branch: Option<&str>,
) -> Result<i64> {
    let key = RepoKey::parse(owner_repo);
    if let Some(id) = cache.get(&key) {
        return Ok(*id);
    }
    let id = store.upsert_repo(&key.owner, &key.name, branch)?;
    cache.insert(key, id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AssetFilter;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_json(dir: &TempDir, name: &str, value: serde_json::Value) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
        path
    }

    fn sample_catalog() -> serde_json::Value {
        json!([
            {
                "ownerRepo": "acme/widgets",
                "path": "src/a.py",
                "rel_path": "a.py",
                "content_type": "text/x-python",
                "size": 120,
                "sha": "abc123",
                "branch": "main",
                "url": "https://example.com/acme/widgets/a.py"
            },
            {
                "ownerRepo": "acme/widgets",
                "path": "src/b.py",
                "rel_path": "b.py",
                "size": "64",
                "branch": "main"
            },
            {
                "ownerRepo": "standalone",
                "path": "tool.sh",
                "rel_path": "tool.sh",
                "metadata": {"tags": ["shell"]}
            }
        ])
    }

    #[test]
    fn test_ingest_populates_store() {
        let temp = TempDir::new().unwrap();
        let catalog = write_json(&temp, "files.json", sample_catalog());
        let db = temp.path().join("out/catalog.db");

        let summary = ingest(&catalog, None, &db).unwrap();
        assert_eq!(summary.repos, 2);
        assert_eq!(summary.assets, 3);
        assert_eq!(summary.modules, 0);

        let store = SqliteStore::open_existing(&db).unwrap();
        let repos = store.list_repos().unwrap();
        assert_eq!(repos.len(), 2);

        // Bare name lands with an empty owner
        assert_eq!(repos[0].owner, "");
        assert_eq!(repos[0].name, "standalone");
        assert_eq!(repos[1].owner, "acme");
        assert_eq!(repos[1].default_branch.as_deref(), Some("main"));

        let assets = store.list_assets(&AssetFilter::default()).unwrap();
        assert_eq!(assets.len(), 3);

        let a = assets.iter().find(|a| a.path == "src/a.py").unwrap();
        assert_eq!(a.repo, "acme/widgets");
        assert_eq!(a.size, 120);
        assert_eq!(a.sha.as_deref(), Some("abc123"));
        assert_eq!(a.source_ref.as_deref(), Some("main"));
        assert_eq!(a.stored_path.as_deref(), Some("a.py"));

        // String size coerced, missing size defaulted
        let b = assets.iter().find(|a| a.path == "src/b.py").unwrap();
        assert_eq!(b.size, 64);
        let tool = assets.iter().find(|a| a.path == "tool.sh").unwrap();
        assert_eq!(tool.size, 0);
    }

    #[test]
    fn test_reingest_keeps_one_repo_but_duplicates_assets() {
        // Observed behavior: assets have no dedup key, so a second run
        // doubles them while repos stay unique.
        let temp = TempDir::new().unwrap();
        let catalog = write_json(&temp, "files.json", sample_catalog());
        let db = temp.path().join("catalog.db");

        ingest(&catalog, None, &db).unwrap();
        ingest(&catalog, None, &db).unwrap();

        let store = SqliteStore::open_existing(&db).unwrap();
        assert_eq!(store.list_repos().unwrap().len(), 2);
        assert_eq!(store.list_assets(&AssetFilter::default()).unwrap().len(), 6);
    }

    #[test]
    fn test_reingest_updates_default_branch() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("catalog.db");

        let first = write_json(
            &temp,
            "v1.json",
            json!([{"ownerRepo": "acme/widgets", "path": "a", "rel_path": "a", "branch": "main"}]),
        );
        let second = write_json(
            &temp,
            "v2.json",
            json!([{"ownerRepo": "acme/widgets", "path": "a", "rel_path": "a", "branch": "develop"}]),
        );

        ingest(&first, None, &db).unwrap();
        ingest(&second, None, &db).unwrap();

        let store = SqliteStore::open_existing(&db).unwrap();
        let repos = store.list_repos().unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].default_branch.as_deref(), Some("develop"));
    }

    #[test]
    fn test_ingest_modules_shares_repo_cache() {
        let temp = TempDir::new().unwrap();
        let catalog = write_json(&temp, "files.json", sample_catalog());
        let modules = write_json(
            &temp,
            "modules.json",
            json!([
                {
                    "ownerRepo": "acme/widgets",
                    "module": "widget-utils",
                    "gist_id": "g1",
                    "gist_url": "https://gist.example.com/g1",
                    "visibility": "public",
                    "description": "helpers",
                    "files": [
                        {"filename": "util.py", "raw_url": "https://gist.example.com/raw/util.py"},
                        {"filename": "README.md", "raw_url": "https://gist.example.com/raw/README.md"}
                    ]
                },
                {
                    "owner_repo": "other/repo",
                    "module": "misc",
                    "files": []
                }
            ]),
        );
        let db = temp.path().join("catalog.db");

        let summary = ingest(&catalog, Some(&modules), &db).unwrap();
        assert_eq!(summary.modules, 2);
        assert_eq!(summary.module_files, 2);
        // acme/widgets resolved once across both passes
        assert_eq!(summary.repos, 3);

        let store = SqliteStore::open_existing(&db).unwrap();
        let listed = store.list_modules(None).unwrap();
        assert_eq!(listed.len(), 2);

        let utils = listed.iter().find(|m| m.module_name == "widget-utils").unwrap();
        assert_eq!(utils.repo, "acme/widgets");
        assert_eq!(utils.gist_id.as_deref(), Some("g1"));

        let files = store.list_module_files(utils.id).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "util.py");
    }

    #[test]
    fn test_missing_modules_catalog_is_skipped() {
        let temp = TempDir::new().unwrap();
        let catalog = write_json(&temp, "files.json", sample_catalog());
        let db = temp.path().join("catalog.db");

        let missing = temp.path().join("no-modules.json");
        let summary = ingest(&catalog, Some(&missing), &db).unwrap();
        assert_eq!(summary.modules, 0);
        assert_eq!(summary.assets, 3);
    }

    #[test]
    fn test_missing_catalog_is_fatal_with_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.json");
        let db = temp.path().join("catalog.db");

        let err = ingest(&missing, None, &db).err().unwrap();
        assert!(matches!(err, Error::CatalogRead { .. }));
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_malformed_catalog_is_fatal() {
        let temp = TempDir::new().unwrap();
        let catalog = temp.path().join("bad.json");
        fs::write(&catalog, "{not json").unwrap();
        let db = temp.path().join("catalog.db");

        let err = ingest(&catalog, None, &db).err().unwrap();
        assert!(matches!(err, Error::CatalogParse { .. }));
    }

    #[test]
    fn test_record_missing_owner_repo_is_fatal() {
        let temp = TempDir::new().unwrap();
        let catalog = write_json(
            &temp,
            "files.json",
            json!([{"path": "a", "rel_path": "a"}]),
        );
        let db = temp.path().join("catalog.db");

        let err = ingest(&catalog, None, &db).err().unwrap();
        assert!(matches!(err, Error::CatalogParse { .. }));
    }

    #[test]
    fn test_malformed_modules_catalog_commits_nothing_new() {
        let temp = TempDir::new().unwrap();
        let catalog = write_json(&temp, "files.json", sample_catalog());
        let modules = temp.path().join("modules.json");
        fs::write(&modules, "[{\"broken\": ").unwrap();
        let db = temp.path().join("catalog.db");

        let err = ingest(&catalog, Some(&modules), &db).err().unwrap();
        assert!(matches!(err, Error::CatalogParse { .. }));

        // The failed run rolled back in full, assets included
        let store = SqliteStore::open_existing(&db).unwrap();
        assert!(store.list_assets(&AssetFilter::default()).unwrap().is_empty());
        assert!(store.list_repos().unwrap().is_empty());
    }
}
