use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use super::schema::SCHEMA;
use super::{AssetFilter, Store};
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens the store at `db_path`, creating the file if it does not exist.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an existing store; the query side never creates one. A missing
    /// file is a configuration error carrying the attempted path.
    pub fn open_existing<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        if !path.exists() {
            return Err(Error::StoreMissing(path.to_path_buf()));
        }
        Self::new(path)
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

const ASSET_COLUMNS: &str = "a.id, r.owner || '/' || r.name AS repo, a.path, a.rel_path, \
     a.content_type, a.size, a.sha, a.ref, a.url, a.stored_path, a.created_at";

fn asset_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: row.get(0)?,
        repo: row.get(1)?,
        path: row.get(2)?,
        rel_path: row.get(3)?,
        content_type: row.get(4)?,
        size: row.get(5)?,
        sha: row.get(6)?,
        source_ref: row.get(7)?,
        url: row.get(8)?,
        stored_path: row.get(9)?,
        created_at: parse_datetime(&row.get::<_, String>(10)?),
        metadata: None,
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Repo operations

    fn upsert_repo(&self, owner: &str, name: &str, default_branch: Option<&str>) -> Result<i64> {
        let conn = self.conn();
        let id = conn.query_row(
            "INSERT INTO repos (owner, name, default_branch) VALUES (?1, ?2, ?3)
             ON CONFLICT(owner, name) DO UPDATE SET default_branch = excluded.default_branch
             RETURNING id",
            params![owner, name, default_branch],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn list_repos(&self) -> Result<Vec<Repo>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, owner, name, default_branch FROM repos ORDER BY owner, name",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Repo {
                id: row.get(0)?,
                owner: row.get(1)?,
                name: row.get(2)?,
                default_branch: row.get(3)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Asset operations

    fn insert_asset(&self, asset: &NewAsset) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO assets (repo_id, path, rel_path, content_type, size, sha, ref, url, stored_path, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                asset.repo_id,
                asset.path,
                asset.rel_path,
                asset.content_type,
                asset.size,
                asset.sha,
                asset.source_ref,
                asset.url,
                asset.stored_path,
                asset.metadata,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn list_assets(&self, filter: &AssetFilter) -> Result<Vec<Asset>> {
        let conn = self.conn();

        // Filter values are always bound; only static fragments are
        // concatenated into the statement text.
        let mut sql = format!("SELECT {ASSET_COLUMNS} FROM assets a JOIN repos r ON a.repo_id = r.id");
        let mut clauses: Vec<&str> = Vec::new();
        let mut bindings: Vec<Value> = Vec::new();

        if let Some(repo) = &filter.repo {
            clauses.push("r.owner = ? AND r.name = ?");
            bindings.push(repo.owner.clone().into());
            bindings.push(repo.name.clone().into());
        }
        if let Some(ext) = &filter.extension {
            clauses.push("a.path LIKE ?");
            bindings.push(format!("%.{ext}").into());
        }
        if let Some(search) = &filter.search {
            clauses.push("a.path LIKE ?");
            bindings.push(format!("%{search}%").into());
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        // id breaks created_at ties so pagination stays stable within a
        // batch that landed in the same second.
        sql.push_str(" ORDER BY a.created_at DESC, a.id DESC LIMIT ? OFFSET ?");
        bindings.push(filter.limit.into());
        bindings.push(filter.offset.into());

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bindings), asset_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_asset(&self, id: i64) -> Result<Option<Asset>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {ASSET_COLUMNS}, a.metadata FROM assets a \
                 JOIN repos r ON a.repo_id = r.id WHERE a.id = ?1"
            ),
            params![id],
            |row| {
                let mut asset = asset_from_row(row)?;
                asset.metadata = row.get(11)?;
                Ok(asset)
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // Module operations

    fn insert_module(&self, module: &NewModule) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO modules (repo_id, module_name, gist_id, gist_url, visibility, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                module.repo_id,
                module.module_name,
                module.gist_id,
                module.gist_url,
                module.visibility,
                module.description,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_module_file(&self, module_id: i64, file: &ModuleFile) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO module_files (module_id, filename, raw_url) VALUES (?1, ?2, ?3)",
            params![module_id, file.filename, file.raw_url],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn list_modules(&self, repo: Option<&RepoKey>) -> Result<Vec<Module>> {
        let conn = self.conn();

        let mut sql = String::from(
            "SELECT m.id, r.owner || '/' || r.name AS repo, m.module_name, m.gist_id, \
             m.gist_url, m.visibility, m.description, m.created_at \
             FROM modules m JOIN repos r ON m.repo_id = r.id",
        );
        let mut bindings: Vec<Value> = Vec::new();

        if let Some(repo) = repo {
            sql.push_str(" WHERE r.owner = ? AND r.name = ?");
            bindings.push(repo.owner.clone().into());
            bindings.push(repo.name.clone().into());
        }

        sql.push_str(" ORDER BY m.created_at DESC, m.id DESC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bindings), |row| {
            Ok(Module {
                id: row.get(0)?,
                repo: row.get(1)?,
                module_name: row.get(2)?,
                gist_id: row.get(3)?,
                gist_url: row.get(4)?,
                visibility: row.get(5)?,
                description: row.get(6)?,
                created_at: parse_datetime(&row.get::<_, String>(7)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_module_files(&self, module_id: i64) -> Result<Vec<ModuleFile>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT filename, raw_url FROM module_files WHERE module_id = ?1")?;

        let rows = stmt.query_map(params![module_id], |row| {
            Ok(ModuleFile {
                filename: row.get(0)?,
                raw_url: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Batch boundaries

    fn begin_batch(&self) -> Result<()> {
        self.conn().execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit_batch(&self) -> Result<()> {
        self.conn().execute_batch("COMMIT")?;
        Ok(())
    }
}
