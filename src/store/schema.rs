pub const SCHEMA: &str = r#"
-- Source repositories, created on first reference from ingestion
CREATE TABLE IF NOT EXISTS repos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner TEXT NOT NULL,
    name TEXT NOT NULL,
    default_branch TEXT,

    UNIQUE(owner, name)
);

-- Harvested files; append-only, no dedup key beyond the repo FK
CREATE TABLE IF NOT EXISTS assets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repo_id INTEGER NOT NULL REFERENCES repos(id),
    path TEXT NOT NULL,
    rel_path TEXT NOT NULL,
    content_type TEXT,
    size INTEGER NOT NULL DEFAULT 0,
    sha TEXT,
    ref TEXT,              -- source branch at capture time
    url TEXT,
    stored_path TEXT,      -- where the harvester stored the file locally
    created_at TEXT DEFAULT (datetime('now')),
    metadata TEXT          -- opaque serialized JSON, never queried structurally
);

-- Published bundles (gists) tied to a repository
CREATE TABLE IF NOT EXISTS modules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repo_id INTEGER NOT NULL REFERENCES repos(id),
    module_name TEXT NOT NULL,
    gist_id TEXT,
    gist_url TEXT,
    visibility TEXT,
    description TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS module_files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    module_id INTEGER NOT NULL REFERENCES modules(id),
    filename TEXT NOT NULL,
    raw_url TEXT NOT NULL
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_assets_repo ON assets(repo_id);
CREATE INDEX IF NOT EXISTS idx_assets_created ON assets(created_at);
CREATE INDEX IF NOT EXISTS idx_modules_repo ON modules(repo_id);
CREATE INDEX IF NOT EXISTS idx_module_files_module ON module_files(module_id);
"#;
