use serde::Deserialize;
use serde_json::Value;

/// One harvested file as the collector wrote it. A record missing
/// `ownerRepo`, `path`, or `rel_path` fails the whole parse; the remaining
/// fields are tolerated as absent.
#[derive(Debug, Deserialize)]
pub struct AssetDescriptor {
    #[serde(rename = "ownerRepo")]
    pub owner_repo: String,
    pub path: String,
    pub rel_path: String,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Number or numeric string; anything else coerces to 0.
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Arbitrary nested structure, stored opaquely as text.
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl AssetDescriptor {
    pub fn size_bytes(&self) -> i64 {
        coerce_size(self.size.as_ref())
    }

    pub fn metadata_text(&self) -> Option<String> {
        self.metadata.as_ref().map(Value::to_string)
    }
}

/// One published bundle. Both `ownerRepo` and `owner_repo` spellings occur
/// in the wild; either is accepted.
#[derive(Debug, Deserialize)]
pub struct ModuleDescriptor {
    #[serde(rename = "ownerRepo", alias = "owner_repo")]
    pub owner_repo: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(rename = "module")]
    pub module_name: String,
    #[serde(default)]
    pub gist_id: Option<String>,
    #[serde(default)]
    pub gist_url: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub files: Vec<ModuleFileDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct ModuleFileDescriptor {
    pub filename: String,
    pub raw_url: String,
}

fn coerce_size(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
