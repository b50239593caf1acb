use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct StoreParams {
    /// Per-request store override; the configured default applies otherwise.
    #[serde(default)]
    pub db: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListAssetsParams {
    #[serde(default)]
    pub db: Option<String>,
    /// Restrict to one repository, as `owner/name`.
    #[serde(default)]
    pub repo: Option<String>,
    /// Restrict to paths ending in `.<ext>`.
    #[serde(default)]
    pub ext: Option<String>,
    /// Restrict to paths containing this substring.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListModulesParams {
    #[serde(default)]
    pub db: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
}
