use std::net::SocketAddr;
use std::path::PathBuf;

/// Default store location, used when neither `--db` nor `CURATOR_DB` is set.
pub const DEFAULT_DB_PATH: &str = "./data/catalog.db";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Store queried when a request carries no `db` override.
    pub db_path: PathBuf,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}
