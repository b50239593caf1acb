use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use tempfile::TempDir;

pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub db_path: PathBuf,
    server_process: Option<Child>,
}

impl TestServer {
    /// Ingests the given catalogs through the real binary, then serves the
    /// resulting store on a free port.
    pub async fn start(
        catalog: serde_json::Value,
        modules: Option<serde_json::Value>,
    ) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let db_path = temp_dir.path().join("catalog.db");

        ingest(temp_dir.path(), &db_path, catalog, modules);

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let base_url = format!("http://127.0.0.1:{}", port);

        let server_process = Command::new(env!("CARGO_BIN_EXE_curator"))
            .args(["serve", "--db"])
            .arg(&db_path)
            .args(["--host", "127.0.0.1", "--port"])
            .arg(port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("start server");

        Self::wait_for_ready(&base_url).await;

        Self {
            temp_dir,
            base_url,
            db_path,
            server_process: Some(server_process),
        }
    }

    async fn wait_for_ready(base_url: &str) {
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client
                .get(format!("{}/health", base_url))
                .send()
                .await
                .is_ok()
            {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        panic!("Server did not become ready");
    }

    /// Ingests another catalog into a second store inside the same temp
    /// dir, for exercising the per-request `db` override.
    pub fn ingest_secondary(&self, name: &str, catalog: serde_json::Value) -> PathBuf {
        let db_path = self.temp_dir.path().join(name);
        ingest(self.temp_dir.path(), &db_path, catalog, None);
        db_path
    }
}

fn ingest(
    dir: &Path,
    db_path: &Path,
    catalog: serde_json::Value,
    modules: Option<serde_json::Value>,
) {
    let catalog_path = dir.join(format!(
        "{}-files.json",
        db_path.file_stem().unwrap().to_string_lossy()
    ));
    std::fs::write(&catalog_path, serde_json::to_vec(&catalog).unwrap()).expect("write catalog");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_curator"));
    cmd.arg("ingest").arg(&catalog_path).arg(db_path);

    if let Some(modules) = modules {
        let modules_path = dir.join(format!(
            "{}-modules.json",
            db_path.file_stem().unwrap().to_string_lossy()
        ));
        std::fs::write(&modules_path, serde_json::to_vec(&modules).unwrap())
            .expect("write modules catalog");
        cmd.arg("--modules").arg(&modules_path);
    }

    let output = cmd.output().expect("run ingest");
    assert!(
        output.status.success(),
        "ingest failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(mut process) = self.server_process.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
    }
}
