use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

pub const SIDECAR_FILE: &str = "metadata.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// JSON array sidecar next to the uploaded files.
    Sidecar,
    /// SQLite database through sea-orm.
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sidecar" | "json" => Ok(StoreBackend::Sidecar),
            "sqlite" | "sql" => Ok(StoreBackend::Sqlite),
            other => Err(AppError::Config(format!("unknown STORE_BACKEND '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub public_base_url: String,
    pub store_backend: StoreBackend,
    pub database_url: String,
    pub max_upload_bytes: usize,
    pub process_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("PORT", 5000u16)?;
        let upload_dir = PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));
        let store_backend = match env::var("STORE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => StoreBackend::Sidecar,
        };
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| default_database_url(&upload_dir));
        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", 100 * 1024 * 1024usize)?;
        let process_delay_ms = parse_var("PROCESS_DELAY_MS", 1500u64)?;

        Ok(Self {
            host,
            port,
            upload_dir,
            public_base_url,
            store_backend,
            database_url,
            max_upload_bytes,
            process_delay_ms,
        })
    }

    /// Defaults suitable for tests and local runs rooted at `upload_dir`.
    pub fn local(upload_dir: impl Into<PathBuf>) -> Self {
        let upload_dir = upload_dir.into();
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            public_base_url: "http://localhost:5000".to_string(),
            store_backend: StoreBackend::Sidecar,
            database_url: default_database_url(&upload_dir),
            upload_dir,
            max_upload_bytes: 100 * 1024 * 1024,
            process_delay_ms: 0,
        }
    }

    pub fn sidecar_path(&self) -> PathBuf {
        self.upload_dir.join(SIDECAR_FILE)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_database_url(upload_dir: &std::path::Path) -> String {
    format!("sqlite://{}?mode=rwc", upload_dir.join("metadata.db").display())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}
