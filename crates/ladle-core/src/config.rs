//! Environment-driven configuration, read once at startup.

use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MAX_DB_CONNECTIONS: u32 = 10;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;
const DEFAULT_INSERT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STORAGE_BACKEND: StorageBackend = StorageBackend::Local;
const DEFAULT_LOCAL_STORAGE_PATH: &str = "./data/storage";
const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:8000/storage";

/// Which object-store backend blobs are written through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    S3,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "s3" => Ok(Self::S3),
            other => bail!("unknown storage backend: {other}"),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::S3 => write!(f, "s3"),
        }
    }
}

/// Runtime configuration for the publishing pipeline and its two stores.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub database_url: String,
    pub max_db_connections: u32,
    pub storage_backend: StorageBackend,
    pub local_storage_path: String,
    pub local_base_url: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint_url: Option<String>,
    /// Bound on each individual object-store put.
    pub upload_timeout: Duration,
    /// Bound on each individual relational insert.
    pub insert_timeout: Duration,
}

impl PublisherConfig {
    /// Loads configuration from the environment, `.env` included.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let max_db_connections = env::var("MAX_DB_CONNECTIONS")
            .unwrap_or_else(|_| DEFAULT_MAX_DB_CONNECTIONS.to_string())
            .parse()
            .unwrap_or(DEFAULT_MAX_DB_CONNECTIONS);

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => DEFAULT_STORAGE_BACKEND,
        };

        let local_storage_path = env::var("LOCAL_STORAGE_PATH")
            .unwrap_or_else(|_| DEFAULT_LOCAL_STORAGE_PATH.to_string());
        let local_base_url =
            env::var("LOCAL_BASE_URL").unwrap_or_else(|_| DEFAULT_LOCAL_BASE_URL.to_string());

        let s3_bucket = env::var("S3_BUCKET").ok();
        let s3_region = env::var("S3_REGION").ok();
        let s3_endpoint_url = env::var("S3_ENDPOINT_URL").ok();

        let upload_timeout = Duration::from_secs(
            env::var("UPLOAD_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS),
        );
        let insert_timeout = Duration::from_secs(
            env::var("INSERT_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_INSERT_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_INSERT_TIMEOUT_SECS),
        );

        let config = Self {
            database_url,
            max_db_connections,
            storage_backend,
            local_storage_path,
            local_base_url,
            s3_bucket,
            s3_region,
            s3_endpoint_url,
            upload_timeout,
            insert_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that cannot work at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            bail!("DATABASE_URL must not be empty");
        }
        if self.max_db_connections == 0 {
            bail!("MAX_DB_CONNECTIONS must be at least 1");
        }
        if self.upload_timeout.is_zero() {
            bail!("UPLOAD_TIMEOUT_SECS must be positive");
        }
        if self.insert_timeout.is_zero() {
            bail!("INSERT_TIMEOUT_SECS must be positive");
        }
        if self.storage_backend == StorageBackend::S3 && self.s3_bucket.is_none() {
            bail!("S3_BUCKET must be set when STORAGE_BACKEND=s3");
        }
        Ok(())
    }
}
