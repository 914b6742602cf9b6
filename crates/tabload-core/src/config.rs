//! Configuration module
//!
//! Configuration is read once from the environment at startup and is immutable afterwards.
//! In particular the default dataset never changes at runtime: a dataset picked on the upload
//! form applies to that request only.

use std::env;

use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATASET: &str = "uploads";
const MAX_FILE_SIZE_MB: usize = 32;

/// Process-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub max_file_size_bytes: usize,
}

/// Ingestion service configuration
#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub base: BaseConfig,
    /// Enables both the object store and the table store when present.
    pub project_id: Option<String>,
    pub default_dataset: String,
    /// Legacy single-table option; read so it can be reported, never used.
    pub legacy_table: Option<String>,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub buckets: Vec<String>,
    pub local_storage_path: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    // Table store configuration
    pub warehouse_path: Option<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<IngestConfig>);

impl Config {
    fn as_ingest(&self) -> &IngestConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_ingest().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = IngestConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_ingest().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_ingest().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_ingest().base.environment
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_ingest().base.max_file_size_bytes
    }

    pub fn project_id(&self) -> Option<&str> {
        self.as_ingest().project_id.as_deref()
    }

    pub fn default_dataset(&self) -> &str {
        &self.as_ingest().default_dataset
    }

    pub fn legacy_table(&self) -> Option<&str> {
        self.as_ingest().legacy_table.as_deref()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_ingest().storage_backend
    }

    pub fn buckets(&self) -> &[String] {
        &self.as_ingest().buckets
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_ingest().local_storage_path.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_ingest().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_ingest().s3_endpoint.as_deref()
    }

    pub fn warehouse_path(&self) -> Option<&str> {
        self.as_ingest().warehouse_path.as_deref()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl IngestConfig {
    /// Build the configuration from a key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let max_file_size_mb = lookup("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let base = BaseConfig {
            server_port: lookup("PORT")
                .unwrap_or_else(|| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
        };

        let storage_backend = match non_blank(lookup("STORAGE_BACKEND")) {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::Gcs,
        };

        let buckets = lookup("GCS_BUCKETS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let config = IngestConfig {
            base,
            project_id: non_blank(lookup("PROJECT_ID")),
            default_dataset: non_blank(lookup("BQ_DATASET"))
                .unwrap_or_else(|| DEFAULT_DATASET.to_string()),
            legacy_table: non_blank(lookup("BQ_TABLE")),
            storage_backend,
            buckets,
            local_storage_path: non_blank(lookup("LOCAL_STORAGE_PATH")),
            s3_region: non_blank(lookup("S3_REGION")).or_else(|| non_blank(lookup("AWS_REGION"))),
            s3_endpoint: non_blank(lookup("S3_ENDPOINT")),
            warehouse_path: non_blank(lookup("WAREHOUSE_PATH")),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if !self
            .default_dataset
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(anyhow::anyhow!(
                "BQ_DATASET may only contain letters, digits and underscores"
            ));
        }

        // Backend settings only matter once PROJECT_ID enables the clients
        if self.project_id.is_none() {
            return Ok(());
        }

        match self.storage_backend {
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::S3 => {
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Gcs | StorageBackend::Memory => {}
        }

        Ok(())
    }
}
