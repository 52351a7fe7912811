use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStoreConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

/// Bounds for the optimistic retry loop around review submission.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 25,
            max_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub generation: GenerationConfig,
    pub object_store: Option<ObjectStoreConfig>,
    pub ledger: LedgerConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok();
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "recipebox".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "recipebox-users".into()),
        };
        let generation = GenerationConfig {
            endpoint: std::env::var("AI_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:3000/api".into()),
            timeout_secs: env_parse("AI_TIMEOUT_SECS").unwrap_or(30),
        };

        let object_store = match (
            std::env::var("MINIO_ENDPOINT"),
            std::env::var("MINIO_BUCKET"),
            std::env::var("MINIO_ACCESS_KEY"),
            std::env::var("MINIO_SECRET_KEY"),
        ) {
            (Ok(endpoint), Ok(bucket), Ok(access_key), Ok(secret_key)) => Some(ObjectStoreConfig {
                endpoint,
                bucket,
                access_key,
                secret_key,
            }),
            _ => None,
        };

        let defaults = LedgerConfig::default();
        let ledger = LedgerConfig {
            max_attempts: env_parse("LEDGER_MAX_ATTEMPTS").unwrap_or(defaults.max_attempts),
            base_delay_ms: env_parse("LEDGER_BASE_DELAY_MS").unwrap_or(defaults.base_delay_ms),
            max_delay_ms: env_parse("LEDGER_MAX_DELAY_MS").unwrap_or(defaults.max_delay_ms),
        };
        anyhow::ensure!(ledger.max_attempts > 0, "LEDGER_MAX_ATTEMPTS must be at least 1");

        Ok(Self {
            database_url,
            jwt,
            generation,
            object_store,
            ledger,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
