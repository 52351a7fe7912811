use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::{AppConfig, GenerationConfig, JwtConfig, LedgerConfig};
use crate::generation::client::{HttpGenerator, RecipeGenerator};
use crate::storage::{MemoryStorage, Storage, StorageClient};
use crate::store::{MemoryStore, PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageClient>,
    pub generator: Arc<dyn RecipeGenerator>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to DATABASE_URL")?;

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("run migrations")?;
                Arc::new(PgStore::new(pool))
            }
            None => {
                warn!("DATABASE_URL not set; using the in-memory store, data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let storage: Arc<dyn StorageClient> = match &config.object_store {
            Some(cfg) => Arc::new(
                Storage::new(cfg, "us-east-1")
                    .await
                    .context("init object storage")?,
            ),
            None => {
                warn!("MINIO_* not set; review images are kept in memory");
                Arc::new(MemoryStorage::default())
            }
        };

        let generator = Arc::new(
            HttpGenerator::new(&config.generation).context("init generation client")?,
        ) as Arc<dyn RecipeGenerator>;
        info!(endpoint = %config.generation.endpoint, "generation client ready");

        Ok(Self::from_parts(store, config, storage, generator))
    }

    pub fn from_parts(
        store: Arc<dyn Store>,
        config: Arc<AppConfig>,
        storage: Arc<dyn StorageClient>,
        generator: Arc<dyn RecipeGenerator>,
    ) -> Self {
        Self {
            store,
            config,
            storage,
            generator,
        }
    }

    /// Fully in-memory state for tests. The generator points at an address
    /// nothing listens on; swap it with [`AppState::with_generator`].
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
            },
            generation: GenerationConfig {
                endpoint: "http://127.0.0.1:9/api".into(),
                timeout_secs: 1,
            },
            object_store: None,
            ledger: LedgerConfig {
                max_attempts: 5,
                base_delay_ms: 1,
                max_delay_ms: 10,
            },
        });

        let generator = Arc::new(
            HttpGenerator::new(&config.generation).expect("http client builds"),
        ) as Arc<dyn RecipeGenerator>;

        Self::from_parts(
            Arc::new(MemoryStore::new()),
            config,
            Arc::new(MemoryStorage::default()),
            generator,
        )
    }

    pub fn with_generator(mut self, generator: Arc<dyn RecipeGenerator>) -> Self {
        self.generator = generator;
        self
    }
}
