//! Production wiring
//!
//! Postgres when `DATABASE_URL` is set (the offline store otherwise), Redis
//! for presence, change notification and the live document feed.

use std::sync::Arc;

use tracing::{info, warn};

use folio_cache::{PresenceStore, Publisher, RedisDocumentFeed, RedisPool, Subscriber, SubscriberBuilder};
use folio_common::{AppConfig, AppError};
use folio_core::traits::{AppealRepository, DesignRepository, VisitorRepository};
use folio_db::{
    create_pool, run_migrations, DatabaseConfig, OfflineStore, PgAppealRepository,
    PgDesignRepository, PgPool, PgVisitorRepository,
};

use super::context::{ServiceContext, ServiceContextBuilder};

type Repositories = (
    Arc<dyn VisitorRepository>,
    Arc<dyn DesignRepository>,
    Arc<dyn AppealRepository>,
);

/// Connections behind a production `ServiceContext`
pub struct Backends {
    database: Option<PgPool>,
    redis: RedisPool,
    subscriber: Arc<Subscriber>,
}

impl Backends {
    /// Connect everything the config names and build the service context
    pub async fn connect(config: &AppConfig) -> Result<(ServiceContext, Self), AppError> {
        let (repositories, database) = match &config.database {
            Some(settings) => {
                info!("Connecting to PostgreSQL...");
                let pool = create_pool(&DatabaseConfig::from(settings))
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                run_migrations(&pool)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                info!("PostgreSQL connection established");
                (pg_repositories(&pool), Some(pool))
            }
            None => {
                warn!("DATABASE_URL not set, running without storage");
                let store = Arc::new(OfflineStore::new());
                let repositories: Repositories = (store.clone(), store.clone(), store);
                (repositories, None)
            }
        };
        let (visitors, designs, appeals) = repositories;

        info!("Connecting to Redis...");
        let redis = RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
        let subscriber = Arc::new(
            SubscriberBuilder::new()
                .redis_url(config.redis.url.clone())
                .build()
                .await
                .map_err(|e| AppError::Cache(format!("Failed to start subscriber: {e}")))?,
        );
        info!("Redis connection established");

        let feed = RedisDocumentFeed::new(subscriber.clone(), visitors.clone(), designs.clone());

        let ctx = ServiceContextBuilder::from_config(config)
            .visitor_repo(visitors)
            .design_repo(designs)
            .appeal_repo(appeals)
            .feed(Arc::new(feed))
            .notifier(Arc::new(Publisher::new(redis.clone())))
            .presence(Arc::new(PresenceStore::new(redis.clone())))
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok((
            ctx,
            Self {
                database,
                redis,
                subscriber,
            },
        ))
    }

    /// `None` when running without a database
    pub async fn database_healthy(&self) -> Option<bool> {
        match &self.database {
            Some(pool) => Some(pool.acquire().await.is_ok()),
            None => None,
        }
    }

    pub async fn redis_healthy(&self) -> bool {
        self.redis.health_check().await.is_ok()
    }

    /// Stop the pub/sub listener
    pub async fn shutdown(&self) {
        if let Err(e) = self.subscriber.shutdown().await {
            warn!(error = %e, "Subscriber shutdown failed");
        }
    }
}

fn pg_repositories(pool: &PgPool) -> Repositories {
    (
        Arc::new(PgVisitorRepository::new(pool.clone())),
        Arc::new(PgDesignRepository::new(pool.clone())),
        Arc::new(PgAppealRepository::new(pool.clone())),
    )
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("database", &self.database.is_some())
            .finish_non_exhaustive()
    }
}
