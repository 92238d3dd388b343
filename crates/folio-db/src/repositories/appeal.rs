//! PostgreSQL implementation of AppealRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use folio_core::entities::Appeal;
use folio_core::error::DomainError;
use folio_core::traits::{AppealRepository, RepoResult};
use folio_core::value_objects::VisitorId;

use crate::models::AppealModel;

use super::error::map_db_error;

/// PostgreSQL implementation of AppealRepository
#[derive(Clone)]
pub struct PgAppealRepository {
    pool: PgPool,
}

impl PgAppealRepository {
    /// Create a new PgAppealRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TryFrom<AppealModel> for Appeal {
    type Error = DomainError;

    fn try_from(model: AppealModel) -> Result<Self, Self::Error> {
        serde_json::from_value(model.document)
            .map_err(|e| DomainError::InvalidDocument(format!("appeal {}: {e}", model.id)))
    }
}

#[async_trait]
impl AppealRepository for PgAppealRepository {
    #[instrument(skip(self, appeal), fields(appeal_id = %appeal.id, visitor_id = %appeal.visitor_id))]
    async fn create(&self, appeal: &Appeal) -> RepoResult<()> {
        let document =
            serde_json::to_value(appeal).map_err(|e| DomainError::InternalError(e.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO appeals (id, visitor_id, document, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(appeal.id)
        .bind(appeal.visitor_id.into_inner())
        .bind(document)
        .bind(appeal.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_visitor(&self, visitor_id: VisitorId) -> RepoResult<Vec<Appeal>> {
        let results = sqlx::query_as::<_, AppealModel>(
            r"
            SELECT id, visitor_id, document, created_at
            FROM appeals
            WHERE visitor_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(visitor_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Appeal::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgAppealRepository>();
    }
}
