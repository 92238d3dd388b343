//! PostgreSQL implementation of DesignRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use folio_core::entities::BanPageDesign;
use folio_core::error::DomainError;
use folio_core::traits::{DesignRepository, RepoResult};
use folio_core::value_objects::BanCategory;

use crate::models::DesignModel;

use super::error::map_db_error;

/// PostgreSQL implementation of DesignRepository
#[derive(Clone)]
pub struct PgDesignRepository {
    pool: PgPool,
}

impl PgDesignRepository {
    /// Create a new PgDesignRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TryFrom<DesignModel> for BanPageDesign {
    type Error = DomainError;

    fn try_from(model: DesignModel) -> Result<Self, Self::Error> {
        let design = BanPageDesign::from_document(model.document)?;
        if design.category.as_str() != model.category {
            return Err(DomainError::InvalidDocument(format!(
                "design row {} holds document for {}",
                model.category, design.category
            )));
        }
        Ok(design)
    }
}

#[async_trait]
impl DesignRepository for PgDesignRepository {
    #[instrument(skip(self))]
    async fn find_by_category(&self, category: BanCategory) -> RepoResult<Option<BanPageDesign>> {
        let result = sqlx::query_as::<_, DesignModel>(
            r"
            SELECT category, version, document, updated_at
            FROM ban_page_designs
            WHERE category = $1
            ",
        )
        .bind(category.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(BanPageDesign::try_from).transpose()
    }

    #[instrument(skip(self, design), fields(category = %design.category, version = design.version))]
    async fn upsert(&self, design: &BanPageDesign) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO ban_page_designs (category, version, document, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (category) DO UPDATE
            SET version = EXCLUDED.version,
                document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(design.category.as_str())
        .bind(design.version as i32)
        .bind(design.to_document()?)
        .bind(design.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<BanPageDesign>> {
        let results = sqlx::query_as::<_, DesignModel>(
            r"
            SELECT category, version, document, updated_at
            FROM ban_page_designs
            ORDER BY category
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(BanPageDesign::try_from).collect()
    }
}
