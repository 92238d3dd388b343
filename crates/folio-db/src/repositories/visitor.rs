//! PostgreSQL implementation of VisitorRepository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use folio_core::entities::{DeviceInfo, LocationInfo, VisitorRecord, VisitorStatus};
use folio_core::error::DomainError;
use folio_core::policy::POLICY_REFERENCE_PATTERN;
use folio_core::traits::{RepoResult, VisitorRepository};
use folio_core::value_objects::VisitorId;

use crate::models::VisitorModel;

use super::error::map_db_error;

/// PostgreSQL implementation of VisitorRepository
#[derive(Clone)]
pub struct PgVisitorRepository {
    pool: PgPool,
}

impl PgVisitorRepository {
    /// Create a new PgVisitorRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TryFrom<VisitorModel> for VisitorRecord {
    type Error = DomainError;

    fn try_from(model: VisitorModel) -> Result<Self, Self::Error> {
        let record = VisitorRecord::from_document(model.document)?;
        if record.id.into_inner() != model.id {
            return Err(DomainError::InvalidDocument(format!(
                "visitor row {} holds document for {}",
                model.id, record.id
            )));
        }
        Ok(record)
    }
}

#[async_trait]
impl VisitorRepository for PgVisitorRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: VisitorId) -> RepoResult<Option<VisitorRecord>> {
        let result = sqlx::query_as::<_, VisitorModel>(
            r"
            SELECT id, status, document, last_seen, created_at, updated_at
            FROM visitors
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(VisitorRecord::try_from).transpose()
    }

    #[instrument(skip(self, record), fields(visitor_id = %record.id, status = record.status.as_str()))]
    async fn upsert(&self, record: &VisitorRecord) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO visitors (id, status, document, last_seen, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (id) DO UPDATE
            SET status = EXCLUDED.status,
                document = EXCLUDED.document,
                last_seen = EXCLUDED.last_seen,
                updated_at = NOW()
            ",
        )
        .bind(record.id.into_inner())
        .bind(record.status.as_str())
        .bind(record.to_document()?)
        .bind(record.last_seen)
        .bind(record.first_seen)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, device, location))]
    async fn record_visit(
        &self,
        id: VisitorId,
        device: &DeviceInfo,
        location: Option<&LocationInfo>,
    ) -> RepoResult<VisitorRecord> {
        let mut first = VisitorRecord::new(id);
        first.record_visit(device.clone(), location.cloned());

        // Merged over the stored document so ban fields written meanwhile survive
        let mut patch = serde_json::json!({
            "device": device,
            "online": true,
            "lastSeen": first.last_seen,
        });
        if let Some(location) = location {
            patch["location"] = serde_json::json!(location);
        }

        let model = sqlx::query_as::<_, VisitorModel>(
            r"
            INSERT INTO visitors (id, status, document, last_seen, created_at, updated_at)
            VALUES ($1, $2, $3, $5, $5, NOW())
            ON CONFLICT (id) DO UPDATE
            SET document = visitors.document || $4 || jsonb_build_object(
                    'visitCount', COALESCE((visitors.document->>'visitCount')::BIGINT, 0) + 1
                ),
                last_seen = EXCLUDED.last_seen,
                updated_at = NOW()
            RETURNING id, status, document, last_seen, created_at, updated_at
            ",
        )
        .bind(id.into_inner())
        .bind(first.status.as_str())
        .bind(first.to_document()?)
        .bind(patch)
        .bind(first.last_seen)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        VisitorRecord::try_from(model)
    }

    #[instrument(skip(self))]
    async fn touch(&self, id: VisitorId, online: bool) -> RepoResult<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            r"
            UPDATE visitors
            SET document = document || $2,
                last_seen = $3,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(serde_json::json!({ "online": online, "lastSeen": now }))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn set_policy_reference(
        &self,
        id: VisitorId,
        reference: &str,
    ) -> RepoResult<Option<VisitorRecord>> {
        let updated = sqlx::query_as::<_, VisitorModel>(
            r"
            UPDATE visitors
            SET document = jsonb_set(document, '{policyReference}', to_jsonb($2::TEXT)),
                updated_at = NOW()
            WHERE id = $1
              AND NOT COALESCE(document->>'policyReference' ~ $3, FALSE)
            RETURNING id, status, document, last_seen, created_at, updated_at
            ",
        )
        .bind(id.into_inner())
        .bind(reference)
        .bind(POLICY_REFERENCE_PATTERN)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        match updated {
            Some(model) => VisitorRecord::try_from(model).map(Some),
            // Unknown visitor, or a valid reference is already stored
            None => self.find_by_id(id).await,
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: VisitorId) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM visitors WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list(&self, status: Option<VisitorStatus>, limit: i64) -> RepoResult<Vec<VisitorRecord>> {
        let results = sqlx::query_as::<_, VisitorModel>(
            r"
            SELECT id, status, document, last_seen, created_at, updated_at
            FROM visitors
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY last_seen DESC
            LIMIT $2
            ",
        )
        .bind(status.map(VisitorStatus::as_str))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        // Skip rows whose document no longer validates rather than failing the listing
        Ok(results
            .into_iter()
            .filter_map(|model| {
                let id = model.id;
                VisitorRecord::try_from(model)
                    .map_err(|e| tracing::warn!(visitor_id = %id, error = %e, "Skipping invalid visitor document"))
                    .ok()
            })
            .collect())
    }
}
