//! Policy reference service
//!
//! Resolves the reference code shown on a ban page, generating and storing
//! one when the visitor document has none (or a malformed one).

use tracing::{debug, info, instrument, warn};

use folio_core::{
    generate_policy_reference, is_valid_policy_reference, DomainError, VisitorId, VisitorRecord,
};

use super::context::ServiceContext;

/// Policy reference service
pub struct PolicyReferenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PolicyReferenceService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Stored reference, or a freshly generated one.
    ///
    /// Each attempt is bounded by the retry policy's timeout; `None` means
    /// every attempt failed and the page keeps its placeholder.
    #[instrument(skip(self))]
    pub async fn fetch_or_generate(&self, visitor_id: VisitorId) -> Option<String> {
        let result = self
            .ctx
            .retry_policy()
            .run_when(
                "policy_reference",
                || self.resolve(visitor_id),
                DomainError::is_transient,
            )
            .await;

        match result {
            Ok(reference) => Some(reference),
            Err(e) => {
                warn!(visitor_id = %visitor_id, error = %e, "Policy reference unavailable");
                None
            }
        }
    }

    async fn resolve(&self, visitor_id: VisitorId) -> Result<String, DomainError> {
        let Some(record) = self.ctx.visitor_repo().find_by_id(visitor_id).await? else {
            // Nothing to attach it to; display only
            return Ok(generate_policy_reference());
        };

        if let Some(reference) = valid_reference(&record) {
            return Ok(reference);
        }
        if record.policy_reference.is_some() {
            info!(visitor_id = %visitor_id, "Replacing malformed policy reference");
        }

        let generated = generate_policy_reference();
        let Some(stored) = self
            .ctx
            .visitor_repo()
            .set_policy_reference(visitor_id, &generated)
            .await?
        else {
            // Deleted since the read
            return Ok(generated);
        };

        let reference = valid_reference(&stored).unwrap_or_else(|| generated.clone());
        if reference != generated {
            debug!(visitor_id = %visitor_id, "Policy reference stored concurrently, keeping it");
            return Ok(reference);
        }

        if let Err(e) = self.ctx.notifier().visitor_changed(visitor_id, Some(&stored)).await {
            warn!(visitor_id = %visitor_id, error = %e, "Failed to publish policy reference");
        }

        info!(visitor_id = %visitor_id, reference = %reference, "Policy reference generated");
        Ok(reference)
    }
}

fn valid_reference(record: &VisitorRecord) -> Option<String> {
    record
        .policy_reference
        .as_deref()
        .filter(|r| is_valid_policy_reference(r))
        .map(str::to_string)
}
