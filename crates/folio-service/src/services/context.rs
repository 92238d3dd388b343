//! Service context - dependency container for services
//!
//! Holds the document repositories, the live feed, change notification,
//! presence, the shared design cache, and the tunables the ban page needs.

use std::sync::Arc;
use std::time::Duration;

use folio_common::{AdminConfig, AppConfig, JwtService, RetryPolicy};
use folio_core::traits::{
    AppealRepository, ChangeNotifier, DesignRepository, DocumentFeed, PresenceTracker,
    VisitorRepository,
};

use super::design::DesignCache;
use super::error::{ServiceError, ServiceResult};

const DEFAULT_DESIGN_TTL: Duration = Duration::from_secs(300);
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Service context containing all dependencies
///
/// Cloning is cheap; every dependency sits behind an `Arc`. Long-lived tasks
/// (status listeners, ban page sessions) own a clone.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    visitor_repo: Arc<dyn VisitorRepository>,
    design_repo: Arc<dyn DesignRepository>,
    appeal_repo: Arc<dyn AppealRepository>,

    // Live documents
    feed: Arc<dyn DocumentFeed>,
    notifier: Arc<dyn ChangeNotifier>,
    presence: Arc<dyn PresenceTracker>,

    design_cache: DesignCache,
    retry_policy: RetryPolicy,
    settle_delay: Duration,
    storage_configured: bool,

    // Admin surface
    admin: Option<AdminConfig>,
    jwt_service: Option<Arc<JwtService>>,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn visitor_repo(&self) -> &dyn VisitorRepository {
        self.visitor_repo.as_ref()
    }

    pub fn design_repo(&self) -> &dyn DesignRepository {
        self.design_repo.as_ref()
    }

    pub fn appeal_repo(&self) -> &dyn AppealRepository {
        self.appeal_repo.as_ref()
    }

    // === Live documents ===

    pub fn feed(&self) -> &dyn DocumentFeed {
        self.feed.as_ref()
    }

    pub fn notifier(&self) -> &dyn ChangeNotifier {
        self.notifier.as_ref()
    }

    pub fn presence(&self) -> &dyn PresenceTracker {
        self.presence.as_ref()
    }

    // === Ban page tunables ===

    /// Shared design cache
    pub fn design_cache(&self) -> &DesignCache {
        &self.design_cache
    }

    /// Retry policy for storage reads and policy reference fetches
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Pause between a category transition and the re-render
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Whether a real database backs the repositories
    pub fn storage_configured(&self) -> bool {
        self.storage_configured
    }

    /// Fail with `StorageUnavailable` when running without a database
    pub fn require_storage(&self) -> ServiceResult<()> {
        if self.storage_configured {
            Ok(())
        } else {
            Err(folio_core::DomainError::StorageUnavailable.into())
        }
    }

    // === Admin ===

    pub fn admin_config(&self) -> Option<&AdminConfig> {
        self.admin.as_ref()
    }

    pub fn jwt_service(&self) -> Option<&JwtService> {
        self.jwt_service.as_deref()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("design_cache", &self.design_cache)
            .field("retry_policy", &self.retry_policy)
            .field("settle_delay", &self.settle_delay)
            .field("storage_configured", &self.storage_configured)
            .field("admin", &self.admin.is_some())
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    visitor_repo: Option<Arc<dyn VisitorRepository>>,
    design_repo: Option<Arc<dyn DesignRepository>>,
    appeal_repo: Option<Arc<dyn AppealRepository>>,
    feed: Option<Arc<dyn DocumentFeed>>,
    notifier: Option<Arc<dyn ChangeNotifier>>,
    presence: Option<Arc<dyn PresenceTracker>>,
    design_ttl: Duration,
    retry_policy: RetryPolicy,
    settle_delay: Duration,
    storage_configured: bool,
    admin: Option<AdminConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            visitor_repo: None,
            design_repo: None,
            appeal_repo: None,
            feed: None,
            notifier: None,
            presence: None,
            design_ttl: DEFAULT_DESIGN_TTL,
            retry_policy: RetryPolicy::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            storage_configured: true,
            admin: None,
        }
    }

    /// Take tunables, admin credentials, and storage mode from the app config
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new()
            .design_ttl(config.ban_page.design_cache_ttl())
            .settle_delay(config.ban_page.settle_delay())
            .retry_policy(RetryPolicy::from_settings(&config.retry))
            .storage_configured(config.has_database())
            .admin(config.admin.clone())
    }

    pub fn visitor_repo(mut self, repo: Arc<dyn VisitorRepository>) -> Self {
        self.visitor_repo = Some(repo);
        self
    }

    pub fn design_repo(mut self, repo: Arc<dyn DesignRepository>) -> Self {
        self.design_repo = Some(repo);
        self
    }

    pub fn appeal_repo(mut self, repo: Arc<dyn AppealRepository>) -> Self {
        self.appeal_repo = Some(repo);
        self
    }

    /// Use one store for all three repositories
    pub fn repositories<S>(self, store: Arc<S>) -> Self
    where
        S: VisitorRepository + DesignRepository + AppealRepository + 'static,
    {
        self.visitor_repo(store.clone())
            .design_repo(store.clone())
            .appeal_repo(store)
    }

    pub fn feed(mut self, feed: Arc<dyn DocumentFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn presence(mut self, presence: Arc<dyn PresenceTracker>) -> Self {
        self.presence = Some(presence);
        self
    }

    pub fn design_ttl(mut self, ttl: Duration) -> Self {
        self.design_ttl = ttl;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn storage_configured(mut self, configured: bool) -> Self {
        self.storage_configured = configured;
        self
    }

    pub fn admin(mut self, admin: Option<AdminConfig>) -> Self {
        self.admin = admin;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let jwt_service = self
            .admin
            .as_ref()
            .map(|admin| Arc::new(JwtService::from_config(admin)));

        Ok(ServiceContext {
            visitor_repo: self
                .visitor_repo
                .ok_or_else(|| ServiceError::validation("visitor_repo is required"))?,
            design_repo: self
                .design_repo
                .ok_or_else(|| ServiceError::validation("design_repo is required"))?,
            appeal_repo: self
                .appeal_repo
                .ok_or_else(|| ServiceError::validation("appeal_repo is required"))?,
            feed: self
                .feed
                .ok_or_else(|| ServiceError::validation("feed is required"))?,
            notifier: self
                .notifier
                .ok_or_else(|| ServiceError::validation("notifier is required"))?,
            presence: self
                .presence
                .ok_or_else(|| ServiceError::validation("presence is required"))?,
            design_cache: DesignCache::new(self.design_ttl),
            retry_policy: self.retry_policy,
            settle_delay: self.settle_delay,
            storage_configured: self.storage_configured,
            admin: self.admin,
            jwt_service,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::memory_context;
    use super::*;

    #[test]
    fn test_build_requires_repositories() {
        let err = ServiceContextBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("visitor_repo is required"));
    }

    #[test]
    fn test_memory_context_defaults() {
        let (ctx, _store) = memory_context();
        assert!(ctx.storage_configured());
        assert!(ctx.require_storage().is_ok());
        assert!(ctx.jwt_service().is_none());
        assert_eq!(ctx.design_cache().ttl(), DEFAULT_DESIGN_TTL);
    }

    #[test]
    fn test_admin_config_enables_jwt() {
        let admin = AdminConfig {
            username: "admin".to_string(),
            password: "secret".to_string(),
            jwt_secret: "signing-key".to_string(),
            token_expiry: 60,
        };
        let (ctx, _store) = super::test_support::memory_context_with(
            ServiceContextBuilder::new()
                .admin(Some(admin))
                .storage_configured(false),
        );
        assert!(ctx.jwt_service().is_some());
        assert_eq!(ctx.require_storage().unwrap_err().status_code(), 503);
    }
}
