//! Design resolver
//!
//! Read-through cached lookup of the per-tier ban page design, plus a live
//! subscription that keeps the cache fresh. Neither path ever fails: any
//! miss or error resolves to the built-in default for the tier.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::StreamExt;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use folio_core::traits::DocumentStream;
use folio_core::{default_design, BanCategory, BanPageDesign, DocumentEvent, DomainError};

use super::context::ServiceContext;

// ============================================================================
// Cache
// ============================================================================

#[derive(Debug, Clone)]
struct CachedDesign {
    design: BanPageDesign,
    stored_at: Instant,
}

/// TTL cache of designs keyed by tier; clones share entries
#[derive(Clone)]
pub struct DesignCache {
    entries: Arc<DashMap<BanCategory, CachedDesign>>,
    ttl: Duration,
}

impl DesignCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `category`; expired entries are evicted on read
    pub fn get(&self, category: BanCategory) -> Option<BanPageDesign> {
        {
            let entry = self.entries.get(&category)?;
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.design.clone());
            }
        }
        self.entries
            .remove_if(&category, |_, cached| cached.stored_at.elapsed() >= self.ttl);
        None
    }

    pub fn put(&self, design: BanPageDesign) {
        self.entries.insert(
            design.category,
            CachedDesign {
                design,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, category: BanCategory) {
        self.entries.remove(&category);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for DesignCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves the design for a tier
#[derive(Clone)]
pub struct DesignResolver {
    ctx: ServiceContext,
}

impl DesignResolver {
    pub fn new(ctx: &ServiceContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// Current design for `category`
    #[instrument(skip(self))]
    pub async fn get(&self, category: BanCategory) -> BanPageDesign {
        let cache = self.ctx.design_cache();
        if let Some(design) = cache.get(category) {
            debug!(%category, "Design cache hit");
            return design;
        }

        let repo = self.ctx.design_repo();
        let result = self
            .ctx
            .retry_policy()
            .run_when(
                "design_read",
                || repo.find_by_category(category),
                DomainError::is_transient,
            )
            .await;

        match result {
            Ok(Some(design)) => {
                cache.put(design.clone());
                design
            }
            Ok(None) => {
                debug!(%category, "No stored design, using default");
                default_design(category)
            }
            Err(e) => {
                warn!(%category, error = %e, "Design read failed, using default");
                default_design(category)
            }
        }
    }

    /// Live design for `category`
    #[instrument(skip(self))]
    pub async fn subscribe(&self, category: BanCategory) -> DesignSubscription {
        let stream = match self.ctx.feed().watch_design(category).await {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!(%category, error = %e, "Design subscription failed, using default");
                None
            }
        };

        DesignSubscription {
            category,
            stream,
            cache: self.ctx.design_cache().clone(),
            finished: false,
        }
    }
}

/// Stream of designs for one tier
///
/// Each stored snapshot refreshes the cache. A missing document or a broken
/// feed yields the default; after a broken feed the subscription ends.
pub struct DesignSubscription {
    category: BanCategory,
    stream: Option<DocumentStream<BanPageDesign>>,
    cache: DesignCache,
    finished: bool,
}

impl DesignSubscription {
    pub fn category(&self) -> BanCategory {
        self.category
    }

    /// Next design, or `None` once the subscription has ended
    pub async fn next(&mut self) -> Option<BanPageDesign> {
        if self.finished {
            return None;
        }

        let Some(stream) = self.stream.as_mut() else {
            self.finished = true;
            return Some(default_design(self.category));
        };

        match stream.next().await {
            Some(DocumentEvent::Snapshot(design)) => {
                if let Err(e) = design.validate() {
                    warn!(category = %self.category, error = %e, "Ignoring invalid design snapshot");
                    return Some(default_design(self.category));
                }
                self.cache.put(design.clone());
                Some(design)
            }
            Some(DocumentEvent::Removed) => {
                self.cache.invalidate(self.category);
                Some(default_design(self.category))
            }
            Some(DocumentEvent::Error(message)) => {
                warn!(category = %self.category, error = %message, "Design feed broke");
                self.stream = None;
                self.finished = true;
                Some(default_design(self.category))
            }
            None => {
                self.stream = None;
                self.finished = true;
                None
            }
        }
    }
}

impl std::fmt::Debug for DesignSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignSubscription")
            .field("category", &self.category)
            .field("live", &self.stream.is_some())
            .finish()
    }
}
