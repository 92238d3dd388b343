//! Ban page orchestration
//!
//! A session owns one status listener and one design subscription and folds
//! their output into `BanPageUpdate`s. The view is always re-derived from the
//! latest facts and the latest design, never patched field by field.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use folio_core::{BanCategory, BanPageDesign, VisitorId};

use super::params::BanPageParams;
use super::view::{BanPageFacts, BanPageView};
use crate::services::{
    DesignResolver, DesignSubscription, ListenerHandle, ServiceContext, StatusListener,
    StatusSignal,
};

const UPDATE_BUFFER: usize = 32;

/// What the page should do next
#[derive(Debug, Clone, PartialEq)]
pub enum BanPageUpdate {
    /// Draw this view
    Render(BanPageView),
    /// Category is changing; a `Render` for `to` follows after the settle delay
    Transitioning { from: BanCategory, to: BanCategory },
    /// Ban lifted; navigate away. Sent at most once, and last.
    Unbanned { redirect_to: String },
    /// Live updates stopped; the view carries the notice. Sent last.
    ConnectionLost(BanPageView),
}

/// Builds ban page views and live sessions
#[derive(Clone)]
pub struct BanPageOrchestrator {
    ctx: ServiceContext,
}

impl BanPageOrchestrator {
    pub fn new(ctx: &ServiceContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// View from URL parameters and the current design, before any listening
    #[instrument(skip(self))]
    pub async fn initial_view(&self, params: &BanPageParams) -> BanPageView {
        let design = DesignResolver::new(&self.ctx)
            .get(params.initial_category)
            .await;
        BanPageView::derive(&BanPageFacts::from(params), &design)
    }

    /// Render the initial view and start listening
    ///
    /// Without a visitor id only design changes are followed.
    #[instrument(skip(self))]
    pub async fn start(&self, params: BanPageParams) -> BanPageSession {
        let initial = self.initial_view(&params).await;
        let (tx, rx) = mpsc::channel(UPDATE_BUFFER);

        let state = SessionState {
            visitor_id: params.visitor_id,
            facts: BanPageFacts::from(&params),
            design: initial.design.clone(),
        };
        let task = tokio::spawn(run_session(self.ctx.clone(), state, tx));

        BanPageSession {
            initial,
            updates: rx,
            task: Some(task),
        }
    }
}

/// A live ban page; dropping it stops listening
#[derive(Debug)]
pub struct BanPageSession {
    initial: BanPageView,
    updates: mpsc::Receiver<BanPageUpdate>,
    task: Option<JoinHandle<()>>,
}

impl BanPageSession {
    pub fn initial(&self) -> &BanPageView {
        &self.initial
    }

    /// Next update, or `None` once the session has ended
    pub async fn next(&mut self) -> Option<BanPageUpdate> {
        self.updates.recv().await
    }

    pub fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for BanPageSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ============================================================================
// Session task
// ============================================================================

struct SessionState {
    visitor_id: Option<VisitorId>,
    facts: BanPageFacts,
    design: BanPageDesign,
}

impl SessionState {
    fn view(&self) -> BanPageView {
        BanPageView::derive(&self.facts, &self.design)
    }
}

enum Step {
    Signal(StatusSignal),
    Design(Option<BanPageDesign>),
    Idle,
}

#[instrument(skip_all, fields(visitor_id = ?state.visitor_id))]
async fn run_session(ctx: ServiceContext, mut state: SessionState, updates: mpsc::Sender<BanPageUpdate>) {
    let resolver = DesignResolver::new(&ctx);
    let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();

    // Held for the life of the session
    let _listener: Option<ListenerHandle> = state.visitor_id.map(|id| {
        StatusListener::new(&ctx).watch(
            id,
            state.facts.category,
            state.facts.policy_reference.clone(),
            signal_tx,
        )
    });

    let mut designs: DesignSubscription = resolver.subscribe(state.facts.category).await;
    let mut designs_live = true;

    loop {
        let step = tokio::select! {
            Some(signal) = signal_rx.recv() => Step::Signal(signal),
            design = designs.next(), if designs_live => Step::Design(design),
            else => Step::Idle,
        };

        let outgoing = match step {
            Step::Idle => break,
            Step::Design(None) => {
                designs_live = false;
                continue;
            }
            Step::Design(Some(design)) => {
                if design.category != state.facts.category || design == state.design {
                    continue;
                }
                debug!(category = %design.category, version = design.version, "Design changed");
                state.design = design;
                vec![BanPageUpdate::Render(state.view())]
            }
            Step::Signal(StatusSignal::Unbanned) => {
                let redirect_to = state
                    .visitor_id
                    .map(|id| id.portfolio_path())
                    .unwrap_or_else(|| "/".to_string());
                info!(%redirect_to, "Ban lifted, redirecting");
                let _ = updates.send(BanPageUpdate::Unbanned { redirect_to }).await;
                break;
            }
            Step::Signal(StatusSignal::ConnectionLost) => {
                state.facts.connection_lost = true;
                let _ = updates.send(BanPageUpdate::ConnectionLost(state.view())).await;
                break;
            }
            Step::Signal(StatusSignal::CategoryChanged(to)) => {
                let from = state.facts.category;
                if updates
                    .send(BanPageUpdate::Transitioning { from, to })
                    .await
                    .is_err()
                {
                    break;
                }

                state.facts.category = to;
                state.design = resolver.get(to).await;
                designs = resolver.subscribe(to).await;
                designs_live = true;

                tokio::time::sleep(ctx.settle_delay()).await;
                vec![BanPageUpdate::Render(state.view())]
            }
            Step::Signal(StatusSignal::PolicyReference(reference)) => {
                state.facts.policy_reference = Some(reference);
                vec![BanPageUpdate::Render(state.view())]
            }
            Step::Signal(StatusSignal::FetchPolicyReference) => continue,
        };

        for update in outgoing {
            if updates.send(update).await.is_err() {
                debug!("Ban page closed");
                return;
            }
        }
    }
}
