//! # folio-service
//!
//! Application layer: services over the document repositories, the design
//! resolver, the visitor status listener, and the ban page orchestrator.

pub mod ban_page;
pub mod dto;
pub mod services;

pub use ban_page::{
    render_ban_page, render_ban_panel, BanPageOrchestrator, BanPageParams, BanPageQuery,
    BanPageSession, BanPageUpdate, BanPageView,
};
pub use services::{
    AdminAuthService, AppealService, Backends, DesignCache, DesignResolver, DesignSubscription,
    ListenerHandle, ModerationService, PolicyReferenceService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, StatusHandler, StatusListener,
    StatusSignal, StatusTracker, VisitorService,
};
