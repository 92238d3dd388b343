//! Data transfer objects for API requests and responses

pub mod requests;
pub mod responses;

pub use requests::{
    AdminLoginRequest, AppealRequest, BanVisitorRequest, ClassifyQuery, HeartbeatRequest,
    ListVisitorsQuery, TrackVisitRequest, UpdateNotesRequest, UpsertDesignRequest,
};
pub use responses::{
    AppealResponse, ClassificationResponse, HealthChecks, HealthResponse, PolicyReferenceResponse,
    ReadinessResponse, VisitorStatusResponse,
};
