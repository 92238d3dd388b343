//! HTML pages
//!
//! The portfolio, the ban page, and the appeal form.

use askama::Template;
use axum::{
    extract::{Query, RawQuery, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use folio_core::{BanCategory, CategoryClassifier, VisitorId};
use folio_service::dto::AppealRequest;
use folio_service::{
    render_ban_page, AppealService, BanPageOrchestrator, BanPageParams, BanPageQuery, VisitorService,
};

use crate::extractors::VisitorPath;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Portfolio beacon period
const PORTFOLIO_HEARTBEAT_MS: u64 = 30_000;

/// Remembers the visitor id so `/` keeps returning the same one
pub const VISITOR_COOKIE: &str = "folio_visitor";

/// Marks a redirect to a freshly generated id; the page may swap in a stored one
const ASSIGNED_MARKER: &str = "assigned=1";

// ============================================================================
// Templates
// ============================================================================

#[derive(Template)]
#[template(path = "portfolio.html")]
struct PortfolioTemplate<'a> {
    title: &'a str,
    visitor_id: VisitorId,
    heartbeat_ms: u64,
}

#[derive(Template)]
#[template(path = "appeal.html")]
struct AppealTemplate<'a> {
    visitor_id: &'a str,
    ban_reason: &'a str,
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
    error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "appeal_submitted.html")]
struct AppealSubmittedTemplate<'a> {
    appeal_id: String,
    processing_time: &'a str,
}

fn render(template: &impl Template) -> ApiResult<Html<String>> {
    template.render().map(Html).map_err(ApiError::internal)
}

// ============================================================================
// Portfolio
// ============================================================================

/// Returning visitors keep their id; everyone else gets a fresh one
///
/// GET /
pub async fn index(jar: CookieJar) -> Redirect {
    let known = jar
        .get(VISITOR_COOKIE)
        .and_then(|cookie| cookie.value().parse::<VisitorId>().ok());

    match known {
        Some(visitor_id) => Redirect::to(&visitor_id.portfolio_path()),
        None => Redirect::to(&format!(
            "{}?{ASSIGNED_MARKER}",
            VisitorId::generate().portfolio_path()
        )),
    }
}

fn visitor_cookie(visitor_id: VisitorId) -> Cookie<'static> {
    Cookie::build((VISITOR_COOKIE, visitor_id.to_string()))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(true)
        .permanent()
        .build()
}

/// Portfolio for a visitor; banned visitors go straight to their ban page
///
/// GET /{visitor_id}
pub async fn portfolio(
    State(state): State<AppState>,
    VisitorPath(visitor_id): VisitorPath,
    jar: CookieJar,
) -> ApiResult<Response> {
    let jar = jar.add(visitor_cookie(visitor_id));
    let status = VisitorService::new(state.service_context())
        .status_or_active(visitor_id)
        .await;

    if let Some(redirect_to) = status.redirect_to.as_deref().filter(|_| status.is_banned()) {
        return Ok((jar, Redirect::to(redirect_to)).into_response());
    }

    let page = render(&PortfolioTemplate {
        title: &state.config().app.name,
        visitor_id,
        heartbeat_ms: PORTFOLIO_HEARTBEAT_MS,
    })?;
    Ok((jar, page).into_response())
}

// ============================================================================
// Ban page
// ============================================================================

/// Ban page for a visitor
///
/// GET /ban/{visitor_id}?reason=&policyReference=&category=&severity=
pub async fn ban_page(
    State(state): State<AppState>,
    VisitorPath(visitor_id): VisitorPath,
    RawQuery(raw): RawQuery,
    Query(query): Query<BanPageQuery>,
) -> ApiResult<Html<String>> {
    render_ban(&state, Some(visitor_id), raw, &query).await
}

/// Ban page without a visitor id; follows design changes only
///
/// GET /ban
pub async fn anonymous_ban_page(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    Query(query): Query<BanPageQuery>,
) -> ApiResult<Html<String>> {
    render_ban(&state, None, raw, &query).await
}

async fn render_ban(
    state: &AppState,
    visitor_id: Option<VisitorId>,
    raw_query: Option<String>,
    query: &BanPageQuery,
) -> ApiResult<Html<String>> {
    let params = BanPageParams::from_query(visitor_id, query);
    let view = BanPageOrchestrator::new(state.service_context())
        .initial_view(&params)
        .await;

    let live_url = state.live_url(visitor_id, raw_query.as_deref());
    let html = render_ban_page(
        &view,
        Some(&live_url),
        state.config().ban_page.heartbeat_interval_ms,
    )?;
    Ok(Html(html))
}

// ============================================================================
// Appeal
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct AppealFormQuery {
    pub visitor: Option<String>,
    pub reason: Option<String>,
}

/// Appeal form
///
/// GET /appeal?visitor=&reason=
pub async fn appeal_form(Query(query): Query<AppealFormQuery>) -> ApiResult<Html<String>> {
    render(&AppealTemplate {
        visitor_id: query.visitor.as_deref().unwrap_or_default(),
        ban_reason: query.reason.as_deref().unwrap_or_default(),
        name: "",
        email: "",
        subject: "",
        message: "",
        error: None,
    })
}

/// Submit the appeal form; invalid input re-renders the form
///
/// POST /appeal
pub async fn submit_appeal_form(
    State(state): State<AppState>,
    Form(request): Form<AppealRequest>,
) -> ApiResult<Response> {
    match AppealService::new(state.service_context())
        .submit(request.clone())
        .await
    {
        Ok(response) => {
            let category = request
                .ban_reason
                .as_deref()
                .map(CategoryClassifier::from_reason)
                .unwrap_or(BanCategory::Normal);
            let page = render(&AppealSubmittedTemplate {
                appeal_id: response.id.to_string(),
                processing_time: CategoryClassifier::appeal_processing_time(category),
            })?;
            Ok(page.into_response())
        }
        Err(e) if e.status_code() == 400 => {
            let message = e.to_string();
            let page = render(&AppealTemplate {
                visitor_id: &request.visitor_id,
                ban_reason: request.ban_reason.as_deref().unwrap_or_default(),
                name: &request.name,
                email: &request.email,
                subject: &request.subject,
                message: &request.message,
                error: Some(&message),
            })?;
            Ok((axum::http::StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
