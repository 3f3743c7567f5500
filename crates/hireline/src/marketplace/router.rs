use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::discovery::{
    JobFilter, JobSearchParams, PageRequest, SortDirection, SortField, SortSpec,
};
use super::domain::{Actor, ApplicationId, ApplicationStatus, JobId, Role, UserId};
use super::error::MarketplaceError;
use super::export::{ExportFormat, ExportSchema};
use super::jobs::{JobDraft, JobStatusFilter, ManageJobsQuery};
use super::profiles::{MediaPayload, ProfileUpdate};
use super::store::MarketplaceStore;
use super::Marketplace;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

type SharedMarketplace<S> = Arc<Marketplace<S>>;

/// HTTP surface of the marketplace. Identity arrives as `x-user-id` / `x-user-role` headers
/// set by the session provider in front of this service.
pub fn marketplace_router<S>(marketplace: SharedMarketplace<S>) -> Router
where
    S: MarketplaceStore + 'static,
{
    Router::new()
        .route("/applications", get(list_by_job_handler::<S>))
        .route("/applications/my", get(list_by_seeker_handler::<S>))
        .route("/applications/employer", get(list_by_employer_handler::<S>))
        .route("/applications/export", get(export_handler::<S>))
        .route("/applications/:id", post(apply_handler::<S>))
        .route("/applications/:id/status", put(set_status_handler::<S>))
        .route("/saved-jobs/my", get(list_saved_handler::<S>))
        .route(
            "/saved-jobs/:id",
            post(save_handler::<S>).delete(unsave_handler::<S>),
        )
        .route("/jobs", get(search_handler::<S>).post(create_job_handler::<S>))
        .route("/jobs/employer", get(manage_jobs_handler::<S>))
        .route("/jobs/reconcile-counters", post(reconcile_handler::<S>))
        .route(
            "/jobs/:id",
            get(get_job_handler::<S>)
                .put(update_job_handler::<S>)
                .delete(delete_job_handler::<S>),
        )
        .route("/jobs/:id/toggle-close", put(toggle_closed_handler::<S>))
        .route("/dashboard/overview", get(dashboard_handler::<S>))
        .route("/users/profile", put(update_profile_handler::<S>))
        .route("/users/resume", delete(delete_resume_handler::<S>))
        .route("/users/upload/:kind", post(upload_handler::<S>))
        .route("/users/:id", get(public_profile_handler::<S>))
        .with_state(marketplace)
}

#[async_trait]
impl<St> FromRequestParts<St> for Actor
where
    St: Send + Sync,
{
    type Rejection = MarketplaceError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers)
    }
}

pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, MarketplaceError> {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let user_id = header_value(USER_ID_HEADER).ok_or(MarketplaceError::Unauthorized)?;
    let role = header_value(USER_ROLE_HEADER)
        .ok_or(MarketplaceError::Unauthorized)?
        .parse::<Role>()
        .map_err(|_| MarketplaceError::Unauthorized)?;

    Ok(Actor {
        user_id: UserId::from(user_id),
        role,
    })
}

fn require(actor: &Actor, role: Role) -> Result<(), MarketplaceError> {
    if actor.role == role {
        return Ok(());
    }
    Err(match role {
        Role::Employer => MarketplaceError::Forbidden("employer access required"),
        Role::Jobseeker => MarketplaceError::Forbidden("jobseeker access required"),
    })
}

fn parse_status(raw: Option<&str>) -> Result<Option<ApplicationStatus>, MarketplaceError> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty() && *value != "All")
        .map(str::parse::<ApplicationStatus>)
        .transpose()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplicationsQuery {
    job_id: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportQuery {
    job_id: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    schema: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManageJobsParams {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    sort: Option<String>,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    items_per_page: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadBody {
    file_name: String,
    data: String,
}

async fn apply_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
    Path(job_id): Path<String>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Jobseeker)?;
    let application = market
        .applications
        .apply(&JobId::from(job_id.as_str()), &actor.user_id)?;
    Ok((StatusCode::CREATED, Json(application)).into_response())
}

async fn set_status_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
    Path(application_id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Employer)?;
    let status = body.status.parse::<ApplicationStatus>()?;
    let application = market.applications.set_status(
        &ApplicationId::from(application_id.as_str()),
        status,
        &actor.user_id,
    )?;
    Ok(Json(application).into_response())
}

async fn list_by_job_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
    Query(query): Query<ApplicationsQuery>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Employer)?;
    let status = parse_status(query.status.as_deref())?;
    let listing = market.applications.list_by_job(
        &JobId::from(query.job_id.as_str()),
        &actor.user_id,
        status,
    )?;
    Ok(Json(listing).into_response())
}

async fn list_by_employer_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Employer)?;
    Ok(Json(market.applications.list_by_employer(&actor.user_id)?).into_response())
}

async fn list_by_seeker_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Jobseeker)?;
    Ok(Json(market.applications.list_by_seeker(&actor.user_id)?).into_response())
}

async fn export_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
    Query(query): Query<ExportQuery>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Employer)?;
    let format = match query.format.as_deref() {
        Some(raw) => raw.parse::<ExportFormat>()?,
        None => ExportFormat::default(),
    };
    let schema = match query.schema.as_deref() {
        Some(raw) => raw.parse::<ExportSchema>()?,
        None => ExportSchema::default(),
    };
    let status = parse_status(query.status.as_deref())?;

    let payload = market.export_job_applications(
        &JobId::from(query.job_id.as_str()),
        &actor.user_id,
        status,
        format,
        schema,
    )?;
    let disposition = format!("attachment; filename=\"{}\"", payload.filename);
    Ok((
        [
            (header::CONTENT_TYPE, payload.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload.bytes,
    )
        .into_response())
}

async fn save_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
    Path(job_id): Path<String>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Jobseeker)?;
    let saved = market
        .saved_jobs
        .save(&JobId::from(job_id.as_str()), &actor.user_id)?;
    Ok((StatusCode::CREATED, Json(saved)).into_response())
}

async fn unsave_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
    Path(job_id): Path<String>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Jobseeker)?;
    market
        .saved_jobs
        .unsave(&JobId::from(job_id.as_str()), &actor.user_id)?;
    Ok(Json(json!({ "message": "job removed from saved list" })).into_response())
}

async fn list_saved_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Jobseeker)?;
    Ok(Json(market.saved_jobs.list_by_seeker(&actor.user_id)?).into_response())
}

async fn search_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Option<Actor>,
    Query(params): Query<JobSearchParams>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    let filter = JobFilter::from_params(&params)?;
    let page = market.page_request(params.page, params.items_per_page)?;
    let viewer = params
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(UserId::from)
        .or_else(|| actor.map(|actor| actor.user_id));

    let results = market.discovery.search(&filter, viewer.as_ref(), page)?;
    Ok(Json(results).into_response())
}

async fn get_job_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Option<Actor>,
    Path(job_id): Path<String>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    let viewer = actor.map(|actor| actor.user_id);
    let listing = market
        .discovery
        .get_job(&JobId::from(job_id.as_str()), viewer.as_ref())?;
    Ok(Json(listing).into_response())
}

async fn create_job_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
    Json(draft): Json<JobDraft>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Employer)?;
    let job = market.jobs.create_job(&actor.user_id, draft)?;
    Ok((StatusCode::CREATED, Json(job)).into_response())
}

async fn update_job_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
    Path(job_id): Path<String>,
    Json(draft): Json<JobDraft>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Employer)?;
    let job = market
        .jobs
        .update_job(&JobId::from(job_id.as_str()), &actor.user_id, draft)?;
    Ok(Json(job).into_response())
}

async fn delete_job_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
    Path(job_id): Path<String>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Employer)?;
    market
        .jobs
        .delete_job(&JobId::from(job_id.as_str()), &actor.user_id)?;
    Ok(Json(json!({ "message": "job deleted" })).into_response())
}

async fn toggle_closed_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
    Path(job_id): Path<String>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Employer)?;
    let job = market
        .jobs
        .toggle_closed(&JobId::from(job_id.as_str()), &actor.user_id)?;
    Ok(Json(job).into_response())
}

async fn manage_jobs_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
    Query(params): Query<ManageJobsParams>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Employer)?;
    let defaults = ManageJobsQuery::default();
    let field = match params.sort.as_deref() {
        Some(raw) => raw.parse::<SortField>()?,
        None => defaults.sort.field,
    };
    let direction = match params.direction.as_deref() {
        Some(raw) => raw.parse::<SortDirection>()?,
        None => defaults.sort.direction,
    };
    let query = ManageJobsQuery {
        search: params.search,
        status: match params.status.as_deref() {
            Some(raw) => raw.parse::<JobStatusFilter>()?,
            None => JobStatusFilter::All,
        },
        sort: SortSpec { field, direction },
        page: PageRequest::new(
            params.page.unwrap_or(1),
            params
                .items_per_page
                .unwrap_or(defaults.page.items_per_page),
        )?,
    };

    Ok(Json(market.jobs.list_employer_jobs(&actor.user_id, &query)?).into_response())
}

async fn reconcile_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Employer)?;
    let repaired: Vec<_> = market
        .jobs
        .reconcile_counters(&actor.user_id)?
        .into_iter()
        .map(|(job_id, repair)| {
            json!({
                "jobId": job_id,
                "previous": repair.previous,
                "actual": repair.actual,
            })
        })
        .collect();
    Ok(Json(json!({ "repaired": repaired })).into_response())
}

async fn dashboard_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    require(&actor, Role::Employer)?;
    Ok(Json(market.dashboard_overview(&actor.user_id)?).into_response())
}

async fn update_profile_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
    Json(update): Json<ProfileUpdate>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    Ok(Json(market.profiles.update_profile(&actor.user_id, update)?).into_response())
}

async fn delete_resume_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    market.profiles.delete_resume(&actor.user_id)?;
    Ok(Json(json!({ "message": "resume deleted" })).into_response())
}

async fn upload_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    actor: Actor,
    Path(kind): Path<String>,
    Json(body): Json<UploadBody>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    let payload = MediaPayload::Base64(body.data);
    let profiles = &market.profiles;
    let media = match kind.as_str() {
        "resume" => profiles.upload_resume(&actor.user_id, payload, &body.file_name)?,
        "avatar" => profiles.upload_avatar(&actor.user_id, payload, &body.file_name)?,
        "logo" => profiles.upload_company_logo(&actor.user_id, payload, &body.file_name)?,
        _ => return Err(MarketplaceError::NotFound("upload target")),
    };
    Ok((StatusCode::CREATED, Json(media)).into_response())
}

async fn public_profile_handler<S>(
    State(market): State<SharedMarketplace<S>>,
    Path(user_id): Path<String>,
) -> Result<Response, MarketplaceError>
where
    S: MarketplaceStore + 'static,
{
    let user = market.profiles.public_profile(&UserId::from(user_id.as_str()))?;
    Ok(Json(user).into_response())
}
