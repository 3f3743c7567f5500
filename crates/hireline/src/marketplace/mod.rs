//! Job marketplace core: applications, saved jobs, discovery, employer dashboards and
//! application exports over a pluggable entity store.

pub mod applications;
pub mod clock;
pub mod dashboard;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod export;
pub mod jobs;
pub mod memory;
pub mod profiles;
pub mod router;
pub mod saved;
pub mod store;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::config::MarketplaceConfig;

pub use applications::{ApplicationDetail, ApplicationService, JobApplications, SeekerApplication};
pub use clock::{Clock, ManualClock, SystemClock};
pub use dashboard::{DashboardOverview, DashboardService, DashboardSettings};
pub use discovery::{DiscoveryService, JobFilter, JobListing, Page, PageRequest};
pub use domain::{
    Actor, Application, ApplicationId, ApplicationStatus, Job, JobCategory, JobId, JobType,
    Role, SavedJob, User, UserId,
};
pub use error::MarketplaceError;
pub use export::{export_applications, ExportError, ExportFormat, ExportPayload, ExportSchema};
pub use jobs::{JobDraft, JobService, ManageJobsQuery, ManagedJobRow};
pub use memory::InMemoryStore;
pub use profiles::{InMemoryUploader, MediaUploader, ProfileService, ProfileUpdate};
pub use router::marketplace_router;
pub use saved::{SavedJobService, SavedJobView};
pub use store::{MarketplaceStore, StoreError};

/// Every marketplace service wired to one shared store.
pub struct Marketplace<S> {
    pub applications: ApplicationService<S>,
    pub saved_jobs: SavedJobService<S>,
    pub discovery: DiscoveryService<S>,
    pub jobs: JobService<S>,
    pub dashboard: DashboardService<S>,
    pub profiles: ProfileService<S>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: MarketplaceConfig,
}

impl<S> Marketplace<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        uploader: Arc<dyn MediaUploader>,
        config: MarketplaceConfig,
    ) -> Self {
        let settings = DashboardSettings {
            trend_window_days: config.trend_window_days,
            recent_limit: config.recent_limit,
        };
        Self {
            applications: ApplicationService::new(store.clone(), clock.clone()),
            saved_jobs: SavedJobService::new(store.clone(), clock.clone()),
            discovery: DiscoveryService::new(store.clone()),
            jobs: JobService::new(store.clone(), clock.clone()),
            dashboard: DashboardService::new(store.clone(), settings),
            profiles: ProfileService::new(store.clone(), uploader),
            store,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Dashboard for `employer` as of the marketplace clock.
    pub fn dashboard_overview(
        &self,
        employer: &UserId,
    ) -> Result<DashboardOverview, MarketplaceError> {
        self.dashboard.overview(employer, self.clock.now())
    }

    /// Page request using the configured discovery page size when none is given.
    pub fn page_request(
        &self,
        page: Option<usize>,
        items_per_page: Option<usize>,
    ) -> Result<PageRequest, MarketplaceError> {
        PageRequest::new(
            page.unwrap_or(1),
            items_per_page.unwrap_or(self.config.discovery_page_size),
        )
    }

    /// Export the applications of one owned job, optionally narrowed to a status.
    pub fn export_job_applications(
        &self,
        job_id: &JobId,
        employer: &UserId,
        status: Option<ApplicationStatus>,
        format: ExportFormat,
        schema: ExportSchema,
    ) -> Result<ExportPayload, MarketplaceError> {
        let listing = self.applications.list_by_job(job_id, employer, status)?;
        let payload = export_applications(
            &listing.applications,
            format,
            schema,
            self.config.export_max_rows,
        )?;
        tracing::info!(
            job_id = %job_id,
            rows = listing.applications.len(),
            format = format.extension(),
            filename = %payload.filename,
            "applications exported"
        );
        Ok(payload)
    }
}
