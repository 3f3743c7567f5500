//! Seeker-facing job search: filter composition, per-viewer annotations and paging.

pub mod filter;
pub mod pagination;
pub mod sort;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::domain::{ApplicationStatus, CompanySummary, Job, JobId, UserId};
use super::error::MarketplaceError;
use super::store::MarketplaceStore;

pub use filter::{JobFilter, JobSearchParams};
pub use pagination::{Page, PageRequest};
pub use sort::{sort_rows, SortDirection, SortField, SortSpec, Sortable};

/// A job as shown to a (possibly anonymous) viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    #[serde(flatten)]
    pub job: Job,
    pub company: Option<CompanySummary>,
    pub is_saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_status: Option<ApplicationStatus>,
}

/// Per-viewer lookups built once per query.
#[derive(Debug, Default)]
struct ViewerContext {
    saved: Vec<JobId>,
    statuses: HashMap<JobId, ApplicationStatus>,
}

impl ViewerContext {
    fn annotate(&self, job: Job, company: Option<CompanySummary>) -> JobListing {
        JobListing {
            is_saved: self.saved.contains(&job.id),
            application_status: self.statuses.get(&job.id).copied(),
            job,
            company,
        }
    }
}

pub struct DiscoveryService<S> {
    store: Arc<S>,
}

impl<S> DiscoveryService<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Open jobs matching `filter`, newest first, annotated for `viewer` when given.
    pub fn search(
        &self,
        filter: &JobFilter,
        viewer: Option<&UserId>,
        page: PageRequest,
    ) -> Result<Page<JobListing>, MarketplaceError> {
        let context = self.viewer_context(viewer)?;
        let mut companies: HashMap<UserId, Option<CompanySummary>> = HashMap::new();

        let mut matched = Vec::new();
        for job in self.store.jobs()? {
            if !job.is_open() {
                continue;
            }
            let company = match companies.get(&job.owner) {
                Some(company) => company.clone(),
                None => {
                    let company = self
                        .store
                        .fetch_user(&job.owner)?
                        .map(|owner| owner.company_summary());
                    companies.insert(job.owner.clone(), company.clone());
                    company
                }
            };
            let company_name = company.as_ref().map(|company| company.company_name.as_str());
            if filter.matches(&job, company_name) {
                matched.push((job, company));
            }
        }

        matched.sort_by(|(a, _), (b, _)| b.created_at.cmp(&a.created_at));
        let listings = matched
            .into_iter()
            .map(|(job, company)| context.annotate(job, company))
            .collect();

        Ok(Page::slice(listings, page))
    }

    /// Single job detail. Closed jobs stay visible here; deleted ones do not.
    pub fn get_job(
        &self,
        job_id: &JobId,
        viewer: Option<&UserId>,
    ) -> Result<JobListing, MarketplaceError> {
        let job = self
            .store
            .fetch_job(job_id)?
            .filter(|job| !job.is_deleted())
            .ok_or(MarketplaceError::NotFound("job"))?;
        let company = self
            .store
            .fetch_user(&job.owner)?
            .map(|owner| owner.company_summary());
        let context = self.viewer_context(viewer)?;
        Ok(context.annotate(job, company))
    }

    fn viewer_context(&self, viewer: Option<&UserId>) -> Result<ViewerContext, MarketplaceError> {
        let Some(viewer) = viewer else {
            return Ok(ViewerContext::default());
        };

        let saved = self
            .store
            .saved_jobs_for_seeker(viewer)?
            .into_iter()
            .map(|saved| saved.job)
            .collect();
        let statuses = self
            .store
            .applications_for_applicant(viewer)?
            .into_iter()
            .map(|application| (application.job, application.status))
            .collect();

        Ok(ViewerContext { saved, statuses })
    }
}
