use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::clock::Clock;
use super::discovery::{sort_rows, Page, PageRequest, SortSpec, Sortable};
use super::domain::{Job, JobCategory, JobId, JobType, Role, UserId};
use super::error::MarketplaceError;
use super::store::MarketplaceStore;

/// Employer-supplied job fields, validated before they reach the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub category: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub location: String,
    pub salary_min: u64,
    pub salary_max: u64,
}

struct ValidDraft {
    title: String,
    description: String,
    requirements: String,
    category: JobCategory,
    job_type: JobType,
    location: String,
    salary_min: u64,
    salary_max: u64,
}

impl JobDraft {
    fn validate(self) -> Result<ValidDraft, MarketplaceError> {
        let title = required("title", self.title)?;
        let description = required("description", self.description)?;
        let requirements = required("requirements", self.requirements)?;
        let location = required("location", self.location)?;
        let category = JobCategory::from_str(&self.category)?;
        let job_type = JobType::from_str(&self.job_type)?;
        if self.salary_min >= self.salary_max {
            return Err(MarketplaceError::Validation(
                "salaryMin must be lower than salaryMax".to_string(),
            ));
        }

        Ok(ValidDraft {
            title,
            description,
            requirements,
            category,
            job_type,
            location,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
        })
    }
}

fn required(field: &str, value: String) -> Result<String, MarketplaceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MarketplaceError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Status filter of the employer job table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatusFilter {
    #[default]
    All,
    Active,
    Closed,
}

impl FromStr for JobStatusFilter {
    type Err = MarketplaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "All" => Ok(Self::All),
            "Active" => Ok(Self::Active),
            "Closed" => Ok(Self::Closed),
            other => Err(MarketplaceError::Validation(format!(
                "unknown job status filter '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManageJobsQuery {
    pub search: Option<String>,
    pub status: JobStatusFilter,
    pub sort: SortSpec,
    pub page: PageRequest,
}

impl Default for ManageJobsQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: JobStatusFilter::All,
            sort: SortSpec::default(),
            page: PageRequest {
                current_page: 1,
                items_per_page: 15,
            },
        }
    }
}

/// Row of the employer job-management table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedJobRow {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub status: &'static str,
    pub applicants: u32,
    pub created_at: DateTime<Utc>,
}

impl Sortable for ManagedJobRow {
    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> &str {
        self.status
    }

    fn applicants(&self) -> u32 {
        self.applicants
    }
}

/// Result of a counter repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterRepair {
    pub previous: u32,
    pub actual: u32,
}

impl CounterRepair {
    pub fn drifted(&self) -> bool {
        self.previous != self.actual
    }
}

/// Employer-side job lifecycle.
pub struct JobService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> JobService<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn create_job(&self, employer: &UserId, draft: JobDraft) -> Result<Job, MarketplaceError> {
        let owner = self
            .store
            .fetch_user(employer)?
            .ok_or(MarketplaceError::NotFound("user"))?;
        if owner.role != Role::Employer {
            return Err(MarketplaceError::Forbidden("only employers can post jobs"));
        }

        let draft = draft.validate()?;
        let now = self.clock.now();
        let job = Job {
            id: JobId::generate(),
            owner: employer.clone(),
            title: draft.title,
            description: draft.description,
            requirements: draft.requirements,
            category: draft.category,
            job_type: draft.job_type,
            location: draft.location,
            salary_min: draft.salary_min,
            salary_max: draft.salary_max,
            is_closed: false,
            application_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let job = self.store.insert_job(job)?;
        info!(job_id = %job.id, employer = %employer, "job posted");
        Ok(job)
    }

    /// Replace the editable fields. The owner never changes.
    pub fn update_job(
        &self,
        job_id: &JobId,
        employer: &UserId,
        draft: JobDraft,
    ) -> Result<Job, MarketplaceError> {
        let mut job = self.owned_job(job_id, employer)?;
        let draft = draft.validate()?;

        job.title = draft.title;
        job.description = draft.description;
        job.requirements = draft.requirements;
        job.category = draft.category;
        job.job_type = draft.job_type;
        job.location = draft.location;
        job.salary_min = draft.salary_min;
        job.salary_max = draft.salary_max;
        job.updated_at = self.clock.now();

        self.store.update_job(job.clone())?;
        info!(job_id = %job_id, "job updated");
        Ok(job)
    }

    pub fn toggle_closed(&self, job_id: &JobId, employer: &UserId) -> Result<Job, MarketplaceError> {
        let mut job = self.owned_job(job_id, employer)?;
        job.is_closed = !job.is_closed;
        job.updated_at = self.clock.now();
        self.store.update_job(job.clone())?;
        info!(job_id = %job_id, is_closed = job.is_closed, "job status toggled");
        Ok(job)
    }

    /// Soft delete: the job is hidden everywhere, bookmarks go, applications stay.
    pub fn delete_job(&self, job_id: &JobId, employer: &UserId) -> Result<(), MarketplaceError> {
        let mut job = self.owned_job(job_id, employer)?;
        let now = self.clock.now();
        job.deleted_at = Some(now);
        job.updated_at = now;
        self.store.update_job(job)?;
        let removed = self.store.delete_saved_jobs_for_job(job_id)?;
        info!(job_id = %job_id, saved_jobs_removed = removed, "job deleted");
        Ok(())
    }

    /// Recount applications for one job and overwrite the denormalized counter.
    pub fn recompute_application_count(
        &self,
        job_id: &JobId,
    ) -> Result<CounterRepair, MarketplaceError> {
        let job = self
            .store
            .fetch_job(job_id)?
            .ok_or(MarketplaceError::NotFound("job"))?;
        let actual = u32::try_from(self.store.count_applications_for_job(job_id)?)
            .unwrap_or(u32::MAX);
        let repair = CounterRepair {
            previous: job.application_count,
            actual,
        };
        if repair.drifted() {
            self.store.set_application_count(job_id, actual)?;
            warn!(job_id = %job_id, previous = repair.previous, actual, "application counter drift repaired");
        }
        Ok(repair)
    }

    /// Repair every job the employer owns, returning the jobs that had drifted.
    pub fn reconcile_counters(
        &self,
        employer: &UserId,
    ) -> Result<Vec<(JobId, CounterRepair)>, MarketplaceError> {
        let mut drifted = Vec::new();
        for job in self.store.jobs_by_owner(employer)? {
            let repair = self.recompute_application_count(&job.id)?;
            if repair.drifted() {
                drifted.push((job.id, repair));
            }
        }
        Ok(drifted)
    }

    /// The employer's job table: search, status filter, stable sort, page.
    pub fn list_employer_jobs(
        &self,
        employer: &UserId,
        query: &ManageJobsQuery,
    ) -> Result<Page<ManagedJobRow>, MarketplaceError> {
        let company = self
            .store
            .fetch_user(employer)?
            .and_then(|owner| owner.company_name)
            .unwrap_or_default();
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(str::to_lowercase);

        let mut rows: Vec<ManagedJobRow> = self
            .store
            .jobs_by_owner(employer)?
            .into_iter()
            .filter(|job| !job.is_deleted())
            .filter(|job| match query.status {
                JobStatusFilter::All => true,
                JobStatusFilter::Active => !job.is_closed,
                JobStatusFilter::Closed => job.is_closed,
            })
            .filter(|job| match &search {
                Some(search) => {
                    job.title.to_lowercase().contains(search)
                        || company.to_lowercase().contains(search)
                }
                None => true,
            })
            .map(|job| ManagedJobRow {
                status: job.status_label(),
                id: job.id,
                title: job.title,
                company: company.clone(),
                applicants: job.application_count,
                created_at: job.created_at,
            })
            .collect();

        sort_rows(&mut rows, query.sort);
        Ok(Page::slice(rows, query.page))
    }

    fn owned_job(&self, job_id: &JobId, employer: &UserId) -> Result<Job, MarketplaceError> {
        self.store
            .fetch_job(job_id)?
            .filter(|job| &job.owner == employer && !job.is_deleted())
            .ok_or(MarketplaceError::NotFound("job"))
    }
}
