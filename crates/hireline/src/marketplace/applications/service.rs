use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, warn};

use super::views::{status_counts, ApplicationDetail, JobApplications, JobSummary, SeekerApplication};
use crate::marketplace::clock::Clock;
use crate::marketplace::domain::{
    Application, ApplicationId, ApplicationStatus, Job, JobId, Role, UserId,
};
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::store::{MarketplaceStore, StoreError};

/// Owns applying, duplicate prevention and employer status changes.
pub struct ApplicationService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> ApplicationService<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create an `Applied` application and bump the job's application counter.
    pub fn apply(&self, job_id: &JobId, seeker: &UserId) -> Result<Application, MarketplaceError> {
        let user = self
            .store
            .fetch_user(seeker)?
            .ok_or(MarketplaceError::NotFound("user"))?;
        if user.role != Role::Jobseeker {
            return Err(MarketplaceError::Forbidden("only jobseekers can apply to jobs"));
        }

        let job = self
            .store
            .fetch_job(job_id)?
            .filter(|job| !job.is_deleted())
            .ok_or(MarketplaceError::NotFound("job"))?;
        if job.is_closed {
            return Err(MarketplaceError::Validation(
                "job is closed to new applications".to_string(),
            ));
        }

        if self.store.find_application(job_id, seeker)?.is_some() {
            return Err(MarketplaceError::DuplicateApplication);
        }

        let now = self.clock.now();
        let application = Application {
            id: ApplicationId::generate(),
            job: job.id.clone(),
            applicant: seeker.clone(),
            status: ApplicationStatus::Applied,
            created_at: now,
            updated_at: now,
        };

        let stored = match self.store.insert_application(application) {
            Ok(stored) => stored,
            Err(StoreError::Conflict) => {
                warn!(job_id = %job_id, seeker = %seeker, "concurrent duplicate application rejected by index");
                return Err(MarketplaceError::DuplicateApplication);
            }
            Err(err) => return Err(MarketplaceError::Persistence(err)),
        };

        let count = self.store.increment_application_count(job_id).map_err(|err| {
            error!(job_id = %job_id, application_id = %stored.id, error = %err, "application stored but counter update failed");
            MarketplaceError::Persistence(err)
        })?;

        info!(job_id = %job_id, seeker = %seeker, application_id = %stored.id, application_count = count, "application submitted");
        Ok(stored)
    }

    /// Overwrite the status of an application on one of the employer's jobs.
    ///
    /// Any status may follow any other; re-applying the current status still refreshes
    /// `updated_at`.
    pub fn set_status(
        &self,
        application_id: &ApplicationId,
        status: ApplicationStatus,
        employer: &UserId,
    ) -> Result<Application, MarketplaceError> {
        let mut application = self
            .store
            .fetch_application(application_id)?
            .ok_or(MarketplaceError::NotFound("application"))?;

        let owned = self
            .store
            .fetch_job(&application.job)?
            .is_some_and(|job| &job.owner == employer);
        if !owned {
            return Err(MarketplaceError::NotFound("application"));
        }

        let previous = application.status;
        application.status = status;
        application.updated_at = self.clock.now();
        self.store.update_application(application.clone())?;

        info!(application_id = %application_id, from = %previous, to = %status, "application status updated");
        Ok(application)
    }

    /// Applications for one owned job, optionally narrowed to a status.
    pub fn list_by_job(
        &self,
        job_id: &JobId,
        employer: &UserId,
        status: Option<ApplicationStatus>,
    ) -> Result<JobApplications, MarketplaceError> {
        let job = self
            .store
            .fetch_job(job_id)?
            .filter(|job| &job.owner == employer && !job.is_deleted())
            .ok_or(MarketplaceError::NotFound("job"))?;

        let mut applications = Vec::new();
        for application in self.store.applications_for_job(job_id)? {
            applications.push(self.detail(application, Some(&job))?);
        }
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let status_counts = status_counts(&applications);
        if let Some(status) = status {
            applications.retain(|application| application.status == status);
        }

        Ok(JobApplications {
            job: JobSummary::from(&job),
            status_counts,
            applications,
        })
    }

    /// Every application across the employer's live jobs, newest first.
    pub fn list_by_employer(
        &self,
        employer: &UserId,
    ) -> Result<Vec<ApplicationDetail>, MarketplaceError> {
        let mut details = Vec::new();
        for job in self.store.jobs_by_owner(employer)? {
            if job.is_deleted() {
                continue;
            }
            for application in self.store.applications_for_job(&job.id)? {
                details.push(self.detail(application, Some(&job))?);
            }
        }
        details.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(details)
    }

    /// The seeker's own applications, each with the job as it currently stands.
    pub fn list_by_seeker(
        &self,
        seeker: &UserId,
    ) -> Result<Vec<SeekerApplication>, MarketplaceError> {
        let mut jobs: HashMap<JobId, Option<Job>> = HashMap::new();
        let mut views = Vec::new();
        for application in self.store.applications_for_applicant(seeker)? {
            let job = match jobs.get(&application.job) {
                Some(job) => job.clone(),
                None => {
                    let job = self.store.fetch_job(&application.job)?;
                    jobs.insert(application.job.clone(), job.clone());
                    job
                }
            };
            views.push(SeekerApplication::new(application, job));
        }
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(views)
    }

    fn detail(
        &self,
        application: Application,
        job: Option<&Job>,
    ) -> Result<ApplicationDetail, MarketplaceError> {
        join_detail(self.store.as_ref(), application, job)
    }
}

/// Joins an application with its applicant summary and, unless soft-deleted, its job.
pub(crate) fn join_detail<S>(
    store: &S,
    application: Application,
    job: Option<&Job>,
) -> Result<ApplicationDetail, MarketplaceError>
where
    S: MarketplaceStore + ?Sized,
{
    let applicant = store
        .fetch_user(&application.applicant)?
        .map(|user| user.applicant_summary());
    let job = job.filter(|job| !job.is_deleted()).map(JobSummary::from);

    Ok(ApplicationDetail {
        id: application.id,
        status: application.status,
        created_at: application.created_at,
        updated_at: application.updated_at,
        job,
        applicant,
    })
}
