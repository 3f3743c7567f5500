use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::clock::Clock;
use super::domain::{CompanySummary, Job, JobId, Role, SavedJob, SavedJobId, UserId};
use super::error::MarketplaceError;
use super::store::{MarketplaceStore, StoreError};

/// Saved job joined with the job and its employer's company summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJobView {
    pub id: SavedJobId,
    pub saved_at: DateTime<Utc>,
    pub job: Option<Job>,
    pub company: Option<CompanySummary>,
}

/// Bookmark management for jobseekers.
pub struct SavedJobService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> SavedJobService<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Bookmark a job. A second save of the same pair is reported, not ignored.
    pub fn save(&self, job_id: &JobId, seeker: &UserId) -> Result<SavedJob, MarketplaceError> {
        let user = self
            .store
            .fetch_user(seeker)?
            .ok_or(MarketplaceError::NotFound("user"))?;
        if user.role != Role::Jobseeker {
            return Err(MarketplaceError::Forbidden("only jobseekers can save jobs"));
        }
        self.store
            .fetch_job(job_id)?
            .filter(|job| !job.is_deleted())
            .ok_or(MarketplaceError::NotFound("job"))?;

        if self.store.find_saved_job(job_id, seeker)?.is_some() {
            return Err(MarketplaceError::AlreadySaved);
        }

        let saved = SavedJob {
            id: SavedJobId::generate(),
            job: job_id.clone(),
            jobseeker: seeker.clone(),
            created_at: self.clock.now(),
        };

        match self.store.insert_saved_job(saved) {
            Ok(saved) => {
                info!(job_id = %job_id, seeker = %seeker, "job saved");
                Ok(saved)
            }
            Err(StoreError::Conflict) => {
                warn!(job_id = %job_id, seeker = %seeker, "concurrent duplicate save rejected by index");
                Err(MarketplaceError::AlreadySaved)
            }
            Err(err) => Err(MarketplaceError::Persistence(err)),
        }
    }

    pub fn unsave(&self, job_id: &JobId, seeker: &UserId) -> Result<(), MarketplaceError> {
        match self.store.delete_saved_job(job_id, seeker)? {
            Some(_) => {
                info!(job_id = %job_id, seeker = %seeker, "job removed from saved list");
                Ok(())
            }
            None => Err(MarketplaceError::NotFound("saved job")),
        }
    }

    pub fn list_by_seeker(&self, seeker: &UserId) -> Result<Vec<SavedJobView>, MarketplaceError> {
        let mut views = Vec::new();
        for saved in self.store.saved_jobs_for_seeker(seeker)? {
            let job = self
                .store
                .fetch_job(&saved.job)?
                .filter(|job| !job.is_deleted());
            let company = match &job {
                Some(job) => self
                    .store
                    .fetch_user(&job.owner)?
                    .map(|owner| owner.company_summary()),
                None => None,
            };
            views.push(SavedJobView {
                id: saved.id,
                saved_at: saved.created_at,
                job,
                company,
            });
        }
        Ok(views)
    }
}
