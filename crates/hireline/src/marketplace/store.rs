use super::domain::{Application, ApplicationId, Job, JobId, SavedJob, User, UserId};

/// Error enumeration for storage failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A unique index rejected the write.
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence boundary for the four marketplace collections.
///
/// Implementations must enforce two unique indexes: one application per (job, applicant)
/// and one saved job per (job, jobseeker). Inserts violating them fail with
/// [`StoreError::Conflict`]; services rely on this rather than on their own pre-checks.
pub trait MarketplaceStore: Send + Sync {
    fn insert_user(&self, user: User) -> Result<User, StoreError>;
    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;
    fn update_user(&self, user: User) -> Result<(), StoreError>;

    fn insert_job(&self, job: Job) -> Result<Job, StoreError>;
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, StoreError>;
    fn update_job(&self, job: Job) -> Result<(), StoreError>;
    /// Every job, soft-deleted ones included, in insertion order.
    fn jobs(&self) -> Result<Vec<Job>, StoreError>;
    fn jobs_by_owner(&self, owner: &UserId) -> Result<Vec<Job>, StoreError>;
    /// Atomically bumps the denormalized counter and returns the new value.
    fn increment_application_count(&self, id: &JobId) -> Result<u32, StoreError>;
    fn set_application_count(&self, id: &JobId, count: u32) -> Result<(), StoreError>;

    fn insert_application(&self, application: Application) -> Result<Application, StoreError>;
    fn fetch_application(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError>;
    fn update_application(&self, application: Application) -> Result<(), StoreError>;
    fn find_application(
        &self,
        job: &JobId,
        applicant: &UserId,
    ) -> Result<Option<Application>, StoreError>;
    fn applications_for_job(&self, job: &JobId) -> Result<Vec<Application>, StoreError>;
    fn applications_for_applicant(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<Application>, StoreError>;

    fn insert_saved_job(&self, saved: SavedJob) -> Result<SavedJob, StoreError>;
    fn find_saved_job(
        &self,
        job: &JobId,
        jobseeker: &UserId,
    ) -> Result<Option<SavedJob>, StoreError>;
    /// Removes the bookmark for the pair, returning it when one existed.
    fn delete_saved_job(
        &self,
        job: &JobId,
        jobseeker: &UserId,
    ) -> Result<Option<SavedJob>, StoreError>;
    fn saved_jobs_for_seeker(&self, jobseeker: &UserId) -> Result<Vec<SavedJob>, StoreError>;
    fn delete_saved_jobs_for_job(&self, job: &JobId) -> Result<usize, StoreError>;

    fn count_applications_for_job(&self, job: &JobId) -> Result<usize, StoreError> {
        Ok(self.applications_for_job(job)?.len())
    }
}
