use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::domain::{Application, ApplicationId, Job, JobId, SavedJob, User, UserId};
use super::store::{MarketplaceStore, StoreError};

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeMap<UserId, User>,
    jobs: BTreeMap<JobId, Job>,
    applications: BTreeMap<ApplicationId, Application>,
    saved_jobs: Vec<SavedJob>,
    application_index: HashSet<(JobId, UserId)>,
    saved_index: HashSet<(JobId, UserId)>,
}

/// Process-local store backing the API binary and the test suites.
///
/// The (job, applicant) and (job, jobseeker) sets act as the unique indexes; they are checked
/// and updated under the same lock as the insert they guard.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl MarketplaceStore for InMemoryStore {
    fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut state = self.state()?;
        let email_taken = state
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email));
        if state.users.contains_key(&user.id) || email_taken {
            return Err(StoreError::Conflict);
        }
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state()?.users.get(id).cloned())
    }

    fn update_user(&self, user: User) -> Result<(), StoreError> {
        let mut state = self.state()?;
        match state.users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn insert_job(&self, job: Job) -> Result<Job, StoreError> {
        let mut state = self.state()?;
        if state.jobs.contains_key(&job.id) {
            return Err(StoreError::Conflict);
        }
        state.jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.state()?.jobs.get(id).cloned())
    }

    fn update_job(&self, job: Job) -> Result<(), StoreError> {
        let mut state = self.state()?;
        match state.jobs.get_mut(&job.id) {
            Some(slot) => {
                *slot = job;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.state()?.jobs.values().cloned().collect())
    }

    fn jobs_by_owner(&self, owner: &UserId) -> Result<Vec<Job>, StoreError> {
        Ok(self
            .state()?
            .jobs
            .values()
            .filter(|job| &job.owner == owner)
            .cloned()
            .collect())
    }

    fn increment_application_count(&self, id: &JobId) -> Result<u32, StoreError> {
        let mut state = self.state()?;
        let job = state.jobs.get_mut(id).ok_or(StoreError::NotFound)?;
        job.application_count = job.application_count.saturating_add(1);
        Ok(job.application_count)
    }

    fn set_application_count(&self, id: &JobId, count: u32) -> Result<(), StoreError> {
        let mut state = self.state()?;
        let job = state.jobs.get_mut(id).ok_or(StoreError::NotFound)?;
        job.application_count = count;
        Ok(())
    }

    fn insert_application(&self, application: Application) -> Result<Application, StoreError> {
        let mut state = self.state()?;
        let key = (application.job.clone(), application.applicant.clone());
        if state.applications.contains_key(&application.id)
            || state.application_index.contains(&key)
        {
            return Err(StoreError::Conflict);
        }
        state.application_index.insert(key);
        state
            .applications
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn fetch_application(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        Ok(self.state()?.applications.get(id).cloned())
    }

    fn update_application(&self, application: Application) -> Result<(), StoreError> {
        let mut state = self.state()?;
        match state.applications.get_mut(&application.id) {
            Some(slot) if slot.job == application.job && slot.applicant == application.applicant => {
                *slot = application;
                Ok(())
            }
            // Rewriting the pair would bypass the unique index.
            Some(_) => Err(StoreError::Conflict),
            None => Err(StoreError::NotFound),
        }
    }

    fn find_application(
        &self,
        job: &JobId,
        applicant: &UserId,
    ) -> Result<Option<Application>, StoreError> {
        Ok(self
            .state()?
            .applications
            .values()
            .find(|application| &application.job == job && &application.applicant == applicant)
            .cloned())
    }

    fn applications_for_job(&self, job: &JobId) -> Result<Vec<Application>, StoreError> {
        Ok(self
            .state()?
            .applications
            .values()
            .filter(|application| &application.job == job)
            .cloned()
            .collect())
    }

    fn applications_for_applicant(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<Application>, StoreError> {
        Ok(self
            .state()?
            .applications
            .values()
            .filter(|application| &application.applicant == applicant)
            .cloned()
            .collect())
    }

    fn insert_saved_job(&self, saved: SavedJob) -> Result<SavedJob, StoreError> {
        let mut state = self.state()?;
        let key = (saved.job.clone(), saved.jobseeker.clone());
        if !state.saved_index.insert(key) {
            return Err(StoreError::Conflict);
        }
        state.saved_jobs.push(saved.clone());
        Ok(saved)
    }

    fn find_saved_job(
        &self,
        job: &JobId,
        jobseeker: &UserId,
    ) -> Result<Option<SavedJob>, StoreError> {
        Ok(self
            .state()?
            .saved_jobs
            .iter()
            .find(|saved| &saved.job == job && &saved.jobseeker == jobseeker)
            .cloned())
    }

    fn delete_saved_job(
        &self,
        job: &JobId,
        jobseeker: &UserId,
    ) -> Result<Option<SavedJob>, StoreError> {
        let mut state = self.state()?;
        let position = state
            .saved_jobs
            .iter()
            .position(|saved| &saved.job == job && &saved.jobseeker == jobseeker);
        let Some(position) = position else {
            return Ok(None);
        };
        let removed = state.saved_jobs.remove(position);
        state
            .saved_index
            .remove(&(removed.job.clone(), removed.jobseeker.clone()));
        Ok(Some(removed))
    }

    fn saved_jobs_for_seeker(&self, jobseeker: &UserId) -> Result<Vec<SavedJob>, StoreError> {
        Ok(self
            .state()?
            .saved_jobs
            .iter()
            .filter(|saved| &saved.jobseeker == jobseeker)
            .cloned()
            .collect())
    }

    fn delete_saved_jobs_for_job(&self, job: &JobId) -> Result<usize, StoreError> {
        let mut state = self.state()?;
        let before = state.saved_jobs.len();
        state.saved_jobs.retain(|saved| &saved.job != job);
        state.saved_index.retain(|(indexed_job, _)| indexed_job != job);
        Ok(before - state.saved_jobs.len())
    }
}
