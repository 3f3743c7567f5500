use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::config::MarketplaceConfig;
use crate::marketplace::clock::{Clock, ManualClock};
use crate::marketplace::domain::{
    Application, ApplicationId, Job, JobId, Role, SavedJob, User, UserId,
};
use crate::marketplace::jobs::JobDraft;
use crate::marketplace::memory::InMemoryStore;
use crate::marketplace::profiles::InMemoryUploader;
use crate::marketplace::router::{marketplace_router, USER_ID_HEADER, USER_ROLE_HEADER};
use crate::marketplace::store::{MarketplaceStore, StoreError};
use crate::marketplace::Marketplace;

pub(super) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid date")
}

pub(super) struct Fixture<S> {
    pub(super) market: Arc<Marketplace<S>>,
    pub(super) store: Arc<S>,
    pub(super) clock: Arc<ManualClock>,
    pub(super) employer: User,
    pub(super) seeker: User,
}

impl<S> Fixture<S> {
    pub(super) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

pub(super) fn fixture() -> Fixture<InMemoryStore> {
    fixture_with(InMemoryStore::new(), MarketplaceConfig::default())
}

pub(super) fn fixture_with<S>(store: S, config: MarketplaceConfig) -> Fixture<S>
where
    S: MarketplaceStore + 'static,
{
    let store = Arc::new(store);
    let clock = Arc::new(ManualClock::new(start()));
    let market = Arc::new(Marketplace::new(
        store.clone(),
        clock.clone() as Arc<dyn Clock>,
        Arc::new(InMemoryUploader::new("https://cdn.test")),
        config,
    ));

    let employer = employer_account(store.as_ref(), "Erin Employer", "Acme Corp");
    let seeker = seeker_account(store.as_ref(), "Sam Seeker");

    Fixture {
        market,
        store,
        clock,
        employer,
        seeker,
    }
}

pub(super) fn employer_account<S: MarketplaceStore>(store: &S, name: &str, company: &str) -> User {
    let mut user = User::new(name, &email_for(name), Role::Employer, start());
    user.company_name = Some(company.to_string());
    user.company_logo = Some(format!("https://cdn.test/{}.png", company.to_lowercase()));
    store.insert_user(user).expect("insert employer")
}

pub(super) fn seeker_account<S: MarketplaceStore>(store: &S, name: &str) -> User {
    let mut user = User::new(name, &email_for(name), Role::Jobseeker, start());
    user.resume = format!("https://cdn.test/{}.pdf", name.to_lowercase().replace(' ', "-"));
    store.insert_user(user).expect("insert seeker")
}

fn email_for(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase().replace(' ', "."))
}

pub(super) fn draft(title: &str, salary_min: u64, salary_max: u64) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        description: "Build and run the platform.".to_string(),
        requirements: "Three years of experience.".to_string(),
        category: "Engineering".to_string(),
        job_type: "Full-Time".to_string(),
        location: "Berlin".to_string(),
        salary_min,
        salary_max,
    }
}

pub(super) fn post_job<S>(fixture: &Fixture<S>, title: &str) -> Job
where
    S: MarketplaceStore + 'static,
{
    fixture
        .market
        .jobs
        .create_job(&fixture.employer.id, draft(title, 50_000, 70_000))
        .expect("create job")
}

pub(super) fn router<S>(fixture: &Fixture<S>) -> Router
where
    S: MarketplaceStore + 'static,
{
    marketplace_router(fixture.market.clone())
}

pub(super) fn request(
    method: Method,
    uri: &str,
    actor: Option<&User>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = actor {
        builder = builder
            .header(USER_ID_HEADER, user.id.as_str())
            .header(USER_ROLE_HEADER, user.role.label());
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(axum::http::header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).expect("serialize body"))
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request")
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Fault {
    /// Every call fails as if the backing store were down.
    Unavailable,
    /// Only the application counter update fails.
    CounterFails,
    /// Existence lookups miss, so a concurrent duplicate reaches the unique index.
    RaceOnInsert,
}

/// In-memory store with a switchable fault.
#[derive(Default)]
pub(super) struct FaultyStore {
    inner: InMemoryStore,
    fault: Mutex<Option<Fault>>,
}

impl FaultyStore {
    pub(super) fn set_fault(&self, fault: Fault) {
        *self.fault.lock().expect("fault mutex") = Some(fault);
    }

    fn fault(&self) -> Option<Fault> {
        *self.fault.lock().expect("fault mutex")
    }

    fn check(&self) -> Result<(), StoreError> {
        match self.fault() {
            Some(Fault::Unavailable) => Err(StoreError::Unavailable("connection refused".to_string())),
            _ => Ok(()),
        }
    }
}

impl MarketplaceStore for FaultyStore {
    fn insert_user(&self, user: User) -> Result<User, StoreError> {
        self.check()?;
        self.inner.insert_user(user)
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.check()?;
        self.inner.fetch_user(id)
    }

    fn update_user(&self, user: User) -> Result<(), StoreError> {
        self.check()?;
        self.inner.update_user(user)
    }

    fn insert_job(&self, job: Job) -> Result<Job, StoreError> {
        self.check()?;
        self.inner.insert_job(job)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        self.check()?;
        self.inner.fetch_job(id)
    }

    fn update_job(&self, job: Job) -> Result<(), StoreError> {
        self.check()?;
        self.inner.update_job(job)
    }

    fn jobs(&self) -> Result<Vec<Job>, StoreError> {
        self.check()?;
        self.inner.jobs()
    }

    fn jobs_by_owner(&self, owner: &UserId) -> Result<Vec<Job>, StoreError> {
        self.check()?;
        self.inner.jobs_by_owner(owner)
    }

    fn increment_application_count(&self, id: &JobId) -> Result<u32, StoreError> {
        self.check()?;
        if self.fault() == Some(Fault::CounterFails) {
            return Err(StoreError::Unavailable("counter write timed out".to_string()));
        }
        self.inner.increment_application_count(id)
    }

    fn set_application_count(&self, id: &JobId, count: u32) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set_application_count(id, count)
    }

    fn insert_application(&self, application: Application) -> Result<Application, StoreError> {
        self.check()?;
        self.inner.insert_application(application)
    }

    fn fetch_application(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        self.check()?;
        self.inner.fetch_application(id)
    }

    fn update_application(&self, application: Application) -> Result<(), StoreError> {
        self.check()?;
        self.inner.update_application(application)
    }

    fn find_application(
        &self,
        job: &JobId,
        applicant: &UserId,
    ) -> Result<Option<Application>, StoreError> {
        self.check()?;
        if self.fault() == Some(Fault::RaceOnInsert) {
            return Ok(None);
        }
        self.inner.find_application(job, applicant)
    }

    fn applications_for_job(&self, job: &JobId) -> Result<Vec<Application>, StoreError> {
        self.check()?;
        self.inner.applications_for_job(job)
    }

    fn applications_for_applicant(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<Application>, StoreError> {
        self.check()?;
        self.inner.applications_for_applicant(applicant)
    }

    fn insert_saved_job(&self, saved: SavedJob) -> Result<SavedJob, StoreError> {
        self.check()?;
        self.inner.insert_saved_job(saved)
    }

    fn find_saved_job(
        &self,
        job: &JobId,
        jobseeker: &UserId,
    ) -> Result<Option<SavedJob>, StoreError> {
        self.check()?;
        if self.fault() == Some(Fault::RaceOnInsert) {
            return Ok(None);
        }
        self.inner.find_saved_job(job, jobseeker)
    }

    fn delete_saved_job(
        &self,
        job: &JobId,
        jobseeker: &UserId,
    ) -> Result<Option<SavedJob>, StoreError> {
        self.check()?;
        self.inner.delete_saved_job(job, jobseeker)
    }

    fn saved_jobs_for_seeker(&self, jobseeker: &UserId) -> Result<Vec<SavedJob>, StoreError> {
        self.check()?;
        self.inner.saved_jobs_for_seeker(jobseeker)
    }

    fn delete_saved_jobs_for_job(&self, job: &JobId) -> Result<usize, StoreError> {
        self.check()?;
        self.inner.delete_saved_jobs_for_job(job)
    }
}
