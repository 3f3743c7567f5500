use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::marketplace::domain::{
    ApplicantSummary, Application, ApplicationId, ApplicationStatus, Job, JobCategory, JobId,
    JobType,
};

/// Job projection embedded in application rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub category: JobCategory,
    pub is_closed: bool,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            title: job.title.clone(),
            location: job.location.clone(),
            job_type: job.job_type,
            category: job.category,
            is_closed: job.is_closed,
        }
    }
}

/// Application joined with its job and applicant. `None` marks a reference that no longer
/// resolves (soft-deleted job, missing account).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub job: Option<JobSummary>,
    pub applicant: Option<ApplicantSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: usize,
}

/// Employer view of one job's applications.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplications {
    pub job: JobSummary,
    pub status_counts: Vec<StatusCount>,
    pub applications: Vec<ApplicationDetail>,
}

/// Seeker view of one of their own applications with the job as it is now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeekerApplication {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub job: Option<Job>,
}

impl SeekerApplication {
    pub(crate) fn new(application: Application, job: Option<Job>) -> Self {
        Self {
            id: application.id,
            status: application.status,
            created_at: application.created_at,
            updated_at: application.updated_at,
            job: job.filter(|job| !job.is_deleted()),
        }
    }
}

pub(crate) fn status_counts(applications: &[ApplicationDetail]) -> Vec<StatusCount> {
    ApplicationStatus::ordered()
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: applications
                .iter()
                .filter(|application| application.status == status)
                .count(),
        })
        .collect()
}
