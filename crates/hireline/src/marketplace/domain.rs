use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::MarketplaceError;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn generate() -> Self {
                static SEQUENCE: AtomicU64 = AtomicU64::new(1);
                let id = SEQUENCE.fetch_add(1, Ordering::Relaxed);
                Self(format!(concat!($prefix, "-{:06}"), id))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

entity_id!(
    /// Identifier of a registered account.
    UserId,
    "usr"
);
entity_id!(
    /// Identifier of a job posting.
    JobId,
    "job"
);
entity_id!(ApplicationId, "app");
entity_id!(SavedJobId, "sav");

/// The two mutually exclusive account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Jobseeker,
    Employer,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Jobseeker => "jobseeker",
            Self::Employer => "employer",
        }
    }
}

impl FromStr for Role {
    type Err = MarketplaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "jobseeker" => Ok(Self::Jobseeker),
            "employer" => Ok(Self::Employer),
            other => Err(MarketplaceError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// The acting user of a request, as supplied by the session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn jobseeker(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Jobseeker,
        }
    }

    pub fn employer(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Employer,
        }
    }
}

/// Account record. Seeker and employer attributes share one shape; the unused side stays empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub role: Role,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub resume: String,
    pub description: String,
    pub skills: Vec<String>,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub company_logo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: &str, email: &str, role: Role, created_at: DateTime<Utc>) -> Self {
        Self {
            id: UserId::generate(),
            name: name.to_string(),
            email: email.to_string(),
            avatar: String::new(),
            role,
            password_hash: String::new(),
            resume: String::new(),
            description: String::new(),
            skills: Vec::new(),
            company_name: None,
            company_description: None,
            company_logo: None,
            created_at,
        }
    }

    pub fn applicant_summary(&self) -> ApplicantSummary {
        ApplicantSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            resume: self.resume.clone(),
        }
    }

    pub fn company_summary(&self) -> CompanySummary {
        CompanySummary {
            id: self.id.clone(),
            name: self.name.clone(),
            company_name: self.company_name.clone().unwrap_or_default(),
            company_logo: self.company_logo.clone().unwrap_or_default(),
        }
    }
}

/// Fixed catalog of job categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobCategory {
    Engineering,
    Design,
    Marketing,
    Sales,
    #[serde(rename = "IT & Software")]
    ItSoftware,
    #[serde(rename = "Customer-service")]
    CustomerService,
    Product,
    Operations,
    Finance,
    #[serde(rename = "HR")]
    HumanResources,
    Other,
}

impl JobCategory {
    pub const fn ordered() -> [Self; 11] {
        [
            Self::Engineering,
            Self::Design,
            Self::Marketing,
            Self::Sales,
            Self::ItSoftware,
            Self::CustomerService,
            Self::Product,
            Self::Operations,
            Self::Finance,
            Self::HumanResources,
            Self::Other,
        ]
    }

    /// Stored value, also used for exact-match filtering.
    pub const fn value(self) -> &'static str {
        match self {
            Self::Engineering => "Engineering",
            Self::Design => "Design",
            Self::Marketing => "Marketing",
            Self::Sales => "Sales",
            Self::ItSoftware => "IT & Software",
            Self::CustomerService => "Customer-service",
            Self::Product => "Product",
            Self::Operations => "Operations",
            Self::Finance => "Finance",
            Self::HumanResources => "HR",
            Self::Other => "Other",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CustomerService => "Customer Service",
            Self::HumanResources => "Human Resources",
            other => other.value(),
        }
    }
}

impl FromStr for JobCategory {
    type Err = MarketplaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ordered()
            .into_iter()
            .find(|category| category.value() == trimmed)
            .ok_or_else(|| MarketplaceError::Validation(format!("unknown category '{trimmed}'")))
    }
}

/// Employment type of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    Remote,
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
    Contract,
    Internship,
}

impl JobType {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Remote,
            Self::FullTime,
            Self::PartTime,
            Self::Contract,
            Self::Internship,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Remote => "Remote",
            Self::FullTime => "Full-Time",
            Self::PartTime => "Part-Time",
            Self::Contract => "Contract",
            Self::Internship => "Internship",
        }
    }
}

impl FromStr for JobType {
    type Err = MarketplaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ordered()
            .into_iter()
            .find(|job_type| job_type.label() == trimmed)
            .ok_or_else(|| MarketplaceError::Validation(format!("unknown job type '{trimmed}'")))
    }
}

/// Job posting owned by exactly one employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub owner: UserId,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub category: JobCategory,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub location: String,
    pub salary_min: u64,
    pub salary_max: u64,
    pub is_closed: bool,
    /// Denormalized count of applications referencing this job.
    pub application_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_open(&self) -> bool {
        !self.is_closed && !self.is_deleted()
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_closed {
            "Closed"
        } else {
            "Active"
        }
    }
}

/// Review state of an application.
///
/// No transition graph: an employer may move any status to any other,
/// including back to `Applied` or onto the same status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    #[serde(rename = "In Review")]
    InReview,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Applied, Self::InReview, Self::Rejected, Self::Accepted]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::InReview => "In Review",
            Self::Rejected => "Rejected",
            Self::Accepted => "Accepted",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = MarketplaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == value.trim())
            .ok_or_else(|| MarketplaceError::InvalidStatus(value.to_string()))
    }
}

/// A seeker's application to one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub job: JobId,
    pub applicant: UserId,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A seeker's private bookmark of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJob {
    pub id: SavedJobId,
    pub job: JobId,
    pub jobseeker: UserId,
    pub created_at: DateTime<Utc>,
}

/// Applicant projection shown to employers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub resume: String,
}

/// Employer projection shown next to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: UserId,
    pub name: String,
    pub company_name: String,
    pub company_logo: String,
}
