use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::marketplace::applications::ApplicationDetail;
use crate::marketplace::error::MarketplaceError;

pub const APPLIED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

const FULL_HEADERS: [&str; 10] = [
    "Job ID",
    "Job Title",
    "Applicant Name",
    "Applicant Email",
    "Applied Date",
    "Status",
    "Resume URL",
    "Location",
    "Type",
    "Category",
];

const MINIMAL_HEADERS: [&str; 5] = [
    "Applicant Name",
    "Applicant Email",
    "Applied Date",
    "Status",
    "Resume URL",
];

/// Column projection shared by every encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportSchema {
    #[default]
    Full,
    Minimal,
}

impl ExportSchema {
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Self::Full => &FULL_HEADERS,
            Self::Minimal => &MINIMAL_HEADERS,
        }
    }
}

impl FromStr for ExportSchema {
    type Err = MarketplaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "minimal" => Ok(Self::Minimal),
            other => Err(MarketplaceError::Validation(format!(
                "unknown export schema '{other}'"
            ))),
        }
    }
}

/// Cells of one application, in the order of `schema.headers()`. Missing joins become
/// empty cells.
pub fn project_row(row: &ApplicationDetail, schema: ExportSchema) -> Vec<String> {
    let applicant = row.applicant.as_ref();
    let name = applicant.map(|a| a.name.clone()).unwrap_or_default();
    let email = applicant.map(|a| a.email.clone()).unwrap_or_default();
    let resume = applicant.map(|a| a.resume.clone()).unwrap_or_default();
    let applied = row.created_at.format(APPLIED_DATE_FORMAT).to_string();
    let status = row.status.label().to_string();

    match schema {
        ExportSchema::Minimal => vec![name, email, applied, status, resume],
        ExportSchema::Full => {
            let job = row.job.as_ref();
            vec![
                job.map(|j| j.id.to_string()).unwrap_or_default(),
                job.map(|j| j.title.clone()).unwrap_or_default(),
                name,
                email,
                applied,
                status,
                resume,
                job.map(|j| j.location.clone()).unwrap_or_default(),
                job.map(|j| j.job_type.label().to_string()).unwrap_or_default(),
                job.map(|j| j.category.value().to_string()).unwrap_or_default(),
            ]
        }
    }
}
