use serde::Deserialize;

use crate::marketplace::domain::{Job, JobCategory, JobType};
use crate::marketplace::error::MarketplaceError;

/// Raw search parameters as they arrive on `GET /jobs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchParams {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub min_salary: Option<String>,
    #[serde(default)]
    pub max_salary: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub items_per_page: Option<usize>,
}

/// Normalized filter set. `None` fields do not restrict the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub category: Option<JobCategory>,
    pub job_type: Option<JobType>,
    pub min_salary: Option<u64>,
    pub max_salary: Option<u64>,
}

impl JobFilter {
    pub fn from_params(params: &JobSearchParams) -> Result<Self, MarketplaceError> {
        Ok(Self {
            keyword: non_blank(params.keyword.as_deref()).map(str::to_lowercase),
            location: non_blank(params.location.as_deref()).map(str::to_lowercase),
            category: non_blank(params.category.as_deref())
                .map(str::parse::<JobCategory>)
                .transpose()?,
            job_type: non_blank(params.job_type.as_deref())
                .map(str::parse::<JobType>)
                .transpose()?,
            min_salary: parse_salary("minSalary", params.min_salary.as_deref())?,
            max_salary: parse_salary("maxSalary", params.max_salary.as_deref())?,
        })
    }

    pub fn keyword(mut self, keyword: &str) -> Self {
        self.keyword = non_blank(Some(keyword)).map(str::to_lowercase);
        self
    }

    pub fn location(mut self, location: &str) -> Self {
        self.location = non_blank(Some(location)).map(str::to_lowercase);
        self
    }

    pub fn salary_between(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_salary = min;
        self.max_salary = max;
        self
    }

    /// Keyword checks the title and, when known, the employer's company name.
    pub fn matches(&self, job: &Job, company_name: Option<&str>) -> bool {
        if let Some(keyword) = &self.keyword {
            let in_title = job.title.to_lowercase().contains(keyword);
            let in_company =
                company_name.is_some_and(|name| name.to_lowercase().contains(keyword));
            if !in_title && !in_company {
                return false;
            }
        }

        if let Some(location) = &self.location {
            if !job.location.to_lowercase().contains(location) {
                return false;
            }
        }

        if self.category.is_some_and(|category| category != job.category) {
            return false;
        }

        if self.job_type.is_some_and(|job_type| job_type != job.job_type) {
            return false;
        }

        // Range overlap: [salary_min, salary_max] must intersect the requested bounds.
        if self.min_salary.is_some_and(|min| job.salary_max < min) {
            return false;
        }
        if self.max_salary.is_some_and(|max| job.salary_min > max) {
            return false;
        }

        true
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_salary(name: &str, raw: Option<&str>) -> Result<Option<u64>, MarketplaceError> {
    non_blank(raw)
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| MarketplaceError::Validation(format!("{name} must be a whole number")))
        })
        .transpose()
}
