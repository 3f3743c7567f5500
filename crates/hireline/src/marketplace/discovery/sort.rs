use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::marketplace::error::MarketplaceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Title,
    Status,
    Applicants,
}

impl FromStr for SortField {
    type Err = MarketplaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "status" => Ok(Self::Status),
            "applicants" => Ok(Self::Applicants),
            other => Err(MarketplaceError::Validation(format!(
                "cannot sort by '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = MarketplaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(MarketplaceError::Validation(format!(
                "unknown sort direction '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::Title,
            direction: SortDirection::Asc,
        }
    }
}

impl SortSpec {
    /// Selecting the active field again flips the direction; a new field starts ascending.
    pub fn toggled(self, field: SortField) -> Self {
        if self.field == field {
            Self {
                field,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                field,
                direction: SortDirection::Asc,
            }
        }
    }
}

/// Row shape the employer sort operates on.
pub trait Sortable {
    fn title(&self) -> &str;
    fn status(&self) -> &str;
    fn applicants(&self) -> u32;
}

/// Stable sort: rows comparing equal keep their incoming order in both directions.
pub fn sort_rows<T: Sortable>(rows: &mut [T], spec: SortSpec) {
    rows.sort_by(|a, b| {
        let ordering = compare(a, b, spec.field);
        match spec.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare<T: Sortable>(a: &T, b: &T, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title().cmp(b.title()),
        SortField::Status => a.status().cmp(b.status()),
        SortField::Applicants => a.applicants().cmp(&b.applicants()),
    }
}
