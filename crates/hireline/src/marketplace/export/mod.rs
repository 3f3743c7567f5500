//! Application export: one row projection, four encoders.
//!
//! Everything here is a pure in-memory transform over rows the caller already fetched.

mod encode;
mod schema;

use std::str::FromStr;

use axum::http::StatusCode;
use mime::Mime;
use serde::{Deserialize, Serialize};

use super::applications::ApplicationDetail;
use super::error::MarketplaceError;

pub use encode::WORKSHEET_NAME;
pub use schema::{project_row, ExportSchema, APPLIED_DATE_FORMAT};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no applications to export")]
    Empty,
    #[error("export of {rows} rows exceeds the limit of {limit}")]
    TooManyRows { rows: usize, limit: usize },
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("workbook encoding failed: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

impl ExportError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Empty | Self::TooManyRows { .. } => StatusCode::BAD_REQUEST,
            Self::Csv(_) | Self::Json(_) | Self::Workbook(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    Json,
    Xlsx,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
            Self::Xlsx => "xlsx",
        }
    }

    pub fn mime(self) -> Mime {
        match self {
            Self::Csv => mime::TEXT_CSV_UTF_8,
            Self::Tsv => mime::TEXT_TAB_SEPARATED_VALUES,
            Self::Json => mime::APPLICATION_JSON,
            Self::Xlsx => XLSX_MIME
                .parse()
                .unwrap_or(mime::APPLICATION_OCTET_STREAM),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = MarketplaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(MarketplaceError::Validation(format!(
                "unsupported export format '{other}'"
            ))),
        }
    }
}

/// Encoded export ready to be written to disk or sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Encode `rows` in `format` under `schema`, rejecting empty input and anything above
/// `max_rows`.
pub fn export_applications(
    rows: &[ApplicationDetail],
    format: ExportFormat,
    schema: ExportSchema,
    max_rows: usize,
) -> Result<ExportPayload, ExportError> {
    let first = rows.first().ok_or(ExportError::Empty)?;
    if rows.len() > max_rows {
        return Err(ExportError::TooManyRows {
            rows: rows.len(),
            limit: max_rows,
        });
    }

    let headers = schema.headers();
    let cells: Vec<Vec<String>> = rows.iter().map(|row| project_row(row, schema)).collect();
    let bytes = match format {
        ExportFormat::Csv => encode::encode_csv(headers, &cells)?,
        ExportFormat::Tsv => encode::encode_tsv(headers, &cells)?,
        ExportFormat::Json => encode::encode_json(headers, &cells)?,
        ExportFormat::Xlsx => encode::encode_xlsx(headers, &cells)?,
    };

    let job = first.job.as_ref();
    Ok(ExportPayload {
        filename: export_filename(
            job.map(|job| job.title.as_str()),
            job.map(|job| job.id.as_str()),
            format,
        ),
        content_type: format.mime().to_string(),
        bytes,
    })
}

/// `Softwareengineer-<id>.csv`: whitespace, quotes, slashes and control characters removed,
/// lowercased, first letter capitalized.
pub fn export_filename(title: Option<&str>, job_id: Option<&str>, format: ExportFormat) -> String {
    let squashed: String = title
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control() && !matches!(*c, '"' | '\\' | '/'))
        .collect::<String>()
        .to_lowercase();

    let mut chars = squashed.chars();
    let stem = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Job".to_string(),
    };
    let id = job_id.filter(|id| !id.is_empty()).unwrap_or("id");

    format!("{stem}-{id}.{}", format.extension())
}
