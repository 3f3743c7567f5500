//! Application lifecycle: applying, duplicate prevention, employer status changes and the
//! joined views employers and seekers read back.

pub mod service;
pub mod views;

pub use service::ApplicationService;
pub(crate) use service::join_detail;
pub use views::{ApplicationDetail, JobApplications, JobSummary, SeekerApplication, StatusCount};
