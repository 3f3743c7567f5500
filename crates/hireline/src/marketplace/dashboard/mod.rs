//! Employer dashboard: headline counts, period-over-period trends and recent activity.

mod palette;
mod trend;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::applications::{join_detail, ApplicationDetail};
use super::domain::{ApplicationStatus, Job, UserId};
use super::error::MarketplaceError;
use super::store::MarketplaceStore;

pub use palette::{palette_for, CardColor, PALETTE};
pub use trend::{trend_percent, TrendWindows};

/// Window length and list sizes used by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub trend_window_days: i64,
    pub recent_limit: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            trend_window_days: 30,
            recent_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTrends {
    pub active_jobs: i64,
    pub total_applicants: i64,
    pub total_hired: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub total_active_jobs: usize,
    pub total_applications: usize,
    pub total_hired: usize,
    pub trends: DashboardTrends,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub recent_jobs: Vec<Job>,
    pub recent_applications: Vec<ApplicationDetail>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub counts: DashboardCounts,
    pub data: RecentActivity,
    pub palette: [CardColor; 3],
}

pub struct DashboardService<S> {
    store: Arc<S>,
    settings: DashboardSettings,
}

impl<S> DashboardService<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, settings: DashboardSettings) -> Self {
        Self { store, settings }
    }

    /// Best-effort snapshot for one employer as of `now`. Soft-deleted jobs and their
    /// applications are left out.
    pub fn overview(
        &self,
        employer: &UserId,
        now: DateTime<Utc>,
    ) -> Result<DashboardOverview, MarketplaceError> {
        let windows = TrendWindows::new(now, self.settings.trend_window_days);

        let jobs: Vec<Job> = self
            .store
            .jobs_by_owner(employer)?
            .into_iter()
            .filter(|job| !job.is_deleted())
            .collect();

        let mut applications = Vec::new();
        for job in &jobs {
            for application in self.store.applications_for_job(&job.id)? {
                applications.push((application, job));
            }
        }

        let active: Vec<&Job> = jobs.iter().filter(|job| !job.is_closed).collect();
        let hired: Vec<_> = applications
            .iter()
            .filter(|(application, _)| application.status == ApplicationStatus::Accepted)
            .collect();

        let (active_now, active_before) = windows.tally(active.iter().map(|job| job.created_at));
        let (applied_now, applied_before) = windows.tally(
            applications
                .iter()
                .map(|(application, _)| application.created_at),
        );
        let (hired_now, hired_before) =
            windows.tally(hired.iter().map(|(application, _)| application.updated_at));

        let counts = DashboardCounts {
            total_active_jobs: active.len(),
            total_applications: applications.len(),
            total_hired: hired.len(),
            trends: DashboardTrends {
                active_jobs: trend_percent(active_now, active_before),
                total_applicants: trend_percent(applied_now, applied_before),
                total_hired: trend_percent(hired_now, hired_before),
            },
        };

        let limit = self.settings.recent_limit;
        let mut recent_jobs = jobs.clone();
        recent_jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_jobs.truncate(limit);

        applications.sort_by(|(a, _), (b, _)| b.updated_at.cmp(&a.updated_at));
        let mut recent_applications = Vec::with_capacity(limit.min(applications.len()));
        for (application, job) in applications.into_iter().take(limit) {
            recent_applications.push(join_detail(self.store.as_ref(), application, Some(job))?);
        }

        Ok(DashboardOverview {
            counts,
            data: RecentActivity {
                recent_jobs,
                recent_applications,
            },
            palette: palette_for(employer),
        })
    }
}
