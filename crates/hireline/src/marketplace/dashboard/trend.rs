use chrono::{DateTime, Duration, Utc};

/// Two adjacent comparison windows ending at `now`: current is `[now - span, now)`,
/// prior is `[now - 2 * span, now - span)`. A start that falls outside the representable
/// time range leaves that window empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendWindows {
    now: DateTime<Utc>,
    current_start: Option<DateTime<Utc>>,
    prior_start: Option<DateTime<Utc>>,
}

impl TrendWindows {
    pub fn new(now: DateTime<Utc>, days: i64) -> Self {
        let span = Duration::try_days(days.max(1));
        let current_start = span.and_then(|span| now.checked_sub_signed(span));
        let prior_start = span
            .zip(current_start)
            .and_then(|(span, boundary)| boundary.checked_sub_signed(span));
        Self {
            now,
            current_start,
            prior_start,
        }
    }

    pub fn in_current(&self, at: DateTime<Utc>) -> bool {
        self.current_start
            .is_some_and(|start| at >= start && at < self.now)
    }

    pub fn in_prior(&self, at: DateTime<Utc>) -> bool {
        match (self.prior_start, self.current_start) {
            (Some(start), Some(boundary)) => at >= start && at < boundary,
            _ => false,
        }
    }

    /// Counts timestamps falling in each window, returning `(current, prior)`.
    pub fn tally<I>(&self, stamps: I) -> (usize, usize)
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        stamps
            .into_iter()
            .fold((0, 0), |(current, prior), at| {
                if self.in_current(at) {
                    (current + 1, prior)
                } else if self.in_prior(at) {
                    (current, prior + 1)
                } else {
                    (current, prior)
                }
            })
    }
}

/// Whole-number percentage change from `prior` to `current`. Zero when there is no baseline.
pub fn trend_percent(current: usize, prior: usize) -> i64 {
    if prior == 0 {
        return 0;
    }
    let delta = current as f64 - prior as f64;
    ((delta / prior as f64) * 100.0).round() as i64
}
