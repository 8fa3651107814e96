//! Catch-up planning for the catalog mirror.
//!
//! Upstream publishes one delta file per day. A mirror that fell behind by a
//! few days replays them in order; one that fell too far behind is replaced by
//! a full download instead.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Largest gap, in days, that is closed by replaying deltas.
pub const MAX_CATCH_UP_DAYS: i64 = 25;

/// Name of the delta file published for `date`.
pub fn delta_file_name(date: NaiveDate) -> String {
    format!("tns_public_objects_{}.csv", date.format("%Y%m%d"))
}

/// One delta file to apply and the release timestamp it brings the mirror to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStep {
    pub delta_date: NaiveDate,
    pub file_name: String,
    pub stamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePlan {
    UpToDate,
    /// Replay these deltas in order.
    ApplyDeltas(Vec<UpdateStep>),
    /// Too far behind; the whole catalog has to be fetched again.
    FullRefresh { days_behind: i64 },
}

/// Plan how to bring a snapshot released at `release` up to `today`.
pub fn plan_update(release: NaiveDateTime, today: NaiveDate) -> UpdatePlan {
    let days_behind = (today.and_time(NaiveTime::MIN) - release).num_days();

    if days_behind <= 0 {
        return UpdatePlan::UpToDate;
    }
    if days_behind > MAX_CATCH_UP_DAYS {
        return UpdatePlan::FullRefresh { days_behind };
    }

    let first = release.date();
    let steps = (0..days_behind)
        .map(|i| {
            let delta_date = first + Duration::days(i);
            UpdateStep {
                delta_date,
                file_name: delta_file_name(delta_date),
                stamp: (delta_date + Duration::days(1)).and_time(NaiveTime::MIN),
            }
        })
        .collect();
    UpdatePlan::ApplyDeltas(steps)
}
