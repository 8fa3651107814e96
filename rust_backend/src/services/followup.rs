//! Follow-up target selection from a persisted priority list.

use std::collections::HashSet;

use log::info;

use crate::io::writers::PriorityListRow;

/// Pick the targets to request follow-up observations for.
///
/// Blacklisted display names are dropped first. If the best remaining score
/// is below `max_score` every row scoring at most `max_score` is kept,
/// otherwise only the best row is.
pub fn select_followup_targets(
    rows: &[PriorityListRow],
    blacklist: &HashSet<String>,
    max_score: f64,
) -> Vec<PriorityListRow> {
    let candidates: Vec<&PriorityListRow> = rows
        .iter()
        .filter(|row| !blacklist.contains(&row.display_name()))
        .collect();

    let best = candidates
        .iter()
        .map(|row| row.priority_score)
        .fold(f64::INFINITY, f64::min);

    let selected: Vec<PriorityListRow> = if best < max_score {
        candidates
            .into_iter()
            .filter(|row| row.priority_score <= max_score)
            .cloned()
            .collect()
    } else {
        candidates.into_iter().take(1).cloned().collect()
    };

    info!(
        "Selected {} of {} targets for follow-up",
        selected.len(),
        rows.len()
    );
    selected
}

/// Right ascension as `HH:MM:SS.SS`.
pub fn format_ra_hms(ra_deg: f64) -> String {
    let centiseconds = (ra_deg.rem_euclid(360.0) / 15.0 * 360_000.0).round() as u64 % (24 * 360_000);
    let (hours, rest) = (centiseconds / 360_000, centiseconds % 360_000);
    let (minutes, rest) = (rest / 6_000, rest % 6_000);
    format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, rest / 100, rest % 100)
}

/// Declination as `+DD:MM:SS.SS`.
pub fn format_dec_dms(dec_deg: f64) -> String {
    let sign = if dec_deg < 0.0 { '-' } else { '+' };
    let centiseconds = (dec_deg.abs() * 360_000.0).round() as u64;
    let (degrees, rest) = (centiseconds / 360_000, centiseconds % 360_000);
    let (minutes, rest) = (rest / 6_000, rest % 6_000);
    format!(
        "{}{:02}:{:02}:{:02}.{:02}",
        sign,
        degrees,
        minutes,
        rest / 100,
        rest % 100
    )
}
