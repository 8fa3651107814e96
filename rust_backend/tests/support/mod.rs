//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use qtty::Degrees;

use pepper_rust::config::{EngineConfig, SiteSettings};
use pepper_rust::core::domain::Site;
use pepper_rust::core::error::EngineResult;
use pepper_rust::ephemeris::{angular_separation, Ephemeris, Equatorial, NightBoundaries, TransitInfo};

pub const HEADER: &str = "\"objid\",\"name_prefix\",\"name\",\"ra\",\"declination\",\"typeid\",\"type\",\"discoverydate\",\"discoverymag\",\"discmagfilter\",\"internal_names\",\"lastmodified\"";

pub fn night_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 5, 4).unwrap()
}

pub fn utc(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, minute, 0).unwrap())
}

/// Ephemeris with a fixed dark window and a Moon that never moves.
///
/// A target transits `ra / 15` hours after the window opens, at an altitude
/// of `90 - |latitude - dec|`.
pub struct FixedEphemeris {
    pub boundaries: NightBoundaries,
    pub moon: Equatorial,
    pub illumination: f64,
}

impl FixedEphemeris {
    /// Dark from 22:00 to 06:00 UTC, Moon 10% illuminated at (0, -30).
    pub fn for_night(date: NaiveDate) -> Self {
        let next = date + Duration::days(1);
        Self {
            boundaries: NightBoundaries {
                sunset: utc(date, 20, 30),
                dark_start: utc(date, 22, 0),
                dark_end: utc(next, 6, 0),
                sunrise: utc(next, 7, 30),
            },
            moon: Equatorial::from_degrees(0.0, -30.0),
            illumination: 0.1,
        }
    }
}

impl Ephemeris for FixedEphemeris {
    fn night_boundaries(&self, _site: &Site, _window_start: DateTime<Utc>) -> EngineResult<NightBoundaries> {
        Ok(self.boundaries)
    }

    fn transit(&self, site: &Site, target: &Equatorial, window_start: DateTime<Utc>) -> EngineResult<TransitInfo> {
        let offset = Duration::seconds((target.ra.value() / 15.0 * 3600.0).round() as i64);
        let altitude = 90.0 - (site.latitude.value() - target.dec.value()).abs();
        Ok(TransitInfo {
            time: window_start + offset,
            altitude: Degrees::new(altitude),
        })
    }

    fn moon_separation(&self, target: &Equatorial, _epoch: DateTime<Utc>) -> Degrees {
        angular_separation(target, &self.moon)
    }

    fn moon_illumination(&self, _epoch: DateTime<Utc>) -> f64 {
        self.illumination
    }
}

/// Defaults with the site moved to (0, 0) so the night window opens at 12:00 UTC.
pub fn equator_config() -> EngineConfig {
    EngineConfig {
        site: SiteSettings {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            elevation_m: 0.0,
        },
        ..EngineConfig::default()
    }
}

/// One catalog line in [`HEADER`] order.
#[allow(clippy::too_many_arguments)]
pub fn row(
    id: &str,
    name: &str,
    ra: &str,
    dec: &str,
    discovered: &str,
    magnitude: &str,
    internal_names: &str,
    modified: &str,
) -> String {
    format!(
        "\"{id}\",\"SN\",\"{name}\",\"{ra}\",\"{dec}\",\"\",\"\",\"{discovered}\",\"{magnitude}\",\"r\",\"{internal_names}\",\"{modified}\""
    )
}

pub fn catalog_text(release: &str, rows: &[String]) -> String {
    let mut text = format!("\"{}\"\n{}\n", release, HEADER);
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Two rankable targets plus rows that must drop out for different reasons.
///
/// - `1`: bright, recent, short observable window
/// - `2`: faint, older, long observable window
/// - `3`: unparsable RA, rejected
/// - `4`: transits below the altitude floor
/// - `5`: last modified outside every recency window
/// - `6`: fainter than the magnitude bound
pub fn ranking_catalog() -> String {
    catalog_text(
        "2023-05-04 00:00:00",
        &[
            row("1", "2023aaa", "120.0", "20.0", "2023-04-30 10:00:00.000", "16.5", "ZTF23aaabbbb, ATLAS23abc", "2023-05-03 10:00:00"),
            row("2", "2023bbb", "180.0", "20.0", "2023-04-20 10:00:00.000", "18.2", "ATLAS23xyz", "2023-05-03 11:00:00"),
            row("3", "2023ccc", "not-a-number", "20.0", "2023-04-29 10:00:00.000", "17.0", "", "2023-05-03 12:00:00"),
            row("4", "2023ddd", "150.0", "-70.0", "2023-04-28 10:00:00.000", "17.0", "", "2023-05-03 12:00:00"),
            row("5", "2023eee", "160.0", "15.0", "2023-04-28 10:00:00.000", "17.0", "", "2023-03-01 12:00:00"),
            row("6", "2023fff", "160.0", "15.0", "2023-04-28 10:00:00.000", "19.0", "", "2023-05-03 12:00:00"),
        ],
    )
}

pub fn start_of(date: NaiveDate) -> chrono::NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
