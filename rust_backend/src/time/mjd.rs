//! Modified Julian Date conversion and Greenwich mean sidereal time.
//!
//! UTC is used as an approximation of UT1 throughout; the difference is below
//! a second and far under the precision the ranking needs.

use chrono::{DateTime, TimeZone, Utc};
use qtty::Degrees;

/// MJD of the J2000.0 epoch (2000-01-01 12:00 TT).
pub const MJD_J2000: f64 = 51544.5;

/// MJD of the Unix epoch (1970-01-01 00:00 UTC).
const MJD_UNIX_EPOCH: f64 = 40587.0;

const SECONDS_PER_DAY: f64 = 86400.0;

/// Convert a UTC instant to a Modified Julian Date.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use pepper_rust::time::datetime_to_mjd;
/// let t = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
/// assert_eq!(datetime_to_mjd(&t), 51544.5);
/// ```
pub fn datetime_to_mjd(dt: &DateTime<Utc>) -> f64 {
    let seconds = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9;
    MJD_UNIX_EPOCH + seconds / SECONDS_PER_DAY
}

/// Convert a Modified Julian Date to a UTC instant, rounded to the millisecond.
///
/// Returns `None` for values outside chrono's representable range.
pub fn mjd_to_datetime(mjd: f64) -> Option<DateTime<Utc>> {
    if !mjd.is_finite() {
        return None;
    }
    let millis = ((mjd - MJD_UNIX_EPOCH) * SECONDS_PER_DAY * 1000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    Utc.timestamp_millis_opt(millis as i64).single()
}

/// Julian centuries elapsed since J2000.0.
pub fn julian_centuries(mjd: f64) -> f64 {
    (mjd - MJD_J2000) / 36525.0
}

/// Greenwich mean sidereal time for the given MJD (IAU 1982 expression).
///
/// The polynomial gives GMST at 0h UT; the fraction of the day is added at the
/// sidereal rate. Result is wrapped to `[0, 360)`.
pub fn gmst(mjd: f64) -> Degrees {
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;
    // Sidereal days per solar day
    const RAP: f64 = 1.00273790934;

    let midnight = mjd.floor();
    let t = julian_centuries(midnight);

    let gmst0_seconds = ((C3 * t + C2) * t + C1) * t + C0;
    let gmst0 = gmst0_seconds / SECONDS_PER_DAY * 360.0;
    let gmst = gmst0 + (mjd - midnight) * 360.0 * RAP;

    Degrees::new(gmst.rem_euclid(360.0))
}

/// Local mean sidereal time for an east-positive longitude.
pub fn local_sidereal_time(mjd: f64, longitude: Degrees) -> Degrees {
    Degrees::new((gmst(mjd).value() + longitude.value()).rem_euclid(360.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mjd_epochs() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(datetime_to_mjd(&j2000), MJD_J2000);

        let unix = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(datetime_to_mjd(&unix), 40587.0);
    }

    #[test]
    fn test_mjd_to_datetime_inverts_conversion() {
        let t = Utc.with_ymd_and_hms(2023, 5, 4, 21, 37, 12).unwrap();
        let back = mjd_to_datetime(datetime_to_mjd(&t)).unwrap();
        assert!((back - t).num_milliseconds().abs() <= 1);

        assert!(mjd_to_datetime(f64::NAN).is_none());
    }

    #[test]
    fn test_julian_centuries() {
        assert_eq!(julian_centuries(MJD_J2000), 0.0);
        assert!((julian_centuries(MJD_J2000 + 36525.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_gmst_reference_values() {
        // 2000-01-01 00:00 UT: GMST = 6h 39m 52.27s = 99.9678 deg
        let gmst0 = gmst(51544.0);
        assert!((gmst0.value() - 99.9678).abs() < 1e-3, "got {}", gmst0.value());

        // 1987-04-10 00:00 UT: GMST = 13h 10m 46.3668s = 197.6932 deg
        let gmst1 = gmst(46895.0);
        assert!((gmst1.value() - 197.6932).abs() < 1e-3, "got {}", gmst1.value());
    }

    #[test]
    fn test_gmst_advances_at_sidereal_rate() {
        let a = gmst(60000.0).value();
        let b = gmst(60000.25).value();
        let advance = (b - a).rem_euclid(360.0);
        assert!((advance - 90.2464).abs() < 1e-3);
    }

    #[test]
    fn test_local_sidereal_time_wraps() {
        let lst = local_sidereal_time(51544.0, Degrees::new(-120.0));
        assert!((lst.value() - (99.9678 - 120.0 + 360.0)).abs() < 1e-3);
    }
}
