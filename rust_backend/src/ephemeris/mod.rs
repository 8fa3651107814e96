//! Ephemeris service seam.
//!
//! The ranking engine only needs a handful of astronomical primitives: the
//! night's twilight boundaries, a target's meridian transit, the Moon's
//! position and phase, and the galactic frame. They are expressed by the
//! [`Ephemeris`] trait so that a high-precision service can replace the
//! built-in [`analytic::LowPrecisionEphemeris`].

pub mod analytic;
pub mod galactic;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use qtty::Degrees;

use crate::core::domain::Site;
use crate::core::error::EngineResult;

pub use analytic::LowPrecisionEphemeris;
pub use galactic::{equatorial_to_galactic, Galactic};

/// Equatorial (ICRS) direction in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equatorial {
    pub ra: Degrees,
    pub dec: Degrees,
}

impl Equatorial {
    pub fn new(ra: Degrees, dec: Degrees) -> Self {
        Self { ra, dec }
    }

    pub fn from_degrees(ra_deg: f64, dec_deg: f64) -> Self {
        Self::new(Degrees::new(ra_deg), Degrees::new(dec_deg))
    }
}

/// Solar events bounding one observing night, all UTC.
///
/// `sunset <= dark_start <= dark_end <= sunrise`. When the Sun never reaches
/// astronomical twilight depth, `dark_start == dark_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightBoundaries {
    pub sunset: DateTime<Utc>,
    pub dark_start: DateTime<Utc>,
    pub dark_end: DateTime<Utc>,
    pub sunrise: DateTime<Utc>,
}

/// Upper meridian transit of a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitInfo {
    pub time: DateTime<Utc>,
    pub altitude: Degrees,
}

/// Astronomical primitives consumed by the visibility stage.
///
/// Implementations must be shareable across the worker threads that evaluate
/// targets in parallel.
pub trait Ephemeris: Send + Sync {
    /// Twilight boundaries of the night inside the 24 h window opening at
    /// `window_start`.
    fn night_boundaries(&self, site: &Site, window_start: DateTime<Utc>) -> EngineResult<NightBoundaries>;

    /// First upper transit of `target` after `window_start`.
    fn transit(&self, site: &Site, target: &Equatorial, window_start: DateTime<Utc>) -> EngineResult<TransitInfo>;

    /// Angular distance between `target` and the Moon at `epoch`.
    fn moon_separation(&self, target: &Equatorial, epoch: DateTime<Utc>) -> Degrees;

    /// Illuminated fraction of the lunar disc at `epoch`, in `[0, 1]`.
    fn moon_illumination(&self, epoch: DateTime<Utc>) -> f64;

    /// Galactic coordinates of `target`.
    fn galactic(&self, target: &Equatorial) -> Galactic {
        equatorial_to_galactic(target)
    }
}

/// Opening of the 24 h window a night is searched in: local mean solar noon
/// of `night_date`.
pub fn night_window_start(site: &Site, night_date: NaiveDate) -> DateTime<Utc> {
    let noon = night_date.and_time(NaiveTime::MIN) + Duration::hours(12);
    let offset_seconds = (site.longitude.value() / 15.0 * 3600.0).round() as i64;
    Utc.from_utc_datetime(&noon) - Duration::seconds(offset_seconds)
}

/// Great-circle distance between two directions (Vincenty formula).
pub fn angular_separation(a: &Equatorial, b: &Equatorial) -> Degrees {
    let (sin_d1, cos_d1) = a.dec.sin_cos();
    let (sin_d2, cos_d2) = b.dec.sin_cos();
    let (sin_dra, cos_dra) = (b.ra - a.ra).sin_cos();

    let num_x = cos_d2 * sin_dra;
    let num_y = cos_d1 * sin_d2 - sin_d1 * cos_d2 * cos_dra;
    let den = sin_d1 * sin_d2 + cos_d1 * cos_d2 * cos_dra;

    Degrees::new(num_x.hypot(num_y).atan2(den).to_degrees())
}
