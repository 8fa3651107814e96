//! Built-in low-precision ephemeris.
//!
//! Sun: Astronomical Almanac low-precision formulae (about 0.01 deg).
//! Moon: truncated lunar series (a few tenths of a degree, geocentric).
//! Sidereal time: IAU 1982 GMST. Site elevation and refraction beyond the
//! standard -0.833 deg sunset altitude are ignored.

use chrono::{DateTime, Utc};
use log::debug;
use nalgebra::{Rotation3, Vector3};
use qtty::Degrees;

use crate::core::domain::Site;
use crate::core::error::{EngineError, EngineResult};
use crate::ephemeris::{angular_separation, Ephemeris, Equatorial, NightBoundaries, TransitInfo};
use crate::time::{datetime_to_mjd, julian_centuries, local_sidereal_time, mjd_to_datetime, MJD_J2000};

/// Sun altitude at sunset and sunrise (refraction plus semi-diameter).
pub const SUNSET_ALTITUDE_DEG: f64 = -0.833;
/// Sun altitude bounding astronomical darkness.
pub const DARK_ALTITUDE_DEG: f64 = -18.0;

const SAMPLES_PER_DAY: usize = 288;
const BISECTION_TOLERANCE_DAYS: f64 = 1.0 / 86400.0;
/// Sidereal rotation of the Earth in degrees per solar day.
const SIDEREAL_RATE_DEG_PER_DAY: f64 = 360.985_647_366_29;

/// Analytic Sun and Moon model good to well under the resolution the
/// ranking thresholds need.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowPrecisionEphemeris;

impl LowPrecisionEphemeris {
    pub fn new() -> Self {
        Self
    }

    /// Apparent geocentric position of the Sun.
    pub fn sun_position(&self, mjd: f64) -> Equatorial {
        let d = mjd - MJD_J2000;
        let g = Degrees::new(357.529 + 0.985_600_28 * d);
        let q = 280.459 + 0.985_647_36 * d;
        let lambda = q + 1.915 * g.sin() + 0.020 * (g * 2.0).sin();
        ecliptic_to_equatorial(lambda, 0.0, obliquity(mjd))
    }

    /// Geocentric position of the Moon.
    pub fn moon_position(&self, mjd: f64) -> Equatorial {
        let t = julian_centuries(mjd);
        let term = |phase: f64, rate: f64| Degrees::new(phase + rate * t).sin();

        let lambda = 218.32 + 481_267.881 * t + 6.29 * term(135.0, 477_198.87)
            - 1.27 * term(259.3, -413_335.36)
            + 0.66 * term(235.7, 890_534.22)
            + 0.21 * term(269.9, 954_397.74)
            - 0.19 * term(357.5, 35_999.05)
            - 0.11 * term(186.5, 966_404.03);
        let beta = 5.13 * term(93.3, 483_202.02) + 0.28 * term(228.2, 960_400.89)
            - 0.28 * term(318.3, 6_003.15)
            - 0.17 * term(217.6, -407_332.21);

        ecliptic_to_equatorial(lambda, beta, obliquity(mjd))
    }

    /// Geometric altitude of `target` above the site's horizon.
    pub fn altitude(&self, site: &Site, target: &Equatorial, mjd: f64) -> Degrees {
        let hour_angle = local_sidereal_time(mjd, site.longitude) - target.ra;
        let (sin_lat, cos_lat) = site.latitude.sin_cos();
        let (sin_dec, cos_dec) = target.dec.sin_cos();

        let sin_alt = sin_lat * sin_dec + cos_lat * cos_dec * hour_angle.cos();
        Degrees::new(sin_alt.clamp(-1.0, 1.0).asin().to_degrees())
    }

    fn sun_altitude(&self, site: &Site, mjd: f64) -> f64 {
        self.altitude(site, &self.sun_position(mjd), mjd).value()
    }

    /// Refine a bracketed crossing of `threshold` to one second.
    fn bisect(&self, site: &Site, mut lo: f64, mut hi: f64, threshold: f64) -> f64 {
        let above_at_lo = self.sun_altitude(site, lo) >= threshold;
        while hi - lo > BISECTION_TOLERANCE_DAYS {
            let mid = 0.5 * (lo + hi);
            if (self.sun_altitude(site, mid) >= threshold) == above_at_lo {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }

    /// First instant at or after `samples[from]` with the Sun below `threshold`,
    /// with the index of the first sample past it.
    fn descent(&self, site: &Site, samples: &[(f64, f64)], from: usize, threshold: f64) -> Option<(usize, f64)> {
        let (t0, alt0) = *samples.get(from)?;
        if alt0 < threshold {
            return Some((from, t0));
        }
        samples
            .windows(2)
            .enumerate()
            .skip(from)
            .find(|(_, w)| w[0].1 >= threshold && w[1].1 < threshold)
            .map(|(i, w)| (i + 1, self.bisect(site, w[0].0, w[1].0, threshold)))
    }

    /// First instant after `samples[from]` with the Sun rising through `threshold`.
    fn ascent(&self, site: &Site, samples: &[(f64, f64)], from: usize, threshold: f64) -> Option<(usize, f64)> {
        samples
            .windows(2)
            .enumerate()
            .skip(from)
            .find(|(_, w)| w[0].1 < threshold && w[1].1 >= threshold)
            .map(|(i, w)| (i + 1, self.bisect(site, w[0].0, w[1].0, threshold)))
    }
}

impl Ephemeris for LowPrecisionEphemeris {
    fn night_boundaries(&self, site: &Site, window_start: DateTime<Utc>) -> EngineResult<NightBoundaries> {
        let start = datetime_to_mjd(&window_start);
        let end = start + 1.0;
        let step = 1.0 / SAMPLES_PER_DAY as f64;
        let samples: Vec<(f64, f64)> = (0..=SAMPLES_PER_DAY)
            .map(|i| {
                let t = start + i as f64 * step;
                (t, self.sun_altitude(site, t))
            })
            .collect();

        let (sunset_idx, sunset) = self
            .descent(site, &samples, 0, SUNSET_ALTITUDE_DEG)
            .ok_or_else(|| {
                EngineError::Ephemeris(format!(
                    "Sun does not set within 24 h of {} at latitude {:.4}",
                    window_start,
                    site.latitude.value()
                ))
            })?;

        let (dark_start, dark_end, dark_end_idx) =
            match self.descent(site, &samples, sunset_idx, DARK_ALTITUDE_DEG) {
                Some((idx, t0)) => {
                    let (end_idx, t1) = self
                        .ascent(site, &samples, idx, DARK_ALTITUDE_DEG)
                        .unwrap_or((SAMPLES_PER_DAY, end));
                    (t0, t1, end_idx)
                }
                None => {
                    // No astronomical darkness: collapse the window onto the
                    // deepest point of twilight.
                    let (idx, t) = samples
                        .iter()
                        .enumerate()
                        .skip(sunset_idx)
                        .min_by(|a, b| a.1 .1.total_cmp(&b.1 .1))
                        .map(|(i, s)| (i, s.0))
                        .unwrap_or((sunset_idx, sunset));
                    debug!(
                        "No astronomical darkness at latitude {:.4}, dark window collapsed",
                        site.latitude.value()
                    );
                    (t, t, idx)
                }
            };

        let (_, sunrise) = self
            .ascent(site, &samples, dark_end_idx, SUNSET_ALTITUDE_DEG)
            .unwrap_or((SAMPLES_PER_DAY, end));

        let to_utc = |mjd: f64| {
            mjd_to_datetime(mjd)
                .ok_or_else(|| EngineError::Ephemeris(format!("MJD {} out of range", mjd)))
        };
        Ok(NightBoundaries {
            sunset: to_utc(sunset)?,
            dark_start: to_utc(dark_start)?,
            dark_end: to_utc(dark_end)?,
            sunrise: to_utc(sunrise)?,
        })
    }

    fn transit(&self, site: &Site, target: &Equatorial, window_start: DateTime<Utc>) -> EngineResult<TransitInfo> {
        let mjd0 = datetime_to_mjd(&window_start);
        let lst0 = local_sidereal_time(mjd0, site.longitude);
        let offset_days = (target.ra - lst0).value().rem_euclid(360.0) / SIDEREAL_RATE_DEG_PER_DAY;

        let time = mjd_to_datetime(mjd0 + offset_days)
            .ok_or_else(|| EngineError::Ephemeris(format!("MJD {} out of range", mjd0 + offset_days)))?;
        let altitude = Degrees::new(90.0 - (site.latitude - target.dec).value().abs());

        Ok(TransitInfo { time, altitude })
    }

    fn moon_separation(&self, target: &Equatorial, epoch: DateTime<Utc>) -> Degrees {
        let moon = self.moon_position(datetime_to_mjd(&epoch));
        angular_separation(target, &moon)
    }

    fn moon_illumination(&self, epoch: DateTime<Utc>) -> f64 {
        let mjd = datetime_to_mjd(&epoch);
        let elongation = angular_separation(&self.sun_position(mjd), &self.moon_position(mjd));
        ((1.0 - elongation.cos()) / 2.0).clamp(0.0, 1.0)
    }
}

/// Mean obliquity of the ecliptic in degrees.
fn obliquity(mjd: f64) -> f64 {
    23.439 - 0.000_000_36 * (mjd - MJD_J2000)
}

fn ecliptic_to_equatorial(lambda_deg: f64, beta_deg: f64, obliquity_deg: f64) -> Equatorial {
    let (lambda, beta) = (lambda_deg.to_radians(), beta_deg.to_radians());
    let ecliptic = Vector3::new(beta.cos() * lambda.cos(), beta.cos() * lambda.sin(), beta.sin());
    let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), obliquity_deg.to_radians());
    let equatorial = rotation * ecliptic;

    Equatorial::from_degrees(
        equatorial.y.atan2(equatorial.x).to_degrees().rem_euclid(360.0),
        equatorial.z.clamp(-1.0, 1.0).asin().to_degrees(),
    )
}
