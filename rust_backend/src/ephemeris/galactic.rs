//! Equatorial (ICRS) to galactic frame rotation.

use nalgebra::{Matrix3, Vector3};
use qtty::Degrees;

use super::Equatorial;

/// Galactic coordinates in degrees, `l` in `[0, 360)` and `b` in `[-90, 90]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Galactic {
    pub l: Degrees,
    pub b: Degrees,
}

/// ICRS to galactic rotation (Hipparcos definition).
fn icrs_to_galactic() -> Matrix3<f64> {
    Matrix3::new(
        -0.054_875_560_416_215_4,
        -0.873_437_090_234_885_0,
        -0.483_835_015_548_713_2,
        0.494_109_427_875_583_7,
        -0.444_829_629_960_011_2,
        0.746_982_244_497_218_9,
        -0.867_666_149_019_004_7,
        -0.198_076_373_431_201_5,
        0.455_983_776_175_066_9,
    )
}

/// Rotate an equatorial direction into the galactic frame.
pub fn equatorial_to_galactic(target: &Equatorial) -> Galactic {
    let ra = target.ra.value().to_radians();
    let dec = target.dec.value().to_radians();
    let direction = Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin());

    let galactic = icrs_to_galactic() * direction;
    let b = galactic.z.clamp(-1.0, 1.0).asin().to_degrees();
    let l = galactic.y.atan2(galactic.x).to_degrees().rem_euclid(360.0);

    Galactic {
        l: Degrees::new(l),
        b: Degrees::new(b),
    }
}
