//! Time scale helpers.

pub mod mjd;

pub use mjd::{
    datetime_to_mjd, gmst, julian_centuries, local_sidereal_time, mjd_to_datetime, MJD_J2000,
};
