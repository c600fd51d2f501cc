//! Distances and areas on the WGS84 ellipsoid.

pub mod area;
pub mod vincenty;

pub use area::{AreaParams, pixel_areas};

/// WGS84 semi-major axis [m].
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis [m].
pub const WGS84_B: f64 = (1.0 - WGS84_F) * WGS84_A;

/// A (longitude, latitude) pair in degrees.
pub type LonLat = (f64, f64);
