//! Physical and astronomical constants

/// Julian date of the J2000.0 epoch
pub const J2000: f64 = 2_451_545.0;

/// Julian date of the Unix epoch (1970-01-01T00:00:00Z)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Seconds per day
pub const DAY_S: f64 = 86_400.0;

/// Milliseconds per day
pub const DAY_MS: f64 = 86_400_000.0;

/// Days per Julian century
pub const JULIAN_CENTURY_DAYS: f64 = 36_525.0;

/// Earth's gravitational parameter in km³/s²
pub const GM_EARTH_KM3_S2: f64 = 398_600.441_8;

/// Mean Earth radius in km, used for perigee/apogee altitudes
pub const EARTH_MEAN_RADIUS_KM: f64 = 6_371.0;

/// WGS84 equatorial radius in km
pub const WGS84_RADIUS_KM: f64 = 6_378.137;

/// WGS84 polar radius in km
pub const WGS84_POLAR_RADIUS_KM: f64 = 6_356.752_314_2;

/// Speed of light in km/s
pub const C_KM_S: f64 = 299_792.458;

/// Minutes per day
pub const MINUTES_PER_DAY: f64 = 1_440.0;
