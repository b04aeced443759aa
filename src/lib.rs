//! # skyradar
//!
//! Observer-relative tracking of Earth satellites and catalog stars, and the
//! radar/sky projection engine that renders them.
//!
//! The crate is organised leaves-first:
//!
//! - [`time`], [`earthlib`], [`coordlib`]: Julian dates, sidereal time,
//!   refraction and RA/Dec → azimuth/elevation conversion
//! - [`toposlib`]: observer locations and topocentric look angles
//! - [`sgp4lib`], [`elementslib`]: SGP4 look angles, sampled future paths,
//!   pass extraction and static orbital parameters
//! - [`projection`]: azimuth/elevation → plotting-surface coordinates
//! - [`signallib`]: light time and the compressed "ping" animation
//! - [`starlib`]: star catalog and constellation background
//! - [`radar`]: the frame-driven render/interaction engine
//!
//! # Example
//!
//! ```ignore
//! use skyradar::coordlib::equatorial_to_horizontal;
//! use skyradar::projection::{project, ViewMode};
//!
//! let now = chrono::Utc::now();
//! // Vega from Berlin
//! let h = equatorial_to_horizontal(279.2347, 38.7837, 52.5, 13.4, now);
//! if h.elevation > 0.0 {
//!     let p = project(h.azimuth, h.elevation, 200.0, 200.0, 180.0, ViewMode::Sky);
//!     println!("Vega at ({:.1}, {:.1})", p.x, p.y);
//! }
//! ```

pub mod config;
pub mod constants;
pub mod coordlib;
pub mod earthlib;
pub mod elementslib;
pub mod projection;
pub mod radar;
pub mod scheduler;
pub mod sgp4lib;
pub mod signallib;
pub mod starlib;
pub mod time;
pub mod toposlib;

use thiserror::Error;

pub use config::RadarConfig;
pub use coordlib::{equatorial_to_horizontal, Horizontal};
pub use projection::{project, ScreenPoint, ViewMode};
pub use sgp4lib::{HorizonPosition, OrbitPath, OrbitalElementSet, TrackedObject, VisualObject};
pub use toposlib::ObserverLocation;

/// Errors raised by the fallible constructors and parsers of this crate.
///
/// Frame and tick paths never return these: per-object failures there are
/// absorbed and expressed as "temporarily unavailable".
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The two-line element set could not be parsed or initialised
    #[error("Invalid element set {id}: {reason}")]
    InvalidElements { id: String, reason: String },

    /// SGP4 propagation failed for an instant
    #[error("Propagation failed: {0}")]
    Propagation(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Input data is malformed or out of range
    #[error("Data error: {0}")]
    Data(String),
}

/// Result type for fallible skyradar operations
pub type Result<T> = std::result::Result<T, TrackerError>;
