//! Star catalog and constellation background
//!
//! The radar draws a faint sky behind the tracked objects: catalog stars and
//! constellation stick figures converted to the observer's horizon. The
//! conversion is not worth repeating every frame, since the sky only turns
//! 0.25° per minute, so [`SkyBackground`] caches horizontal coordinates and
//! recomputes them only when the observer or catalog changes or the refresh
//! interval elapses.
//!
//! # Example
//!
//! ```ignore
//! use skyradar::starlib::{SkyBackground, StarCatalog};
//!
//! let catalog = Arc::new(StarCatalog::bright_stars());
//! let mut background = SkyBackground::new(Duration::from_secs(30));
//! background.update(&catalog, &observer, host_now, chrono::Utc::now());
//! for star in background.stars().iter().filter(|s| s.position.is_visible()) {
//!     // project and draw
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coordlib::{equatorial_to_horizontal, Horizontal};
use crate::projection::fallback_angle;
use crate::toposlib::ObserverLocation;
use crate::TrackerError;

/// A catalog star.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    /// Right ascension in degrees; some catalog rows lack it
    #[serde(default)]
    pub ra_deg: Option<f64>,
    /// Declination in degrees
    pub dec_deg: f64,
    /// Visual magnitude
    #[serde(default)]
    pub magnitude: f64,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, ra_deg: f64, dec_deg: f64, magnitude: f64) -> Self {
        CatalogEntry {
            name: name.into(),
            ra_deg: Some(ra_deg),
            dec_deg,
            magnitude,
        }
    }

    /// Right ascension to plot with.
    ///
    /// Entries without one are placed at a stable hashed angle of their
    /// name, so they at least stay put between refreshes.
    pub fn effective_ra_deg(&self) -> f64 {
        self.ra_deg.unwrap_or_else(|| fallback_angle(&self.name))
    }
}

/// A constellation stick figure: pairs of `(ra_deg, dec_deg)` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstellationLine {
    pub name: String,
    pub segments: Vec<((f64, f64), (f64, f64))>,
}

/// Stars and constellation figures drawn behind the radar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StarCatalog {
    #[serde(default)]
    pub stars: Vec<CatalogEntry>,
    #[serde(default)]
    pub constellations: Vec<ConstellationLine>,
}

impl StarCatalog {
    pub fn from_json_str(json: &str) -> Result<Self, TrackerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty() && self.constellations.is_empty()
    }

    /// A small built-in catalog of bright navigation stars plus Orion and
    /// the Big Dipper, J2000 coordinates.
    pub fn bright_stars() -> Self {
        const STARS: [(&str, f64, f64, f64); 16] = [
            ("Sirius", 101.2872, -16.7161, -1.46),
            ("Canopus", 95.9880, -52.6957, -0.74),
            ("Arcturus", 213.9153, 19.1824, -0.05),
            ("Vega", 279.2347, 38.7837, 0.03),
            ("Capella", 79.1723, 45.9980, 0.08),
            ("Rigel", 78.6345, -8.2016, 0.13),
            ("Procyon", 114.8255, 5.2250, 0.34),
            ("Betelgeuse", 88.7929, 7.4071, 0.42),
            ("Altair", 297.6958, 8.8683, 0.76),
            ("Aldebaran", 68.9802, 16.5093, 0.86),
            ("Polaris", 37.9546, 89.2641, 1.98),
            ("Bellatrix", 81.2828, 6.3497, 1.64),
            ("Saiph", 86.9391, -9.6696, 2.06),
            ("Dubhe", 165.9320, 61.7510, 1.79),
            ("Merak", 165.4603, 56.3824, 2.37),
            ("Alkaid", 206.8852, 49.3133, 1.86),
        ];

        let stars = STARS
            .iter()
            .map(|&(name, ra, dec, mag)| CatalogEntry::new(name, ra, dec, mag))
            .collect();

        let betelgeuse = (88.7929, 7.4071);
        let bellatrix = (81.2828, 6.3497);
        let rigel = (78.6345, -8.2016);
        let saiph = (86.9391, -9.6696);
        let alnitak = (85.1897, -1.9426);
        let mintaka = (83.0017, -0.2991);

        let dubhe = (165.9320, 61.7510);
        let merak = (165.4603, 56.3824);
        let phecda = (178.4577, 53.6948);
        let megrez = (183.8565, 57.0326);
        let alioth = (193.5073, 55.9598);
        let mizar = (200.9814, 54.9254);
        let alkaid = (206.8852, 49.3133);

        StarCatalog {
            stars,
            constellations: vec![
                ConstellationLine {
                    name: "Orion".to_string(),
                    segments: vec![
                        (betelgeuse, bellatrix),
                        (betelgeuse, alnitak),
                        (bellatrix, mintaka),
                        (alnitak, mintaka),
                        (alnitak, saiph),
                        (mintaka, rigel),
                    ],
                },
                ConstellationLine {
                    name: "Big Dipper".to_string(),
                    segments: vec![
                        (dubhe, merak),
                        (merak, phecda),
                        (phecda, megrez),
                        (megrez, dubhe),
                        (megrez, alioth),
                        (alioth, mizar),
                        (mizar, alkaid),
                    ],
                },
            ],
        }
    }
}

/// Glyph radius in pixels for a visual magnitude.
pub fn star_radius(magnitude: f64) -> f64 {
    ((4.0 - magnitude) * 0.6).clamp(0.5, 3.0)
}

/// A catalog star at its current horizontal position.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundStar {
    pub name: String,
    pub magnitude: f64,
    pub position: Horizontal,
}

/// A constellation segment at its current horizontal position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundSegment {
    pub from: Horizontal,
    pub to: Horizontal,
}

impl BackgroundSegment {
    /// Drawn only when both ends are above the horizon.
    pub fn is_visible(&self) -> bool {
        self.from.is_visible() && self.to.is_visible()
    }
}

/// Cached horizontal coordinates of a [`StarCatalog`].
#[derive(Debug)]
pub struct SkyBackground {
    refresh: Duration,
    computed_at: Option<Duration>,
    observer: Option<ObserverLocation>,
    catalog: Option<Arc<StarCatalog>>,
    stars: Vec<BackgroundStar>,
    segments: Vec<BackgroundSegment>,
}

impl SkyBackground {
    pub fn new(refresh: Duration) -> Self {
        SkyBackground {
            refresh,
            computed_at: None,
            observer: None,
            catalog: None,
            stars: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn stars(&self) -> &[BackgroundStar] {
        &self.stars
    }

    pub fn segments(&self) -> &[BackgroundSegment] {
        &self.segments
    }

    /// Whether [`update`](Self::update) would recompute.
    pub fn is_stale(
        &self,
        catalog: &Arc<StarCatalog>,
        observer: &ObserverLocation,
        now: Duration,
    ) -> bool {
        let Some(at) = self.computed_at else {
            return true;
        };
        let same_catalog = self
            .catalog
            .as_ref()
            .is_some_and(|c| Arc::ptr_eq(c, catalog));
        !same_catalog
            || self.observer.as_ref() != Some(observer)
            || now.saturating_sub(at) >= self.refresh
    }

    /// Recompute if stale. Returns whether anything was recomputed.
    ///
    /// `now` is the host's monotonic clock and drives the refresh cadence;
    /// `wall` is the instant the sky is computed for.
    pub fn update(
        &mut self,
        catalog: &Arc<StarCatalog>,
        observer: &ObserverLocation,
        now: Duration,
        wall: DateTime<Utc>,
    ) -> bool {
        if !self.is_stale(catalog, observer, now) {
            return false;
        }

        let (lat, lng) = (observer.latitude, observer.longitude);
        let to_horizon = |ra: f64, dec: f64| equatorial_to_horizontal(ra, dec, lat, lng, wall);

        self.stars = catalog
            .stars
            .iter()
            .map(|entry| BackgroundStar {
                name: entry.name.clone(),
                magnitude: entry.magnitude,
                position: to_horizon(entry.effective_ra_deg(), entry.dec_deg),
            })
            .collect();

        self.segments = catalog
            .constellations
            .iter()
            .flat_map(|c| c.segments.iter())
            .map(|&((ra1, dec1), (ra2, dec2))| BackgroundSegment {
                from: to_horizon(ra1, dec1),
                to: to_horizon(ra2, dec2),
            })
            .collect();

        debug!(
            stars = self.stars.len(),
            segments = self.segments.len(),
            observer = %observer,
            "star background recomputed"
        );
        self.computed_at = Some(now);
        self.observer = Some(observer.clone());
        self.catalog = Some(Arc::clone(catalog));
        true
    }

    /// Drop the cache, e.g. when the catalog is removed.
    pub fn clear(&mut self) {
        self.computed_at = None;
        self.observer = None;
        self.catalog = None;
        self.stars.clear();
        self.segments.clear();
    }
}
