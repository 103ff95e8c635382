use serde::{Deserialize, Serialize};

use crate::timestamp::CanonicalTimestamp;

/// One Point placemark extracted from a KML document.
///
/// Every point belongs to exactly one source file; the association is carried
/// by [`super::dataset::MergedPoint`], not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees (WGS 84)
    pub latitude: f64,

    /// Longitude in decimal degrees (WGS 84)
    pub longitude: f64,

    /// Normalized capture time; `None` when no candidate value was recognized
    pub timestamp: Option<CanonicalTimestamp>,

    /// Placemark `<name>`, preserved verbatim
    pub name: Option<String>,

    /// Placemark `<description>`, preserved verbatim
    pub description: Option<String>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp: None,
            name: None,
            description: None,
        }
    }

    /// True when the pair is a plausible WGS 84 coordinate. Placemarks
    /// failing this are dropped during extraction, not treated as errors.
    pub fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
        latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
    }

    /// Display label: the placemark name when present, otherwise its
    /// description.
    pub fn raw_label(&self) -> Option<&str> {
        self.name.as_deref().or(self.description.as_deref())
    }
}
