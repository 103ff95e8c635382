//! KML Point extraction
//!
//! Parses one KML document into an ordered sequence of [`GeoPoint`] records.
//! Only Point placemarks are taken (the first Point inside a MultiGeometry
//! counts); placemarks without a usable coordinate are skipped with a logged
//! warning rather than failing the document.
//!
//! Timestamp candidates are searched per placemark in a fixed order:
//! `<TimeStamp><when>`, then `<ExtendedData><Data><value>` entries in
//! document order, then the whole trimmed `<description>`. The first value
//! the normalizer recognizes wins.

use kml::types::{Element, Geometry, Placemark, Point};
use kml::Kml;
use std::path::Path;

use crate::error::{Result, StackerError};
use crate::models::GeoPoint;
use crate::timestamp::TimestampNormalizer;

/// Result of extracting one KML document.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Extracted points in document order
    pub points: Vec<GeoPoint>,

    /// Placemarks dropped for missing or out-of-range coordinates
    pub skipped_points: usize,

    /// Points kept without a timestamp although candidate values were present
    pub unrecognized_timestamps: usize,
}

/// Extracts Point placemarks from KML documents.
pub struct PointExtractor {
    normalizer: TimestampNormalizer,
}

impl PointExtractor {
    pub fn new(normalizer: TimestampNormalizer) -> Self {
        Self { normalizer }
    }

    /// Parse `bytes` as a KML document and extract its points.
    ///
    /// Fails with [`StackerError::MalformedDocument`] when the bytes are not
    /// UTF-8, not well-formed XML, or carry no KML root. The failure aborts
    /// this document only; the caller decides whether the session continues.
    pub fn extract(&self, path: &Path, bytes: &[u8]) -> Result<Extraction> {
        let content = std::str::from_utf8(bytes).map_err(|e| StackerError::MalformedDocument {
            path: path.to_path_buf(),
            reason: format!("not valid UTF-8: {}", e),
        })?;

        let document: Kml = content.parse().map_err(|e| StackerError::MalformedDocument {
            path: path.to_path_buf(),
            reason: format!("failed to parse KML: {}", e),
        })?;

        match &document {
            Kml::KmlDocument(_) | Kml::Document { .. } | Kml::Folder { .. } | Kml::Placemark(_) => {}
            _ => {
                return Err(StackerError::MalformedDocument {
                    path: path.to_path_buf(),
                    reason: "no KML root element".to_string(),
                })
            }
        }

        let mut extraction = Extraction::default();
        self.walk(&document, &mut extraction);
        Ok(extraction)
    }

    /// Recursively visit nested documents and folders, preserving document
    /// order of placemarks.
    fn walk(&self, node: &Kml, extraction: &mut Extraction) {
        match node {
            Kml::KmlDocument(doc) => {
                for element in &doc.elements {
                    self.walk(element, extraction);
                }
            }
            Kml::Document { elements, .. } | Kml::Folder { elements, .. } => {
                for element in elements {
                    self.walk(element, extraction);
                }
            }
            Kml::Placemark(placemark) => self.extract_placemark(placemark, extraction),
            _ => {
                // Styles, overlays, network links carry no points
            }
        }
    }

    fn extract_placemark(&self, placemark: &Placemark, extraction: &mut Extraction) {
        let Some(point) = placemark.geometry.as_ref().and_then(point_geometry) else {
            extraction.skipped_points += 1;
            tracing::warn!(
                name = placemark.name.as_deref().unwrap_or(""),
                "placemark has no Point geometry, skipping"
            );
            return;
        };

        // KML coordinates are lon,lat ordered
        let (latitude, longitude) = (point.coord.y, point.coord.x);
        if !GeoPoint::valid_coordinates(latitude, longitude) {
            extraction.skipped_points += 1;
            tracing::warn!(
                latitude,
                longitude,
                "placemark coordinates out of range, skipping"
            );
            return;
        }

        let mut geo_point = GeoPoint::new(latitude, longitude);
        geo_point.name = placemark.name.clone();
        geo_point.description = placemark.description.clone();

        let candidates = timestamp_candidates(placemark);
        let had_candidates = !candidates.is_empty();
        for candidate in candidates {
            if let Some(timestamp) = self.normalizer.normalize(candidate) {
                geo_point.timestamp = Some(timestamp);
                break;
            }
            tracing::debug!(value = candidate, "unrecognized timestamp candidate");
        }
        if had_candidates && geo_point.timestamp.is_none() {
            extraction.unrecognized_timestamps += 1;
        }

        extraction.points.push(geo_point);
    }
}

/// First Point geometry reachable from `geometry`, descending into
/// MultiGeometry containers.
fn point_geometry(geometry: &Geometry) -> Option<&Point> {
    match geometry {
        Geometry::Point(point) => Some(point),
        Geometry::MultiGeometry(multi) => multi.geometries.iter().find_map(point_geometry),
        _ => None,
    }
}

/// Timestamp candidate values for one placemark, in search order.
fn timestamp_candidates(placemark: &Placemark) -> Vec<&str> {
    let mut candidates = Vec::new();

    for child in &placemark.children {
        if child.name == "TimeStamp" {
            for inner in &child.children {
                if inner.name == "when" {
                    if let Some(content) = &inner.content {
                        candidates.push(content.as_str());
                    }
                }
            }
        }
    }

    for child in &placemark.children {
        if child.name == "ExtendedData" {
            collect_data_values(child, &mut candidates);
        }
    }

    if let Some(description) = &placemark.description {
        let trimmed = description.trim();
        if !trimmed.is_empty() {
            candidates.push(trimmed);
        }
    }

    candidates
}

fn collect_data_values<'a>(extended_data: &'a Element, out: &mut Vec<&'a str>) {
    for data in &extended_data.children {
        if data.name == "Data" {
            for value in &data.children {
                if value.name == "value" {
                    if let Some(content) = &value.content {
                        out.push(content.as_str());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Precision;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn extract(content: &str) -> Result<Extraction> {
        let extractor = PointExtractor::new(TimestampNormalizer::default());
        extractor.extract(&PathBuf::from("test.kml"), content.as_bytes())
    }

    #[test]
    fn test_point_with_timestamp_element() {
        let kml_content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>Test Point</name>
      <TimeStamp><when>2023-05-01T12:00:00Z</when></TimeStamp>
      <Point>
        <coordinates>-74.0,40.0,0</coordinates>
      </Point>
    </Placemark>
  </Document>
</kml>"#;

        let extraction = extract(kml_content).unwrap();

        assert_eq!(extraction.points.len(), 1);
        assert_eq!(extraction.skipped_points, 0);

        let point = &extraction.points[0];
        assert_eq!(point.latitude, 40.0);
        assert_eq!(point.longitude, -74.0);
        assert_eq!(point.name.as_deref(), Some("Test Point"));

        let timestamp = point.timestamp.unwrap();
        assert_eq!(
            timestamp.value,
            Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(timestamp.precision, Precision::Full);
    }

    #[test]
    fn test_nested_folders_document_order() {
        let kml_content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Folder>
      <name>Outer</name>
      <Placemark>
        <name>First</name>
        <Point><coordinates>10.0,1.0</coordinates></Point>
      </Placemark>
      <Folder>
        <name>Inner</name>
        <Placemark>
          <name>Second</name>
          <Point><coordinates>20.0,2.0</coordinates></Point>
        </Placemark>
      </Folder>
    </Folder>
    <Placemark>
      <name>Third</name>
      <Point><coordinates>30.0,3.0</coordinates></Point>
    </Placemark>
  </Document>
</kml>"#;

        let extraction = extract(kml_content).unwrap();

        let names: Vec<&str> = extraction
            .points
            .iter()
            .filter_map(|p| p.name.as_deref())
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_placemark_without_geometry_skipped() {
        let kml_content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>No geometry</name>
    </Placemark>
    <Placemark>
      <name>Has point</name>
      <Point><coordinates>10.0,1.0</coordinates></Point>
    </Placemark>
  </Document>
</kml>"#;

        let extraction = extract(kml_content).unwrap();

        assert_eq!(extraction.points.len(), 1);
        assert_eq!(extraction.skipped_points, 1);
    }

    #[test]
    fn test_non_point_geometry_skipped() {
        let kml_content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>A track</name>
      <LineString>
        <coordinates>10.0,1.0 20.0,2.0</coordinates>
      </LineString>
    </Placemark>
  </Document>
</kml>"#;

        let extraction = extract(kml_content).unwrap();

        assert!(extraction.points.is_empty());
        assert_eq!(extraction.skipped_points, 1);
    }

    #[test]
    fn test_multigeometry_point_found() {
        let kml_content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>Mixed</name>
      <MultiGeometry>
        <LineString><coordinates>10.0,1.0 20.0,2.0</coordinates></LineString>
        <Point><coordinates>15.0,5.0</coordinates></Point>
      </MultiGeometry>
    </Placemark>
  </Document>
</kml>"#;

        let extraction = extract(kml_content).unwrap();

        assert_eq!(extraction.points.len(), 1);
        assert_eq!(extraction.points[0].latitude, 5.0);
        assert_eq!(extraction.points[0].longitude, 15.0);
    }

    #[test]
    fn test_out_of_range_coordinates_skipped() {
        let kml_content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>Bad latitude</name>
      <Point><coordinates>10.0,95.0</coordinates></Point>
    </Placemark>
  </Document>
</kml>"#;

        let extraction = extract(kml_content).unwrap();

        assert!(extraction.points.is_empty());
        assert_eq!(extraction.skipped_points, 1);
    }

    #[test]
    fn test_extended_data_timestamp_used() {
        let kml_content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>Epoch point</name>
      <ExtendedData>
        <Data name="Timestamp"><value>1700000000</value></Data>
      </ExtendedData>
      <Point><coordinates>10.0,1.0</coordinates></Point>
    </Placemark>
  </Document>
</kml>"#;

        let extraction = extract(kml_content).unwrap();

        let timestamp = extraction.points[0].timestamp.unwrap();
        assert_eq!(
            timestamp.value,
            Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap()
        );
    }

    #[test]
    fn test_timestamp_element_wins_over_extended_data() {
        let kml_content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <TimeStamp><when>2023-05-01T12:00:00Z</when></TimeStamp>
      <ExtendedData>
        <Data name="Timestamp"><value>1700000000</value></Data>
      </ExtendedData>
      <Point><coordinates>10.0,1.0</coordinates></Point>
    </Placemark>
  </Document>
</kml>"#;

        let extraction = extract(kml_content).unwrap();

        let timestamp = extraction.points[0].timestamp.unwrap();
        assert_eq!(
            timestamp.value,
            Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_description_used_as_fallback_candidate() {
        let kml_content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <description>2023-05-01 08:15:00</description>
      <Point><coordinates>10.0,1.0</coordinates></Point>
    </Placemark>
  </Document>
</kml>"#;

        let extraction = extract(kml_content).unwrap();

        let timestamp = extraction.points[0].timestamp.unwrap();
        assert_eq!(
            timestamp.value,
            Utc.with_ymd_and_hms(2023, 5, 1, 8, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_unrecognized_candidate_keeps_point() {
        let kml_content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <TimeStamp><when>??unknown??</when></TimeStamp>
      <Point><coordinates>10.0,1.0</coordinates></Point>
    </Placemark>
  </Document>
</kml>"#;

        let extraction = extract(kml_content).unwrap();

        assert_eq!(extraction.points.len(), 1);
        assert!(extraction.points[0].timestamp.is_none());
        assert_eq!(extraction.unrecognized_timestamps, 1);
    }

    #[test]
    fn test_no_candidates_is_not_unrecognized() {
        let kml_content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>Bare point</name>
      <Point><coordinates>10.0,1.0</coordinates></Point>
    </Placemark>
  </Document>
</kml>"#;

        let extraction = extract(kml_content).unwrap();

        assert!(extraction.points[0].timestamp.is_none());
        assert_eq!(extraction.unrecognized_timestamps, 0);
    }

    #[test]
    fn test_invalid_xml_is_malformed_document() {
        let error = extract("definitely not xml").unwrap_err();
        assert!(matches!(error, StackerError::MalformedDocument { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_malformed_document() {
        let extractor = PointExtractor::new(TimestampNormalizer::default());
        let error = extractor
            .extract(&PathBuf::from("test.kml"), &[0xff, 0xfe, 0x3c, 0x6b])
            .unwrap_err();
        assert!(matches!(error, StackerError::MalformedDocument { .. }));
    }

    #[test]
    fn test_well_formed_non_kml_is_malformed_document() {
        let error = extract("<html><body><p>hi</p></body></html>").unwrap_err();
        assert!(matches!(error, StackerError::MalformedDocument { .. }));
    }

    #[test]
    fn test_empty_document_yields_no_points() {
        let kml_content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Nothing here</name>
  </Document>
</kml>"#;

        let extraction = extract(kml_content).unwrap();

        assert!(extraction.points.is_empty());
        assert_eq!(extraction.skipped_points, 0);
    }
}
