//! Sanity checks on converted output: overall extent and the expected
//! region for Palestine Grid data.

use geo::{coord, BoundingRect, Geometry, Intersects, Rect};
use geojson::Geometry as GeoJsonGeometry;
use log::debug;
use serde_json::Value;

/// Lon/lat box the converted data is expected to fall into
pub fn expected_region() -> Rect<f64> {
    Rect::new(coord! { x: 34.0, y: 31.0 }, coord! { x: 36.0, y: 33.0 })
}

/// True if a (lon, lat) sample lies inside `expected_region`, edges included
pub fn in_expected_region(sample: (f64, f64)) -> bool {
    let (lon, lat) = sample;
    expected_region().intersects(&coord! { x: lon, y: lat })
}

/// Bounding box of every typed geometry in a feature collection.
///
/// Geometries that do not parse as GeoJSON geometries are skipped.
pub fn collection_extent(document: &Value) -> Option<Rect<f64>> {
    let features = document.get("features")?.as_array()?;

    features
        .iter()
        .filter_map(|feature| feature.get("geometry"))
        .filter(|geometry| !geometry.is_null())
        .filter_map(geometry_bounds)
        .reduce(merge)
}

fn geometry_bounds(value: &Value) -> Option<Rect<f64>> {
    let parsed: GeoJsonGeometry = match serde_json::from_value(value.clone()) {
        Ok(geometry) => geometry,
        Err(e) => {
            debug!("Skipping geometry in extent calculation: {}", e);
            return None;
        }
    };
    match Geometry::<f64>::try_from(parsed) {
        Ok(geometry) => geometry.bounding_rect(),
        Err(e) => {
            debug!("Skipping geometry in extent calculation: {}", e);
            None
        }
    }
}

fn merge(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}
