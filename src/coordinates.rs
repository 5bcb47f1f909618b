//! Recursive conversion of GeoJSON coordinate trees.
//!
//! GeoJSON nests positions at a depth that depends on the geometry type
//! (Point = 1, Polygon = 3, MultiPolygon = 4), so the tree is walked
//! generically: a node whose first child is an array is an inner node,
//! anything else is a leaf position.

use log::debug;
use proj::Proj;
use serde_json::Value;

use crate::error::{ConversionError, ConversionResult};

/// Palestine 1923 / Palestine Grid
pub const SOURCE_CRS: &str = "EPSG:28191";
/// WGS84 geographic
pub const TARGET_CRS: &str = "EPSG:4326";

/// Maps a single (x, y) position to (longitude, latitude)
pub trait LeafTransform {
    fn transform(&self, x: f64, y: f64) -> ConversionResult<(f64, f64)>;
}

impl<F> LeafTransform for F
where
    F: Fn(f64, f64) -> ConversionResult<(f64, f64)>,
{
    fn transform(&self, x: f64, y: f64) -> ConversionResult<(f64, f64)> {
        self(x, y)
    }
}

/// PROJ pipeline from Palestine Grid easting/northing to WGS84 lon/lat
pub struct GridToWgs84 {
    proj: Proj,
}

impl GridToWgs84 {
    pub fn new() -> ConversionResult<Self> {
        // new_known_crs normalizes axis order, so input is (easting, northing)
        // and output is (longitude, latitude) regardless of the EPSG definition
        let proj = Proj::new_known_crs(SOURCE_CRS, TARGET_CRS, None)?;
        debug!("Created transformer {} -> {}", SOURCE_CRS, TARGET_CRS);
        Ok(GridToWgs84 { proj })
    }
}

impl LeafTransform for GridToWgs84 {
    fn transform(&self, x: f64, y: f64) -> ConversionResult<(f64, f64)> {
        self.proj
            .convert((x, y))
            .map_err(|e| ConversionError::Transform { x, y, reason: e.to_string() })
    }
}

/// Shape of one node in a coordinate tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateNode<'a> {
    /// A position such as `[x, y]` or `[x, y, z]`
    Leaf(&'a [Value]),
    /// A sequence of child nodes (ring, line, polygon, ...)
    Nested(&'a [Value]),
}

impl<'a> CoordinateNode<'a> {
    /// Classifies `value` by its first child. Null, scalars and empty
    /// arrays are not coordinate nodes.
    pub fn classify(value: &'a Value) -> Option<Self> {
        let items = value.as_array()?;
        match items.first()? {
            Value::Array(_) => Some(CoordinateNode::Nested(items)),
            _ => Some(CoordinateNode::Leaf(items)),
        }
    }
}

/// Returns a copy of `coords` with every position transformed.
///
/// Positions of length 2 become `[lon, lat]`, positions of length 3 become
/// `[lon, lat, z]` with `z` copied untouched. Positions of any other length,
/// or whose first two entries are not numbers, are copied as-is. Transform
/// failures are returned to the caller.
pub fn convert_coordinates<T>(coords: &Value, transform: &T) -> ConversionResult<Value>
where
    T: LeafTransform + ?Sized,
{
    match CoordinateNode::classify(coords) {
        None => Ok(coords.clone()),
        Some(CoordinateNode::Leaf(position)) => convert_position(position, transform),
        Some(CoordinateNode::Nested(children)) => children
            .iter()
            .map(|child| convert_coordinates(child, transform))
            .collect::<ConversionResult<Vec<_>>>()
            .map(Value::Array),
    }
}

fn convert_position<T>(position: &[Value], transform: &T) -> ConversionResult<Value>
where
    T: LeafTransform + ?Sized,
{
    if position.len() != 2 && position.len() != 3 {
        return Ok(Value::Array(position.to_vec()));
    }
    let (x, y) = match (position[0].as_f64(), position[1].as_f64()) {
        (Some(x), Some(y)) => (x, y),
        _ => return Ok(Value::Array(position.to_vec())),
    };

    let (lon, lat) = transform.transform(x, y)?;
    if !lon.is_finite() || !lat.is_finite() {
        return Err(ConversionError::Transform {
            x,
            y,
            reason: format!("non-finite result ({}, {})", lon, lat),
        });
    }

    let mut converted = Vec::with_capacity(position.len());
    converted.push(Value::from(lon));
    converted.push(Value::from(lat));
    converted.extend(position.get(2).cloned());
    Ok(Value::Array(converted))
}

/// First two components of the first position found by descending through
/// the first child at every level.
pub fn first_position(coords: &Value) -> Option<(f64, f64)> {
    let mut node = coords;
    loop {
        match CoordinateNode::classify(node)? {
            CoordinateNode::Nested(children) => node = &children[0],
            CoordinateNode::Leaf(position) => {
                let x = position.first()?.as_f64()?;
                let y = position.get(1)?.as_f64()?;
                return Some((x, y));
            }
        }
    }
}
