use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use geo::Rect;
use log::{debug, info, warn};
use serde_json::{json, Map, Value};

use crate::coordinates::{convert_coordinates, first_position, GridToWgs84, LeafTransform, SOURCE_CRS, TARGET_CRS};
use crate::error::{ConversionError, ConversionResult};
use crate::extent::{collection_extent, in_expected_region};

/// Suffix marking a converted collection name
pub const WGS84_MARKER: &str = "_WGS84";
/// OGC name for WGS84 with lon/lat axis order
pub const CRS84_URN: &str = "urn:ogc:def:crs:OGC:1.3:CRS84";

const PROGRESS_INTERVAL: usize = 10;

/// What one successful file conversion produced
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub features: usize,
    /// First position of the first feature, after conversion
    pub sample: Option<(f64, f64)>,
    pub extent: Option<Rect<f64>>,
}

/// Fixed `crs` member written to every converted document
pub fn wgs84_crs() -> Value {
    json!({
        "type": "name",
        "properties": {
            "name": CRS84_URN
        }
    })
}

/// Appends `_WGS84` unless the name already carries it
pub fn mark_wgs84_name(name: &str) -> String {
    if name.contains(WGS84_MARKER) {
        name.to_string()
    } else {
        format!("{}{}", name, WGS84_MARKER)
    }
}

/// Converts a parsed feature collection in place and returns how many
/// features it holds. A missing `features` member counts as empty.
pub fn convert_document<T>(document: &mut Value, transform: &T) -> ConversionResult<usize>
where
    T: LeafTransform + ?Sized,
{
    let root = document
        .as_object_mut()
        .ok_or_else(|| ConversionError::InvalidDocument("top-level value is not an object".to_string()))?;

    let features_count = match root.get_mut("features") {
        Some(Value::Array(features)) => {
            let total = features.len();
            for (idx, feature) in features.iter_mut().enumerate() {
                convert_feature(feature, transform)?;

                let done = idx + 1;
                if progress_due(done, total) {
                    info!("  Progress: {}/{} features converted", done, total);
                }
            }
            total
        }
        Some(other) => {
            warn!("Ignoring non-array `features` member: {}", other);
            0
        }
        None => 0,
    };

    root.insert("crs".to_string(), wgs84_crs());

    if let Some(Value::String(name)) = root.get_mut("name") {
        *name = mark_wgs84_name(name);
    }

    Ok(features_count)
}

// Every 10th feature and the last one
fn progress_due(done: usize, total: usize) -> bool {
    done > 0 && (done % PROGRESS_INTERVAL == 0 || done == total)
}

fn convert_feature<T>(feature: &mut Value, transform: &T) -> ConversionResult<()>
where
    T: LeafTransform + ?Sized,
{
    match feature.get_mut("geometry") {
        Some(Value::Object(geometry)) => convert_geometry(geometry, transform),
        _ => Ok(()),
    }
}

fn convert_geometry<T>(geometry: &mut Map<String, Value>, transform: &T) -> ConversionResult<()>
where
    T: LeafTransform + ?Sized,
{
    if let Some(coords) = geometry.get_mut("coordinates") {
        *coords = convert_coordinates(coords, transform)?;
    }
    // GeometryCollection members carry their own coordinates
    if let Some(Value::Array(members)) = geometry.get_mut("geometries") {
        for member in members.iter_mut() {
            if let Value::Object(member) = member {
                convert_geometry(member, transform)?;
            }
        }
    }
    Ok(())
}

/// Reads `input`, converts it from Palestine Grid to WGS84 and writes the
/// result to `output`.
pub fn convert_geojson(input: &Path, output: &Path) -> ConversionResult<ConversionReport> {
    let mut document = read_document(input)?;
    let transformer = GridToWgs84::new()?;
    convert_and_write(&mut document, input, output, &transformer)
}

/// Same as `convert_geojson` with a caller-supplied position transform
pub fn convert_geojson_with<T>(input: &Path, output: &Path, transform: &T) -> ConversionResult<ConversionReport>
where
    T: LeafTransform + ?Sized,
{
    let mut document = read_document(input)?;
    convert_and_write(&mut document, input, output, transform)
}

fn read_document(input: &Path) -> ConversionResult<Value> {
    info!("Reading: {}", display_name(input));
    let file = File::open(input).map_err(|e| ConversionError::from_io(input, e))?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| {
        if source.is_io() {
            ConversionError::Io {
                path: input.to_path_buf(),
                source: source.into(),
            }
        } else {
            ConversionError::Parse {
                path: input.to_path_buf(),
                source,
            }
        }
    })
}

fn convert_and_write<T>(
    document: &mut Value,
    input: &Path,
    output: &Path,
    transform: &T,
) -> ConversionResult<ConversionReport>
where
    T: LeafTransform + ?Sized,
{
    info!("Converting coordinates from {} to {}...", SOURCE_CRS, TARGET_CRS);
    let features = convert_document(document, transform)?;

    info!("Writing: {}", display_name(output));
    write_document(document, output)?;
    info!("Successfully converted {} features!", features);

    let sample = sample_position(document);
    match sample {
        Some((lon, lat)) => {
            info!("Sample coordinate: [{:.6}, {:.6}]", lon, lat);
            info!("   (Should be ~[35.2, 31.9] for Al-Bireh)");
            if in_expected_region((lon, lat)) {
                info!("   Coordinates look correct for Palestine region!");
            } else {
                warn!("   Coordinates outside expected range!");
            }
        }
        None => debug!("No sample coordinate available"),
    }

    let extent = collection_extent(document);
    if let Some(rect) = extent {
        info!(
            "Extent: ({:.6}, {:.6}) to ({:.6}, {:.6})",
            rect.min().x,
            rect.min().y,
            rect.max().x,
            rect.max().y
        );
    }

    Ok(ConversionReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        features,
        sample,
        extent,
    })
}

fn write_document(document: &Value, output: &Path) -> ConversionResult<()> {
    let io_error = |source: std::io::Error| ConversionError::Io {
        path: output.to_path_buf(),
        source,
    };

    let file = File::create(output).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document).map_err(|e| io_error(e.into()))?;
    writeln!(writer).map_err(io_error)?;
    writer.flush().map_err(io_error)
}

/// First position of the first feature's geometry
pub fn sample_position(document: &Value) -> Option<(f64, f64)> {
    let coords = document
        .get("features")?
        .as_array()?
        .first()?
        .get("geometry")?
        .get("coordinates")?;
    first_position(coords)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
