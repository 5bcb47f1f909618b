use std::path::Path;

pub mod batch;
pub mod converter;
pub mod coordinates;
pub mod error;
pub mod extent;

pub use batch::{default_jobs, run_batch, run_batch_with, BatchSummary, ConversionJob, JobOutcome};
pub use converter::{convert_geojson, convert_geojson_with, ConversionReport};
pub use coordinates::{convert_coordinates, GridToWgs84, LeafTransform};
pub use error::{ConversionError, ConversionResult};

/// Directory holding the GeoJSON layers when no other location is given
pub const DEFAULT_BASE_DIR: &str = "GIS";

/// Converts every job in order and prints the closing summary
pub fn process_jobs(jobs: &[ConversionJob]) -> BatchSummary {
    let summary = batch::run_batch(jobs);
    batch::report_summary(&summary);
    summary
}

/// Converts the fixed layer list found under `base_dir`
pub fn process_default_jobs(base_dir: &Path) -> BatchSummary {
    process_jobs(&default_jobs(base_dir))
}
