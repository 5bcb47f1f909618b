//! Sequential driver over a list of input/output file pairs

use std::path::{Path, PathBuf};

use log::error;

use crate::converter::{convert_geojson, convert_geojson_with, ConversionReport};
use crate::coordinates::LeafTransform;
use crate::error::{error_chain, ConversionError, ConversionResult};

/// Source files converted when no jobs are given on the command line
pub const DEFAULT_INPUTS: [&str; 2] = [
    "Quarters(Neighborhoods).geojson",
    "Urban_Master_Plan_Borders_1.geojson",
];

const OUTPUT_SUFFIX: &str = "_WGS84_CORRECT.geojson";

const NEXT_STEPS: [&str; 4] = [
    "1. Verify the new files have correct coordinates (~35.2, ~31.9)",
    "2. Update your backend to use the new *_WGS84_CORRECT.geojson files",
    "3. Delete or archive the old incorrectly named _WGS84 files",
    "4. Test geofencing in the mobile app",
];

/// One file to convert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ConversionJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        ConversionJob {
            input: input.into(),
            output: output.into(),
        }
    }

    /// Job writing `<stem>_WGS84_CORRECT.geojson` next to `input`
    pub fn beside(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = input.with_file_name(format!("{}{}", stem, OUTPUT_SUFFIX));
        ConversionJob { input, output }
    }
}

/// The fixed job list, resolved against `base_dir`
pub fn default_jobs(base_dir: &Path) -> Vec<ConversionJob> {
    DEFAULT_INPUTS
        .iter()
        .map(|name| ConversionJob::beside(base_dir.join(name)))
        .collect()
}

/// How a single job ended
#[derive(Debug)]
pub enum JobOutcome {
    Converted(ConversionReport),
    FileNotFound(PathBuf),
    Failed(ConversionError),
}

impl JobOutcome {
    fn from_result(result: ConversionResult<ConversionReport>) -> Self {
        match result {
            Ok(report) => JobOutcome::Converted(report),
            Err(ConversionError::FileNotFound(path)) => JobOutcome::FileNotFound(path),
            Err(e) => JobOutcome::Failed(e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Converted(_))
    }
}

/// Outcomes of a batch, in job order
#[derive(Debug)]
pub struct BatchSummary {
    pub outcomes: Vec<(ConversionJob, JobOutcome)>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|(_, outcome)| outcome.is_success()).count()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Converts one job with the PROJ-backed transform
pub fn run_job(job: &ConversionJob) -> JobOutcome {
    let outcome = JobOutcome::from_result(convert_geojson(&job.input, &job.output));
    report_outcome(job, &outcome);
    outcome
}

/// Runs every job in order. A failing job is reported and skipped.
pub fn run_batch(jobs: &[ConversionJob]) -> BatchSummary {
    run_each(jobs, run_job)
}

/// `run_batch` with a caller-supplied position transform
pub fn run_batch_with<T>(jobs: &[ConversionJob], transform: &T) -> BatchSummary
where
    T: LeafTransform + ?Sized,
{
    run_each(jobs, |job| {
        let outcome = JobOutcome::from_result(convert_geojson_with(&job.input, &job.output, transform));
        report_outcome(job, &outcome);
        outcome
    })
}

fn run_each<F>(jobs: &[ConversionJob], mut run: F) -> BatchSummary
where
    F: FnMut(&ConversionJob) -> JobOutcome,
{
    let outcomes = jobs.iter().map(|job| (job.clone(), run(job))).collect();
    BatchSummary { outcomes }
}

fn report_outcome(job: &ConversionJob, outcome: &JobOutcome) {
    match outcome {
        JobOutcome::Converted(_) => {}
        JobOutcome::FileNotFound(path) => {
            error!("ERROR: File not found: {}", path.display());
        }
        JobOutcome::Failed(e) => {
            error!("ERROR converting {}: {}", job.input.display(), e);
            error!("{}", error_chain(e));
            error!("{:?}", e);
        }
    }
}

/// Prints the closing banner and the operator follow-up steps
pub fn report_summary(summary: &BatchSummary) {
    println!("\n{}", "=".repeat(70));
    println!(
        "Conversion complete! ({}/{} files converted)",
        summary.succeeded(),
        summary.total()
    );
    println!("{}", "=".repeat(70));
    println!("\nNEXT STEPS:");
    for step in NEXT_STEPS {
        println!("{}", step);
    }
}
