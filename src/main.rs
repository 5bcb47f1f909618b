use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use std::path::PathBuf;
use grid_to_wgs84::{default_jobs, process_jobs, ConversionJob, DEFAULT_BASE_DIR};

fn main() {
    let matches = Command::new("GIS WGS84 Converter")
        .version("1.0")
        .author("Jesper Fjellin")
        .about("Converts GeoJSON layers from Palestine 1923 Grid (EPSG:28191) to WGS84 (EPSG:4326)")
        .arg(
            Arg::new("dir")
                .short('d')
                .long("dir")
                .num_args(1)
                .default_value(DEFAULT_BASE_DIR)
                .help("Directory holding the default GeoJSON layers"),
        )
        .arg(
            Arg::new("job")
                .short('j')
                .long("job")
                .num_args(2)
                .value_names(["INPUT", "OUTPUT"])
                .action(ArgAction::Append)
                .help("Input and output file to convert (repeatable, replaces the default layers)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug output"),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .target(env_logger::Target::Stdout)
        .init();

    // Explicit jobs come in INPUT OUTPUT pairs
    let explicit: Vec<PathBuf> = matches
        .get_many::<String>("job")
        .map(|values| values.map(PathBuf::from).collect())
        .unwrap_or_default();

    let jobs: Vec<ConversionJob> = if explicit.is_empty() {
        let base_dir = matches
            .get_one::<String>("dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_DIR));
        default_jobs(&base_dir)
    } else {
        explicit
            .chunks(2)
            .map(|pair| ConversionJob::new(pair[0].clone(), pair[1].clone()))
            .collect()
    };

    println!("{}", "=".repeat(70));
    println!("GIS Coordinate Conversion Tool - FollowUp Project");
    println!("Converting from Palestine 1923 Grid to WGS84");
    println!("{}", "=".repeat(70));

    // Per-job failures are reported inside the batch; the process still exits 0
    process_jobs(&jobs);
}
