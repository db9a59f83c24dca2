use colony_grid::config::load_config;
use colony_grid::{run_batch, PlatePipeline};
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn usage() -> String {
    "Usage: colony_grid <config.json>".to_string()
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).map(PathBuf::from).ok_or_else(usage)?;
    let config = load_config(&config_path).map_err(|e| e.to_string())?;
    let settings = config.resolve_settings().map_err(|e| e.to_string())?;
    let pipeline = PlatePipeline::new(settings);

    let summary = run_batch(&pipeline, &config.input, &config.batch, &config.output)
        .map_err(|e| e.to_string())?;
    println!(
        "{} pictures: {} analysed, {} skipped, {} segmentation failures, {} QC failures, {} errors",
        summary.total,
        summary.succeeded,
        summary.skipped,
        summary.segmentation_failures,
        summary.qc_failures,
        summary.errors
    );
    Ok(())
}
