//! Replays a recording of device batches (one JSON payload per line, as
//! polled from the sensor module) through the pipeline and prints what came
//! out, for tuning the filter band and detector offline.

use std::error::Error;
use std::io::{BufRead, BufReader};

use pulseox::{parse_batch, Pipeline, PipelineConfig, Series, TimeRef};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = std::env::args().collect::<Vec<_>>();
    let path = args.get(1).ok_or("usage: replay <batches.jsonl>")?;
    let file = std::fs::File::open(path)?;

    let mut pipeline = Pipeline::from_config(PipelineConfig::default())?;

    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let batch = parse_batch(&line)?;
        let summary = pipeline.ingest(&batch);
        log::debug!(
            "{} records -> +{} samples +{} beats +{} rates",
            batch.len(),
            summary.new_samples,
            summary.new_beats,
            summary.new_rates
        );
    }

    println!(
        "{} samples, {} beats, {} smoothed rates",
        pipeline.samples().len(),
        pipeline.beats().len(),
        pipeline.smoothed_rates().len()
    );
    if let Some(last) = pipeline.smoothed_rates().last() {
        println!("last smoothed rate: {:.1} bpm", last.bpm);
    }
    let (min, max) = pipeline.min_max(8.0);
    println!(
        "trailing 8 s range across {}/{}/{}: {min:.1} .. {max:.1}",
        Series::Ir.name(),
        Series::Red.name(),
        Series::HeartRate.name()
    );
    if let Some(t) = pipeline.last_display_time() {
        let fresh = pipeline.rates_later_than(TimeRef::Display(t - 60.0));
        println!("{} rates in the last minute", fresh.len());
    }

    Ok(())
}
