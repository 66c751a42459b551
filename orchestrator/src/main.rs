use std::{env, fs};

use anyhow::{Context, Result, bail};
use log::info;
use serde::Serialize;

use orchestrator::{configs::TrainRequest, train};

const USAGE: &str = "usage: orchestrator <request.json> [model.bin]";

#[derive(Serialize)]
struct Summary<'a> {
    observation_columns: &'a [String],
    value_column: &'a str,
    weights: &'a [f64],
    intercept: f64,
    serialized_bytes: usize,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let Some(request_path) = args.next() else {
        bail!(USAGE);
    };
    let model_path = args.next();

    let raw = fs::read_to_string(&request_path)
        .with_context(|| format!("could not read {request_path}"))?;
    let request: TrainRequest =
        serde_json::from_str(&raw).with_context(|| format!("invalid request {request_path}"))?;

    let frame = request.frame.build()?;
    info!(
        "loaded {} row(s) in {} partition(s) from {request_path}",
        frame.num_rows(),
        frame.num_partitions()
    );

    let model = train(&frame, &request.config)?;

    if let Some(path) = model_path {
        fs::write(&path, &model.serialized_model)
            .with_context(|| format!("could not write model to {path}"))?;
        info!("model written to {path}");
    }

    let summary = Summary {
        observation_columns: &model.observation_columns,
        value_column: &model.value_column,
        weights: &model.weights,
        intercept: model.intercept,
        serialized_bytes: model.serialized_model.len(),
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
