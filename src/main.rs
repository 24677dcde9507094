// ,--.   ,--.                    ,--.  ,--.       ,--.
// |  |   |  | ,--,--.,--.--.,---.|  ,'.|  | ,---.,-'  '-.
// |  |.'.|  |' ,-.  ||  .--| .-. |  |' '  || .-. :-.  .-'
// |   ,'.   |\ '-'  ||  |  \   --|  | `   |\   --. |  |
// '--'   '--' `--`--'`--'   `----`--'  `--' `----' `--'

// Smart-warehouse IoT security experiments: weak vs secure controller
// postures over a lossy, latent (simulated) network.

// Copyright 2026 The WareNet Authors

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use warenet::controller::Mode;
use warenet::experiment::{Experiment, ExperimentConfig, ExperimentResults};
use warenet::metrics::logger::RecordLogger;
use warenet::metrics::{comparison_table, print_summary, summarize, Summary};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Instant;
use tracing::{info, Level};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one experiment in a single security mode
    Run {
        /// Security mode for the controller: weak or secure
        #[arg(short, long)]
        mode: String,
        #[arg(short = 'n', long, default_value_t = 3)]
        devices: u32,
        #[arg(short, long, default_value_t = 100)]
        legit_per_device: u32,
        #[arg(short, long, default_value_t = 100)]
        rogue_messages: u32,
        #[arg(long, default_value_t = 0.05)]
        loss: f64,
        #[arg(long, default_value_t = 10.0)]
        latency_min: f64,
        #[arg(long, default_value_t = 100.0)]
        latency_max: f64,
        #[arg(long, default_value_t = 5.0)]
        overhead: f64,
        /// Fix the RNG seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,
        /// Optional path to save raw per-message records as CSV
        #[arg(short, long)]
        output: Option<String>,
        /// Optional path to save the summary as JSON
        #[arg(long)]
        json: Option<String>,
    },

    /// Run both modes on the same configuration and compare them
    Compare {
        #[arg(short = 'n', long, default_value_t = 3)]
        devices: u32,
        #[arg(short, long, default_value_t = 100)]
        legit_per_device: u32,
        #[arg(short, long, default_value_t = 100)]
        rogue_messages: u32,
        #[arg(long, default_value_t = 0.05)]
        loss: f64,
        #[arg(long, default_value_t = 10.0)]
        latency_min: f64,
        #[arg(long, default_value_t = 100.0)]
        latency_max: f64,
        #[arg(long, default_value_t = 5.0)]
        overhead: f64,
        #[arg(long, default_value_t = 3)]
        repetitions: u32,
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let program_start = Instant::now();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            mode,
            devices,
            legit_per_device,
            rogue_messages,
            loss,
            latency_min,
            latency_max,
            overhead,
            seed,
            output,
            json,
        } => {
            // Fail fast on a bad mode before anything is simulated.
            let mode: Mode = mode.parse()?;
            let config = build_config(
                devices,
                legit_per_device,
                rogue_messages,
                loss,
                latency_min,
                latency_max,
                overhead,
                seed,
            );
            run_single(mode, config, output, json)?;
        }

        Commands::Compare {
            devices,
            legit_per_device,
            rogue_messages,
            loss,
            latency_min,
            latency_max,
            overhead,
            repetitions,
            seed,
        } => {
            let config = build_config(
                devices,
                legit_per_device,
                rogue_messages,
                loss,
                latency_min,
                latency_max,
                overhead,
                seed,
            );
            compare_modes(config, repetitions)?;
        }
    }

    info!(
        "Total runtime: {:.2}s",
        program_start.elapsed().as_secs_f64()
    );

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_config(
    devices: u32,
    legit_per_device: u32,
    rogue_messages: u32,
    loss: f64,
    latency_min: f64,
    latency_max: f64,
    overhead: f64,
    seed: Option<u64>,
) -> ExperimentConfig {
    let mut config = ExperimentConfig::default()
        .with_traffic(devices, legit_per_device, rogue_messages)
        .with_loss(loss);
    config.latency_range_ms = (latency_min, latency_max);
    config.security_overhead_ms = overhead;
    config.seed = seed;
    config
}

fn run_single(
    mode: Mode,
    config: ExperimentConfig,
    output: Option<String>,
    json: Option<String>,
) -> Result<()> {
    let results = Experiment::new(mode, config).run()?;
    let summary = summarize(&results);
    print_summary(&summary);

    if let Some(path) = output {
        save_records(&path, &results)?;
    }
    if let Some(path) = json {
        std::fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
        info!("Summary saved to: {}", path);
    }

    Ok(())
}

fn compare_modes(config: ExperimentConfig, repetitions: u32) -> Result<()> {
    info!("WareNet: weak vs secure comparison");
    info!("Repetitions per mode: {}", repetitions);

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    std::fs::create_dir_all("results")?;

    let mut summaries: Vec<Summary> = Vec::new();

    for mode in [Mode::Weak, Mode::Secure] {
        info!("Testing mode: {}", mode);

        // Pool the repetitions into one record set so the summary counts
        // cover all runs of the mode.
        let mut pooled = ExperimentResults {
            mode,
            records: Vec::new(),
        };

        for rep in 0..repetitions {
            let mut rep_config = config.clone();
            rep_config.name = format!("{}_{}_{}", config.name, mode, rep + 1);
            // Offset the seed per repetition so runs differ but the whole
            // comparison stays reproducible.
            rep_config.seed = config.seed.map(|s| s + rep as u64);

            let results = Experiment::new(mode, rep_config).run()?;
            pooled.records.extend(results.records);
        }

        let csv_path = format!("results/{}_{}_{}.csv", config.name, mode, timestamp);
        save_records(&csv_path, &pooled)?;

        let summary = summarize(&pooled);
        print_summary(&summary);
        summaries.push(summary);
    }

    comparison_table(&summaries);

    let json_path = format!("results/{}_comparison_{}.json", config.name, timestamp);
    std::fs::write(&json_path, serde_json::to_string_pretty(&summaries)?)?;
    info!("Comparison saved to: {}", json_path);

    Ok(())
}

fn save_records(path: &str, results: &ExperimentResults) -> Result<()> {
    let mut logger = RecordLogger::new(path)?;
    logger.log_batch(&results.records)?;
    info!("Raw records saved to: {}", path);
    Ok(())
}
