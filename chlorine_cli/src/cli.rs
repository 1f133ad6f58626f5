//! CLI argument definitions and shared statics.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "chlorine", version, about = "Chlorine dose optimizer")]
pub struct Cli {
    /// Path to config TOML (all sections optional)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding model.json, scaler_x.json and scaler_y.json
    /// (overrides [model] in the config)
    #[arg(long = "model-dir", value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Print results and logs as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// One set of process readings given on the command line.
#[derive(Args, Debug, Clone)]
pub struct ReadingArgs {
    /// Current chlorine dose (mg/L)
    #[arg(long)]
    pub dose: f64,
    /// Flow
    #[arg(long)]
    pub flow: f64,
    /// Oxidation-reduction potential (mV)
    #[arg(long)]
    pub orp: i32,
    /// Turbidity
    #[arg(long)]
    pub turbidity: f64,
    /// pH
    #[arg(long)]
    pub ph: f64,
    /// Calendar date, YYYY-MM-DD
    #[arg(long)]
    pub date: String,
    /// Local time of day, HH:MM or HH:MM:SS
    #[arg(long)]
    pub time: String,
}

/// Per-request sweep overrides (take precedence over [sweep]).
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct SweepArgs {
    #[arg(long = "dose-min", value_name = "MG_L")]
    pub dose_min: Option<f64>,
    #[arg(long = "dose-max", value_name = "MG_L")]
    pub dose_max: Option<f64>,
    #[arg(long, value_name = "MG_L")]
    pub step: Option<f64>,
    /// Residual chlorine setpoint
    #[arg(long, value_name = "MG_L")]
    pub target: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find the dose whose predicted residual is closest to the setpoint
    #[command(allow_negative_numbers = true)]
    Optimize {
        #[command(flatten)]
        reading: ReadingArgs,
        #[command(flatten)]
        sweep: SweepArgs,
        /// Print every evaluated candidate before the result
        #[arg(long, action = ArgAction::SetTrue)]
        trace: bool,
    },
    /// Optimize every row of a readings CSV (dose,flow,orp,turbidity,ph,date,time)
    Batch {
        #[arg(long, value_name = "FILE")]
        readings: PathBuf,
        /// Worker threads (overrides [runner] workers)
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
    },
    /// Load the model artifacts, verify the column schema and run one prediction
    SelfCheck,
}
