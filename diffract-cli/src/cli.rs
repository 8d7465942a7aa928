use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Simulate coherent X-ray diffraction patterns of single particles."
)]
pub struct Cli {
    /// Experiment description in TOML format.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Directory for the per-particle intensity CSV files.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Also write the coherent sum of all particles as `coherent.csv`.
    #[arg(long)]
    pub coherent: bool,

    /// Increase verbosity level (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, value_name = "NUM")]
    pub threads: Option<usize>,
}
