use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "nitro-rush-sim",
    about = "A tick-driven top-down racing simulator written in Rust"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing (only for non-watch mode)
    #[clap(short, long)]
    pub debug: bool,

    /// Activate watch mode - the session is simulated in real-time with display frames printed
    #[clap(short, long)]
    pub watch: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the scenario file (OPTIONAL: if not set, uses a hardcoded full-throttle run)
    #[clap(short, long)]
    pub scenario_path: Option<PathBuf>,

    /// Set real-time factor (only relevant in watch mode)
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set simulation timestep size in milliseconds
    #[clap(short, long, default_value = "16.67")]
    pub timestep_ms: f64,

    /// Set the tick budget after which an unfinished session is aborted
    #[clap(short, long, default_value = "36000")]
    pub max_ticks: u64,
}
