//! CLI argument parsing via clap.

use clap::Parser;
use devmate::build_info;

/// A project assistant for the terminal. Describe what you want; approve what
/// it does.
#[derive(Debug, Parser)]
#[command(
    name = "devmate",
    disable_version_flag = true,
    after_help = build_info::HELP_BUILD_METADATA
)]
pub struct Args {
    /// Path to config file (default: ./devmate.toml or ~/.config/devmate/devmate.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Override model name.
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Override API base URL.
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Directory holding project_config.json and milestones.json.
    #[arg(long = "state-dir")]
    pub state_dir: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Print version and build metadata.
    #[arg(short = 'V', long = "version")]
    pub version: bool,
}
