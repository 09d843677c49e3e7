use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use ferrum::app::ViewerConfig;
use ferrum::ui::theme::{Theme, ThemeChoice};

#[derive(Parser, Debug)]
#[command(
    name = "ferrum",
    version,
    about = "Terminal viewer for git changes, commits, branches and stashes"
)]
pub struct Cli {
    /// Repository to open (any directory inside the working tree)
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,

    /// Only show changed files matching this glob pattern
    #[arg(long, value_name = "GLOB")]
    files: Option<String>,

    /// Color theme
    #[arg(long, value_enum, default_value_t = ThemeChoice::Auto)]
    theme: ThemeChoice,

    /// Seconds between background fetches (0 disables fetching)
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    fetch_interval: u64,

    /// Number of commits to list
    #[arg(long, value_name = "N", default_value_t = 50)]
    commits: usize,

    /// Write debug output to the log file
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    ferrum::logging::init_logging(cli.debug)?;

    let repo = ferrum::git::open_repo(&cli.path)?;
    let workdir = ferrum::git::repo_workdir(&repo)?;
    log::info!("opening repository at {}", workdir.display());

    let mut config = ViewerConfig::new(workdir);
    config.theme = Theme::from_choice(cli.theme);
    config.commit_limit = cli.commits.max(1);
    config.fetch_interval = (cli.fetch_interval > 0).then(|| Duration::from_secs(cli.fetch_interval));
    if let Some(pattern) = &cli.files {
        let pattern = glob::Pattern::new(pattern)
            .with_context(|| format!("Invalid glob pattern '{pattern}'"))?;
        config.file_filter = Some(pattern);
    }

    ferrum::app::run(config)
}
