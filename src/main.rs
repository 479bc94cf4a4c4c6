use std::error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use bibstats::{ReportOptions, StatsError};

use clap::Parser as CLIParser;
use tracing_subscriber::EnvFilter;

/// Analyze .bib files and report publication statistics in Markdown.
#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Settings {
    /// .bib files to analyze
    #[clap(required = true, min_values = 1)]
    files: Vec<PathBuf>,

    /// Write the report to this file instead of stdout
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Number of rows in the ranked tables
    #[clap(short = 'n', long, default_value_t = 10)]
    top: usize,

    /// Emit the statistics as JSON instead of Markdown
    #[cfg(feature = "serde_json")]
    #[clap(long)]
    json: bool,
}

fn render(settings: &Settings, stats: &bibstats::Statistics) -> Result<String, Box<dyn error::Error>> {
    let names: Vec<String> = settings
        .files
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();

    #[cfg(feature = "serde_json")]
    {
        if settings.json {
            return Ok(bibstats::render_json(stats, &names)?);
        }
    }

    let options = ReportOptions { top: settings.top };
    Ok(bibstats::render_markdown(stats, &names, &options))
}

fn main() -> Result<(), Box<dyn error::Error>> {
    let settings = Settings::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let progress = |path: &Path| eprintln!("Processing {}...", path.display());
    let stats = match bibstats::analyze_files_with(&settings.files, progress) {
        Ok(stats) => stats,
        Err(StatsError::InputNotFound(path)) => {
            eprintln!("Error: File '{}' not found.", path.display());
            process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let report = render(&settings, &stats)?;
    match &settings.output {
        Some(path) => {
            fs::write(path, format!("{}\n", report))?;
            eprintln!("Report written to {}", path.display());
        }
        None => println!("{}", report),
    }

    Ok(())
}
