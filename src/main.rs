//! site-harvest command line entry point.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use site_harvest::Config;

#[derive(Parser)]
#[command(
    name = "site-harvest",
    about = "Fetch a list of web pages with bounded retries and save them as url,data CSV",
    version
)]
struct Cli {
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output CSV file (overrides the configuration).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Attempts per endpoint, including the first.
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Per-attempt timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Backoff after a connection failure or timeout, in seconds.
    #[arg(long)]
    backoff_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Endpoints to fetch (replaces the configured list).
    urls: Vec<String>,
}

impl Cli {
    /// Layer command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if let Some(max_attempts) = self.max_attempts {
            config.fetch.max_attempts = max_attempts;
        }
        if let Some(secs) = self.timeout_secs {
            config.fetch.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.backoff_secs {
            config.fetch.backoff = Duration::from_secs(secs);
        }
        if !self.urls.is_empty() {
            config.endpoints = self.urls.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };
    cli.apply(&mut config);

    let summary = site_harvest::run(&config)
        .await
        .context("collection run failed")?;

    for skipped in &summary.skipped {
        eprintln!("skipped {} ({})", skipped.endpoint, skipped.kind);
    }
    println!(
        "Collected {} of {} endpoints into {}",
        summary.collected,
        config.endpoints.len(),
        config.output_path().display()
    );
    println!("Data collection complete.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_configuration() {
        let cli = Cli::parse_from([
            "site-harvest",
            "--output",
            "out.csv",
            "--max-attempts",
            "5",
            "--timeout-secs",
            "4",
            "--backoff-secs",
            "1",
            "http://a.test",
            "http://b.test",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.output.path, PathBuf::from("out.csv"));
        assert_eq!(config.fetch.max_attempts, 5);
        assert_eq!(config.fetch.timeout, Duration::from_secs(4));
        assert_eq!(config.fetch.backoff, Duration::from_secs(1));
        assert_eq!(config.endpoints, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn no_arguments_keep_defaults() {
        let cli = Cli::parse_from(["site-harvest"]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config, Config::default());
    }
}
