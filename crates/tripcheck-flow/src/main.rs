//! tripcheck - runs the travel-policy first-purchase scenario against a real Chrome.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tripcheck_core::AppConfig;
use tripcheck_flow::Scenario;

/// Browser check of the travel-policy purchase wizard
#[derive(Parser, Debug)]
#[command(name = "tripcheck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Run Chrome without a window
    #[arg(long, conflicts_with = "headed")]
    headless: bool,

    /// Run Chrome with a visible window
    #[arg(long)]
    headed: bool,

    /// Landing page of the purchase wizard
    #[arg(long)]
    base_url: Option<String>,

    /// Trip length the site should display
    #[arg(long)]
    requested_days: Option<u32>,

    /// Days from today until departure
    #[arg(long)]
    depart_offset_days: Option<u32>,
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if self.headless {
            config.browser.headless = true;
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(ref base_url) = self.base_url {
            config.site.base_url = base_url.clone();
        }
        if let Some(days) = self.requested_days {
            config.trip.requested_days = days;
        }
        if let Some(offset) = self.depart_offset_days {
            config.trip.depart_offset_days = offset;
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tripcheck=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let args = Args::parse();

    info!("Starting tripcheck v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        AppConfig::load_with_env(args.config.as_deref()).context("failed to load configuration")?;
    args.apply(&mut config);

    let today = chrono::Local::now().date_naive();
    let report = Scenario::first_purchase(&config, today)
        .await
        .context("invalid scenario setup")?;

    println!("{report}");
    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "tripcheck",
            "--headless",
            "--base-url",
            "https://example.com/travel",
            "--requested-days",
            "10",
        ]);
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert!(config.browser.headless);
        assert_eq!(config.site.base_url, "https://example.com/travel");
        assert_eq!(config.trip.requested_days, 10);
        assert_eq!(config.trip.depart_offset_days, 7);
    }

    #[test]
    fn test_headless_conflicts_with_headed() {
        assert!(Args::try_parse_from(["tripcheck", "--headless", "--headed"]).is_err());
    }
}
