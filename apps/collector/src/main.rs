//! ispwatch: ISP reachability probes and UptimeRobot sync for the uptime dashboard.
//!
//! Each invocation performs one run and exits; scheduling is left to cron or CI.

mod config;
mod error;
mod probe_run;
mod storage;
mod sync;
mod uptimerobot;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use netprobe::Prober;
use tracing::{debug, error};

use config::Config;
use error::AppError;
use uptimerobot::{MonitorQuery, Timeouts, UptimeRobotClient};

/// ISP reachability prober and UptimeRobot sync
#[derive(Parser, Debug)]
#[command(name = "ispwatch", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, env = "ISPWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for CSV, JSON and summary files (overrides config file)
    #[arg(long, global = true, env = "ISPWATCH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// More output, repeat for more detail
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Less output, repeat to only show errors
    #[arg(short, long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe every configured target once
    Probe {
        /// Echo requests per target (overrides config file)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        samples: Option<u32>,

        /// Only probe the named target, may be repeated
        #[arg(short, long = "target", value_name = "NAME")]
        targets: Vec<String>,
    },
    /// Fetch monitors from UptimeRobot and store them
    Sync,
    /// Print the effective configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    logger::init(logger::level_for_verbosity(cli.verbose, cli.quiet));
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => error!("Failed to load .env: {e}"),
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::from_config(cli.config.as_deref())?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.storage.data_dir.clone());

    match cli.command {
        Command::Config => {
            println!("{config}");
            config.validate()?;
        }
        Command::Probe { samples, targets } => {
            config.validate()?;
            let mut settings = config.probe.settings();
            if let Some(samples) = samples {
                settings.sample_count = samples;
            }

            let targets = probe_run::select_targets(config.targets()?, &targets)?;
            let prober = Prober::standard(&settings)?;
            probe_run::run_probe(&prober, &targets, settings.sample_count, &data_dir).await?;
        }
        Command::Sync => {
            config.validate()?;
            let section = &config.uptimerobot;
            let client = UptimeRobotClient::new(
                &section.base_url,
                config.api_key()?,
                Timeouts {
                    account: Duration::from_secs(section.timeout_secs),
                    monitors: Duration::from_secs(section.monitors_timeout_secs),
                },
                MonitorQuery {
                    log_limit: section.log_limit,
                    response_times_limit: section.response_times_limit,
                    custom_uptime_ratios: section.custom_uptime_ratios.clone(),
                },
            )?;
            sync::run_sync(&client, Duration::from_secs(section.request_delay_secs), &data_dir)
                .await?;
        }
    }

    Ok(())
}
