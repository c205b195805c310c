use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use teebot_core::{
    fetch_sheet_preferences, load_config, next_play_date, validate_config, BookingRunner,
    ClubhouseSessionFactory, Config, FsRecordingSink, RecordingSink, ReleaseGate, RunRequest,
    RunStatus, SessionFactory,
};

#[derive(Parser)]
#[command(
    name = "teebot",
    about = "Books tee times the moment the sheet opens",
    long_about = None
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the number of tee times to book
    #[arg(long)]
    slots: Option<usize>,

    /// Override the sheet open time (HH:MM, club-local)
    #[arg(long)]
    open_time: Option<String>,

    /// Book a specific date instead of the next play day (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Override the join deadline in seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Record a per-session action transcript
    #[arg(long)]
    record: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(status) => match status {
            RunStatus::Complete | RunStatus::Partial => ExitCode::SUCCESS,
            RunStatus::Failed | RunStatus::Error => ExitCode::FAILURE,
        },
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunStatus> {
    // Load configuration; a run is never aborted for configuration
    // reasons, so anything unusable degrades to the built-in fallback.
    info!("Loading configuration from {:?}", cli.config);
    let mut config = match load_config(&cli.config) {
        Ok(config) => match validate_config(&config) {
            Ok(()) => config,
            Err(e) => {
                warn!(error = %e, "configuration invalid, using built-in fallback");
                Config::fallback()
            }
        },
        Err(e) => {
            warn!(error = %e, "configuration unavailable, using built-in fallback");
            Config::fallback()
        }
    };

    if let Some(slots) = cli.slots {
        config.booking.slots_to_book = slots;
    }
    if let Some(open_time) = cli.open_time {
        config.booking.open_time = open_time;
    }
    if let Some(deadline_secs) = cli.deadline_secs {
        config.booking.deadline_secs = deadline_secs;
    }
    if cli.record {
        config.session.record = true;
    }

    // The remote sheet, when configured and reachable, replaces the inline
    // preference list.
    if let Some(sheet_config) = &config.sheet {
        match fetch_sheet_preferences(sheet_config).await {
            Ok(preferences) if !preferences.is_empty() => {
                config.preferences = preferences;
            }
            Ok(_) => {
                warn!("preference sheet is empty, keeping inline preferences");
            }
            Err(e) => {
                warn!(error = %e, "preference sheet unavailable, keeping inline preferences");
            }
        }
    }

    let offset = config.booking.utc_offset()?;
    let open_time = config.booking.open_time()?;
    let play_day = config.booking.play_day()?;

    let today = Utc::now().with_timezone(&offset).date_naive();
    let date = cli.date.unwrap_or_else(|| next_play_date(today, play_day));
    let open_at = ReleaseGate::at_time_today(open_time, offset).open_at();

    info!(
        slots = config.booking.slots_to_book,
        preferences = config.preferences.len(),
        %date,
        %open_at,
        "starting booking run"
    );

    let factory: Arc<dyn SessionFactory> =
        Arc::new(ClubhouseSessionFactory::new(config.session.clone()));
    let mut runner = BookingRunner::new(factory);
    if let Some(archive) = &config.archive {
        let sink: Arc<dyn RecordingSink> = Arc::new(FsRecordingSink::new(&archive.dir, date));
        runner = runner.with_recording_sink(sink);
    }

    let request = RunRequest::new(
        config.preferences.clone(),
        config.booking.slots_to_book,
        date,
        open_at,
    )
    .with_deadline(Duration::from_secs(config.booking.deadline_secs))
    .with_refresh_settle(Duration::from_millis(config.booking.refresh_settle_ms));

    let report = runner.run(request).await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(report.status)
}
