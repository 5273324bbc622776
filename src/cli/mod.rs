pub mod output;
pub mod watch;

use std::{fmt::Display, path::PathBuf, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use output::{render_habits, render_monthly, render_productivity, render_report};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{level_filters::LevelFilter, warn};
use watch::{detect_shutdown, watch};

use crate::{
    stats::{StatsReport, StatsService},
    store::record_store::DirRecordStore,
    utils::{
        clock::{Clock, DefaultClock, FixedClock},
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "lifestats", version, long_about = None)]
#[command(about = "Rolling statistics over your tasks, habits, focus sessions, expenses and books", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(
        long,
        global = true,
        help = "Application directory, collections are read from its records/ subdirectory. By default $XDG_STATE_HOME/lifestats or $HOME/.local/state/lifestats"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable verbose logging to the console")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Evaluate as if it were this moment. Examples are \"yesterday\", \"1 week ago\", \"15/03/2025\""
    )]
    at: Option<String>,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, global = true, help = "Print JSON instead of text")]
    json: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Tasks, focus time, books and spending of the current month")]
    Month,
    #[command(about = "Habit consistency for the current week, with streaks")]
    Habits,
    #[command(about = "Productivity score of the last 7 days")]
    Productivity,
    #[command(about = "Everything at once. This is the default")]
    Summary,
    #[command(about = "Print the summary again on a fixed interval until interrupted")]
    Watch {
        #[arg(long, default_value_t = 60, help = "Seconds between refreshes")]
        every: u64,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args.dir.clone().map_or_else(create_application_default_path, Ok)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let clock: Box<dyn Clock> = match &args.at {
        Some(at) => Box::new(FixedClock(parse_moment(at, args.date_style, Local::now())?)),
        None => Box::new(DefaultClock),
    };
    let service = StatsService::new(DirRecordStore::new(app_dir.join("records"))?, clock);

    match args.commands.unwrap_or(Commands::Summary) {
        Commands::Month => {
            let report = service.refresh().await;
            print_section(args.json, &report.monthly, || render_monthly(&report.monthly))
        }
        Commands::Habits => {
            let report = service.refresh().await;
            print_section(
                args.json,
                &HabitsSection {
                    habits: &report.habits,
                    streaks: &report.streaks,
                },
                || render_habits(&report.habits, &report.streaks),
            )
        }
        Commands::Productivity => {
            let report = service.refresh().await;
            print_section(args.json, &report.productivity, || {
                render_productivity(&report.productivity)
            })
        }
        Commands::Summary => {
            let report = service.refresh().await;
            print_section(args.json, &report, || render_report(&report))
        }
        Commands::Watch { every } => {
            if every == 0 {
                return Err(Args::command()
                    .error(
                        clap::error::ErrorKind::ValueValidation,
                        "Refresh interval must be at least 1 second",
                    )
                    .into());
            }
            let json = args.json;
            let shutdown = CancellationToken::new();
            let (_, result) = tokio::join!(
                detect_shutdown(shutdown.clone()),
                async {
                    let result = watch(
                        &service,
                        Duration::from_secs(every),
                        shutdown.clone(),
                        |report: &StatsReport| {
                            if !json {
                                // Clear the terminal between refreshes.
                                print!("\x1B[2J\x1B[H");
                            }
                            print_section(json, report, || render_report(report))
                        },
                    )
                    .await;
                    shutdown.cancel();
                    result
                }
            );
            result
        }
    }
}

#[derive(Serialize)]
struct HabitsSection<'a> {
    habits: &'a [crate::stats::habits::HabitConsistency],
    streaks: &'a [crate::stats::habits::HabitStreak],
}

fn print_section<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

/// Reads `--at`. Bare dates are taken at the current time of day, like every other phrase
/// chrono-english understands.
fn parse_moment(value: &str, style: DateStyle, now: DateTime<Local>) -> Result<DateTime<Utc>> {
    match parse_date_string(value, now, style.into()) {
        Ok(v) => {
            if v > now {
                warn!("Evaluating at {v}, which is in the future");
            }
            Ok(v.with_timezone(&Utc))
        }
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {value}: {e}"),
            )
            .into()),
    }
}
