use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use env_logger::Env;

use starling_actions::config::Config;
use starling_actions::core::filter::{filter_by_availability, Availability};
use starling_actions::core::item::Keyword;
use starling_actions::core::calendar::filter_to_calendar;
use starling_actions::core::daily_note::filter_to_daily_notes;
use starling_actions::core::next_action::derive_next_actions;
use starling_actions::core::normalize::normalize;
use starling_actions::core::person_date::filter_to_person_dates;
use starling_actions::core::props::{parse_focus, parse_time_minutes};
use starling_actions::core::sort::sort_actions;
use starling_actions::core::tickle::filter_to_tickles;
use starling_actions::core::upcoming::{filter_to_upcoming, TypeFilter};
use starling_actions::core::urgent::filter_to_urgent;
use starling_actions::core::waiting::filter_to_waiting;
use starling_actions::render::dashboard::display_actions;
use starling_actions::render::ical::to_ics;
use starling_actions::starling::{ItemSource, StarlingClient};
use starling_actions::{Error, Result};

#[derive(Parser)]
#[command(name = "sact", version, about = "Task and calendar views over a Starling note graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and normalize action items, printing them as JSON.
    Get {
        /// Expand repeats up to this date (inclusive).
        #[arg(short, long)]
        until: String,
        /// Extra fields to request from the index (e.g. `body`).
        #[arg(short = 'o', long = "opt")]
        opts: Vec<String>,
    },
    /// Derive next actions up to a date, printing them as JSON.
    NextActions {
        #[arg(short, long)]
        until: String,
    },
    /// Show the actions dashboard, filtered by current availability.
    Actions {
        /// The date to treat as today (defaults to the system date).
        #[arg(short = 'd', long)]
        date: Option<String>,
        /// Contexts currently available (all of an item's contexts must be).
        #[arg(short = 'c', long = "context")]
        contexts: Vec<String>,
        /// People currently available (all of an item's people must be).
        #[arg(short = 'p', long = "person")]
        people: Vec<String>,
        /// Maximum focus level available (min/low/med/high).
        #[arg(short = 'f', long)]
        focus: Option<String>,
        /// Maximum time available, e.g. `1hr 30m`.
        #[arg(short = 't', long)]
        time: Option<String>,
        /// Show only tasks.
        #[arg(long, conflicts_with = "problems")]
        tasks: bool,
        /// Show only problems.
        #[arg(long)]
        problems: bool,
    },
    /// List items upcoming by a date, printing them as JSON.
    Upcoming {
        until: String,
        #[arg(long, conflicts_with = "problems")]
        tasks: bool,
        #[arg(long)]
        problems: bool,
    },
    /// List urgent items: deadlines within a proximity window.
    Urgent {
        /// The date to treat as today (defaults to the system date).
        #[arg(short = 'd', long)]
        date: Option<String>,
        /// Days of deadline proximity that count as urgent.
        #[arg(short = 'p', long, default_value_t = 3)]
        proximity: i64,
    },
    /// List waiting-for items upcoming by a date.
    Waiting {
        #[arg(short, long)]
        until: String,
    },
    /// List tickles due by a date.
    Tickles { until: String },
    /// List daily notes in a `start:end` date range (empty start means open).
    DailyNotes { range: String },
    /// List person-related dates whose notice window opens by a date.
    Dates { until: String },
    /// List calendar entries in a `start:end` date range.
    Cal {
        range: String,
        /// Emit an iCalendar document instead of JSON.
        #[arg(long)]
        ics: bool,
    },
}

fn parse_date_arg(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| Error::Config(format!("invalid date argument: {value}")))
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59).unwrap()
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap()
}

/// Parse a `start:end` range of dates into datetimes spanning whole days.
/// An empty start (`:2024-06-30`) leaves the range open on the left.
fn parse_range(value: &str) -> Result<(Option<NaiveDateTime>, NaiveDateTime)> {
    let Some((start, end)) = value.split_once(':') else {
        return Err(Error::Config(format!(
            "invalid range argument (expected start:end): {value}"
        )));
    };
    let start = if start.is_empty() {
        None
    } else {
        Some(start_of_day(parse_date_arg(start)?))
    };
    Ok((start, end_of_day(parse_date_arg(end)?)))
}

fn today(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(d) => parse_date_arg(d),
        None => Ok(Local::now().date_naive()),
    }
}

fn type_filter(tasks: bool, problems: bool) -> TypeFilter {
    match (tasks, problems) {
        (true, _) => TypeFilter::Tasks,
        (_, true) => TypeFilter::Problems,
        _ => TypeFilter::All,
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Config(format!("failed to encode output: {e}")))?;
    println!("{rendered}");
    Ok(())
}

fn fetch_normalized(
    client: &StarlingClient,
    until: NaiveDateTime,
    extra: &[String],
) -> Result<Vec<starling_actions::core::item::NormalizedItem>> {
    let raw = client.action_items(extra)?;
    log::info!("fetched {} action items", raw.len());
    normalize(&raw, until, client)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load();
    let client = StarlingClient::new(&config.starling_api)?;

    match cli.command {
        Command::Get { until, opts } => {
            let until = end_of_day(parse_date_arg(&until)?);
            let items = fetch_normalized(&client, until, &opts)?;
            print_json(&items)
        }
        Command::NextActions { until } => {
            let until = end_of_day(parse_date_arg(&until)?);
            let items = fetch_normalized(&client, until, &[])?;
            let actions = derive_next_actions(&items, config.default_priority)?;
            print_json(&actions)
        }
        Command::Actions {
            date,
            contexts,
            people,
            focus,
            time,
            tasks,
            problems,
        } => {
            let current = today(date.as_deref())?;
            let until = end_of_day(current + Duration::days(config.expand_advance_days));
            let items = fetch_normalized(&client, until, &[])?;
            let actions = derive_next_actions(&items, config.default_priority)?;

            let availability = Availability {
                contexts,
                people,
                max_time: time
                    .as_deref()
                    .map(|t| parse_time_minutes(Some(t), "cli"))
                    .transpose()?,
                max_focus: focus
                    .as_deref()
                    .map(|f| parse_focus(Some(f), "cli"))
                    .transpose()?,
            };
            let ty = type_filter(tasks, problems);
            let mut filtered: Vec<_> = filter_by_availability(&actions, &availability)
                .into_iter()
                .filter(|a| match ty {
                    TypeFilter::All => true,
                    TypeFilter::Tasks => a.keyword() == Keyword::Todo,
                    TypeFilter::Problems => a.keyword() == Keyword::Prob,
                })
                .collect();
            sort_actions(&mut filtered);
            print!("{}", display_actions(&filtered, current, config.default_priority)?);
            Ok(())
        }
        Command::Upcoming {
            until,
            tasks,
            problems,
        } => {
            let until = end_of_day(parse_date_arg(&until)?);
            let items = fetch_normalized(&client, until, &[])?;
            let actions = derive_next_actions(&items, config.default_priority)?;
            let upcoming = filter_to_upcoming(&actions, until, type_filter(tasks, problems))?;
            print_json(&upcoming)
        }
        Command::Urgent { date, proximity } => {
            let current = today(date.as_deref())?;
            let window = end_of_day(current + Duration::days(proximity));
            // The urgency cutoff is midnight of the last proximity day, so a
            // deadline with a time of day on that day is not yet urgent.
            let cutoff = start_of_day(current + Duration::days(proximity));
            let items = fetch_normalized(&client, window, &[])?;
            let actions = derive_next_actions(&items, config.default_priority)?;
            let upcoming = filter_to_upcoming(&actions, window, TypeFilter::All)?;
            let urgent = filter_to_urgent(&upcoming, start_of_day(current), cutoff)?;
            print_json(&urgent)
        }
        Command::Waiting { until } => {
            let until = end_of_day(parse_date_arg(&until)?);
            let items = fetch_normalized(&client, until, &["body".to_string()])?;
            let waiting = filter_to_waiting(&items)?;
            let upcoming = filter_to_upcoming(&waiting, until, TypeFilter::All)?;
            print_json(&upcoming)
        }
        Command::Tickles { until } => {
            let until = end_of_day(parse_date_arg(&until)?);
            let items = fetch_normalized(&client, until, &["body".to_string()])?;
            print_json(&filter_to_tickles(&items, until)?)
        }
        Command::DailyNotes { range } => {
            let (start, end) = parse_range(&range)?;
            let items = fetch_normalized(&client, end, &["body".to_string()])?;
            print_json(&filter_to_daily_notes(&items, start, end)?)
        }
        Command::Dates { until } => {
            let until = end_of_day(parse_date_arg(&until)?);
            let items = fetch_normalized(&client, until, &["body".to_string()])?;
            print_json(&filter_to_person_dates(&items, until, &client)?)
        }
        Command::Cal { range, ics } => {
            let (start, end) = parse_range(&range)?;
            let items = fetch_normalized(&client, end, &["body".to_string()])?;
            let entries = filter_to_calendar(&items, start, end)?;
            if ics {
                print!("{}", to_ics(&entries)?);
                Ok(())
            } else {
                print_json(&entries)
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
