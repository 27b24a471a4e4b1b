//! Inspect and edit the schedule store from the command line.
//!
//! Usage: diary [--data-dir DIR] <COMMAND>
//!   resolve [--date D]                        lessons of every day as of D
//!   week    [--date D]                        Monday..Saturday of D's week
//!   set --day DAY --date D --slot N --subject S
//!   upgrade                                   rewrite a legacy store in place

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use school_diary::{
    models::schedule::{Day, Lessons},
    services::schedule::ScheduleService,
    store::JsonStore,
};

#[derive(Parser)]
#[command(name = "diary", about = "Inspect and edit the school diary schedule")]
struct Args {
    /// Directory holding the JSON documents
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the lessons of every day as of a date
    Resolve {
        /// Date to resolve (YYYY-MM-DD), today if omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print Monday to Saturday of the week containing a date
    Week {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Set one lesson slot for the week containing a date
    Set {
        /// Day label ("Понедельник") or English name ("monday")
        #[arg(long)]
        day: Day,
        #[arg(long)]
        date: NaiveDate,
        /// Slot number, starting at 0
        #[arg(long)]
        slot: usize,
        /// Subject name; empty clears the slot
        #[arg(long, default_value = "")]
        subject: String,
    },
    /// Load the schedule (upgrading a legacy layout) and save it back
    Upgrade,
}

fn print_lessons(header: &str, lessons: &Lessons) {
    println!("{header}");
    for (slot, subject) in lessons.iter().enumerate() {
        let subject = if subject.is_empty() { "-" } else { subject };
        println!("  {}. {}", slot + 1, subject);
    }
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let store = JsonStore::new(args.data_dir);
    let today = Local::now().date_naive();

    match args.command {
        Command::Resolve { date } => {
            let date = date.unwrap_or(today);
            let schedule = store.load_schedule()?;
            println!("Schedule as of {date}");
            for (day, lessons) in ScheduleService::resolve_for_date(&schedule, date) {
                print_lessons(day.label(), &lessons);
            }
        }
        Command::Week { date } => {
            let date = date.unwrap_or(today);
            let schedule = store.load_schedule()?;
            for column in ScheduleService::week_view(&schedule, date)? {
                let header = format!("{} {}", column.day, column.date.format("%d.%m.%Y"));
                print_lessons(&header, &column.lessons);
            }
        }
        Command::Set {
            day,
            date,
            slot,
            subject,
        } => {
            let schedule = ScheduleService::edit(&store, day, date, slot, &subject)?;
            let lessons = ScheduleService::resolve_day(&schedule, day, date);
            let header = format!("{} from {}", day, ScheduleService::week_start(date)?);
            print_lessons(&header, &lessons);
        }
        Command::Upgrade => {
            let schedule = ScheduleService::upgrade(&store)?;
            tracing::info!(
                versions = schedule.version_count(),
                path = %store.data_dir().display(),
                "Schedule rewritten"
            );
        }
    }

    Ok(())
}
