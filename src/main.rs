#![warn(clippy::pedantic)]

mod listing;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use lessons::{Date, Day, Lesson, Timetable};
use log::info;
use thiserror::Error;

use crate::listing::Listing;

#[derive(Debug, Parser)]
#[command(version, about = "Edit and inspect a class timetable file")]
struct Command {
    /// Timetable file
    #[arg(short, long, env = "TIMETABLE_FILE", default_value = "timetable.dat")]
    file: PathBuf,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Create an empty timetable, replacing the file
    New {
        /// Alternate between two weekly patterns
        #[arg(long)]
        double: bool,

        /// First day of the schedule, defaults to the start of the current term
        #[arg(long, value_name = "YYYY-MM-DD")]
        first_day: Option<Date>,
    },
    /// Print the lessons of a day
    Show {
        #[command(flatten)]
        target: Target,
    },
    /// Put a lesson into a slot
    Set {
        #[command(flatten)]
        target: Target,

        /// Slot number, starting at 0
        #[arg(long)]
        slot: usize,

        #[command(flatten)]
        lesson: LessonArgs,
    },
    /// Free a slot
    Clear {
        #[command(flatten)]
        target: Target,

        /// Slot number, starting at 0
        #[arg(long)]
        slot: usize,
    },
    /// Cancel all lessons on a date, optionally moving them to another date
    Holiday {
        #[arg(value_name = "YYYY-MM-DD")]
        date: Date,

        #[arg(long, value_name = "YYYY-MM-DD")]
        shift: Option<Date>,
    },
    /// Remove all holidays and per-date changes
    Flush,
    /// Repair text that was read with the wrong encoding
    FixEncoding {
        /// Encoding the text was wrongly decoded with, e.g. windows-1251
        label: String,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct Target {
    /// Calendar date
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<Date>,

    /// Weekday of the recurring schedule, Monday = 1, second week Monday = 8
    #[arg(long)]
    weekday: Option<i32>,
}

#[derive(Debug, Args)]
struct LessonArgs {
    /// Full name
    #[arg(long)]
    name: String,
    #[arg(long)]
    short: Option<String>,
    #[arg(long)]
    building: Option<String>,
    #[arg(long)]
    room: Option<String>,
    #[arg(long)]
    teacher: Option<String>,
    /// Lecture, seminar, lab...
    #[arg(long)]
    kind: Option<String>,
    #[arg(long)]
    comment: Option<String>,
}

impl From<LessonArgs> for Lesson {
    fn from(args: LessonArgs) -> Self {
        Lesson {
            full_name: Some(args.name),
            short_name: args.short,
            building: args.building,
            room: args.room,
            teacher: args.teacher,
            kind: args.kind,
            comment: args.comment,
        }
    }
}

#[derive(Error, Debug)]
enum Error {
    #[error("Failed to load timetable: {0}")]
    Load(#[from] lessons::parse::Error),
    #[error("Failed to save timetable: {0}")]
    Save(#[from] lessons::format::Error),
    #[error("{0}")]
    Encoding(#[from] lessons::encoding::Error),
}

fn day_of(timetable: &Timetable, target: &Target) -> Day {
    match (target.date, target.weekday) {
        (Some(date), _) => timetable.lessons(date).clone(),
        (None, weekday) => timetable.weekday_lessons(weekday.unwrap_or(1)).clone(),
    }
}

fn set(timetable: &mut Timetable, target: &Target, slot: usize, lesson: Option<Lesson>) {
    match (target.date, target.weekday) {
        (Some(date), _) => timetable.set_lesson(lesson, date, slot),
        (None, weekday) => timetable.set_weekday_lesson(lesson, weekday.unwrap_or(1), slot),
    }
}

fn apply(timetable: &mut Timetable, action: Action) -> Result<(), Error> {
    match action {
        Action::Set {
            target,
            slot,
            lesson,
        } => set(timetable, &target, slot, Some(lesson.into())),
        Action::Clear { target, slot } => set(timetable, &target, slot, None),
        Action::Holiday {
            date,
            shift: Some(shift),
        } => timetable.shift_holiday(date, shift),
        Action::Holiday { date, shift: None } => timetable.add_holiday(date),
        Action::Flush => timetable.flush_holidays(),
        Action::FixEncoding { label } => timetable.fix_encoding(&label)?,
        Action::New { .. } | Action::Show { .. } => {}
    }
    Ok(())
}

fn run(Command { file, action }: Command) -> Result<(), Error> {
    let timetable = match action {
        Action::New { double, first_day } => {
            let timetable = first_day.map_or_else(
                || Timetable::new(double),
                |first_day| Timetable::with_first_day(double, first_day),
            );
            info!("Starting a new timetable on {}", timetable.first_day());
            timetable
        }
        Action::Show { target } => {
            let timetable = Timetable::load_from(&file)?;
            print!("{}", Listing(&day_of(&timetable, &target)));
            return Ok(());
        }
        action => {
            let mut timetable = Timetable::load_from(&file)?;
            apply(&mut timetable, action)?;
            timetable
        }
    };
    timetable.save_as(&file)?;
    info!("Saved {}", file.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let command = Command::parse();
    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
