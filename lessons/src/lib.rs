#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod encoding;
pub mod format;
pub mod parse;
pub mod timetable;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub use chrono::NaiveDate;
use chrono::{Datelike, Duration, Local};
use derive_more::From;

pub use timetable::Timetable;

/// Number of lesson slots in a single day.
pub const SLOTS_PER_DAY: usize = 13;
/// Number of text fields in a lesson record.
pub const FIELDS_PER_LESSON: usize = 7;
/// Terminates whole records: lessons, date parts and the header marker.
pub const RECORD_SEPARATOR: char = '\u{1e}';
/// Terminates a single field inside a lesson record.
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// The lessons of one day. `None` is a free slot.
pub type Day = [Option<Lesson>; SLOTS_PER_DAY];

pub(crate) static EMPTY_DAY: Day = [const { None }; SLOTS_PER_DAY];

#[must_use]
pub fn empty_day() -> Day {
    [const { None }; SLOTS_PER_DAY]
}

/// Copies `lessons` into a fresh day, padding with free slots and dropping
/// anything past the last slot.
pub fn align_day(lessons: impl IntoIterator<Item = Option<Lesson>>) -> Day {
    let mut day = empty_day();
    for (slot, lesson) in day.iter_mut().zip(lessons) {
        *slot = lesson;
    }
    day
}

/// A calendar date used as a schedule key.
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone, From)]
pub struct Date(pub NaiveDate);

impl Date {
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from)
    }

    #[must_use]
    pub fn today() -> Self {
        Self::from(Local::now().date_naive())
    }

    /// Start of the teaching period containing `self`: 1 September from
    /// September on, 1 January before that.
    #[must_use]
    pub fn term_start(self) -> Self {
        let month = if self.0.month() >= 9 { 9 } else { 1 };
        Self::from_ymd(self.0.year(), month, 1).unwrap_or(self)
    }

    /// Monday = 1, Sunday = 7.
    #[must_use]
    pub fn weekday(self) -> usize {
        self.0.weekday().number_from_monday() as usize
    }

    /// Whole Monday-based weeks between the week of `earlier` and the week
    /// of `self`.
    #[must_use]
    pub fn weeks_since(self, earlier: Date) -> i64 {
        fn monday(date: NaiveDate) -> NaiveDate {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
        (monday(self.0) - monday(earlier.0)).num_days() / 7
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for Date {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Self::from)
    }
}

/// One class session. Every field may be absent, which is distinct from
/// holding empty text.
#[derive(Debug, Default, Eq, PartialEq, Hash, Clone)]
pub struct Lesson {
    pub full_name: Option<String>,
    pub short_name: Option<String>,
    pub building: Option<String>,
    pub room: Option<String>,
    pub teacher: Option<String>,
    /// Lecture, seminar, lab and so on.
    pub kind: Option<String>,
    /// Free text: tests, short days, homework, reminders.
    pub comment: Option<String>,
}

impl Lesson {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: Some(full_name.into()),
            ..Self::default()
        }
    }

    /// Builds a lesson from its fields in record order.
    #[must_use]
    pub fn from_fields(fields: [Option<String>; FIELDS_PER_LESSON]) -> Self {
        let [
            full_name,
            short_name,
            building,
            room,
            teacher,
            kind,
            comment,
        ] = fields;
        Self {
            full_name,
            short_name,
            building,
            room,
            teacher,
            kind,
            comment,
        }
    }

    /// Fields in record order.
    #[must_use]
    pub fn fields(&self) -> [Option<&str>; FIELDS_PER_LESSON] {
        [
            self.full_name.as_deref(),
            self.short_name.as_deref(),
            self.building.as_deref(),
            self.room.as_deref(),
            self.teacher.as_deref(),
            self.kind.as_deref(),
            self.comment.as_deref(),
        ]
    }

    pub fn fields_mut(&mut self) -> [&mut Option<String>; FIELDS_PER_LESSON] {
        [
            &mut self.full_name,
            &mut self.short_name,
            &mut self.building,
            &mut self.room,
            &mut self.teacher,
            &mut self.kind,
            &mut self.comment,
        ]
    }
}

#[cfg(test)]
mod test {
    use crate::{Date, Lesson, NaiveDate, SLOTS_PER_DAY, align_day};

    #[test]
    fn test_weekday() {
        // 2024-09-02 is a Monday
        assert_eq!(Date::from_ymd(2024, 9, 2).unwrap().weekday(), 1);
        assert_eq!(Date::from_ymd(2024, 9, 4).unwrap().weekday(), 3);
        assert_eq!(Date::from_ymd(2024, 9, 8).unwrap().weekday(), 7);
    }

    #[test]
    fn test_weeks_since() {
        let first = Date::from_ymd(2024, 9, 4).unwrap();
        let tests = [
            ((2024, 9, 2), 0),
            ((2024, 9, 8), 0),
            ((2024, 9, 9), 1),
            ((2024, 9, 22), 2),
            ((2024, 12, 30), 17),
            ((2025, 1, 6), 18),
        ];
        for ((y, m, d), weeks) in tests {
            let date = Date::from_ymd(y, m, d).unwrap();
            assert_eq!(date.weeks_since(first), weeks, "{date}");
        }
    }

    #[test]
    fn test_term_start() {
        assert_eq!(
            Date::from_ymd(2024, 10, 16).unwrap().term_start(),
            Date::from_ymd(2024, 9, 1).unwrap()
        );
        assert_eq!(
            Date::from_ymd(2024, 9, 1).unwrap().term_start(),
            Date::from_ymd(2024, 9, 1).unwrap()
        );
        assert_eq!(
            Date::from_ymd(2025, 3, 3).unwrap().term_start(),
            Date::from_ymd(2025, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_date() {
        assert_eq!("2024-09-02".parse(), Ok(Date::from_ymd(2024, 9, 2).unwrap()));
        assert!("02.09.2024".parse::<Date>().is_err());
        assert_eq!(Date::from_ymd(2024, 9, 2).unwrap().to_string(), "2024-09-02");
    }

    #[test]
    fn test_from_naive_date() {
        let naive = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        assert_eq!(Date::from(naive), Date::from_ymd(2024, 9, 2).unwrap());
        assert_eq!(Date::from(naive).weekday(), 1);
    }

    #[test]
    fn test_fields_order() {
        let lesson = Lesson::from_fields([
            Some("Mathematical analysis".to_owned()),
            Some("Calculus".to_owned()),
            None,
            Some("1310".to_owned()),
            Some("Ivanov".to_owned()),
            Some("lecture".to_owned()),
            Some(String::new()),
        ]);
        assert_eq!(lesson.full_name.as_deref(), Some("Mathematical analysis"));
        assert_eq!(lesson.room.as_deref(), Some("1310"));
        assert_eq!(lesson.kind.as_deref(), Some("lecture"));
        assert_eq!(
            lesson.fields(),
            [
                Some("Mathematical analysis"),
                Some("Calculus"),
                None,
                Some("1310"),
                Some("Ivanov"),
                Some("lecture"),
                Some(""),
            ]
        );
    }

    #[test]
    fn test_align_day() {
        let short = align_day([Some(Lesson::new("A")), None, Some(Lesson::new("B"))]);
        assert_eq!(short[0], Some(Lesson::new("A")));
        assert_eq!(short[1], None);
        assert_eq!(short[2], Some(Lesson::new("B")));
        assert!(short[3..].iter().all(Option::is_none));

        let long = align_day((0..20).map(|i| Some(Lesson::new(i.to_string()))));
        assert_eq!(long.len(), SLOTS_PER_DAY);
        assert_eq!(long[SLOTS_PER_DAY - 1], Some(Lesson::new("12")));
    }
}
