use std::io::{self, BufRead, BufReader};
use std::path::Path;

use chrono::{Days, Months, NaiveDate};
use fs_err::File;
use log::debug;
use thiserror::Error;

use crate::{
    Date, Day, FIELD_SEPARATOR, FIELDS_PER_LESSON, Lesson, RECORD_SEPARATOR, Timetable, empty_day,
};

#[allow(clippy::cast_possible_truncation)]
const RECORD_BYTE: u8 = RECORD_SEPARATOR as u8;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum DateError {
    #[error("Expected a number, found {0:?}")]
    Number(String),
    #[error("Invalid date")]
    Date,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Io error: {0}")]
    Io(#[from] io::Error),
    #[error("File is empty")]
    Empty,
    #[error("Expected '0' or '1' as week mode, found byte {0:#04x}")]
    Marker(u8),
    #[error("Expected a separator after the week mode")]
    MissingSeparator,
    #[error("Record {0} is not terminated")]
    Truncated(usize),
    #[error("Record {0} is not valid UTF-8")]
    Utf8(usize),
    #[error("Failed to parse date in record {0}: {1}")]
    Date(usize, DateError),
}

/// Splits a lesson record into its fields. An empty record is a free slot.
///
/// A field stays absent unless it has at least one character, and anything
/// after the last field is dropped.
fn parse_lesson(record: &str) -> Option<Lesson> {
    if record.is_empty() {
        return None;
    }
    let mut fields: [Option<String>; FIELDS_PER_LESSON] = Default::default();
    for (field, text) in fields.iter_mut().zip(record.split(FIELD_SEPARATOR)) {
        if !text.is_empty() {
            *field = Some(text.to_owned());
        }
    }
    Some(Lesson::from_fields(fields))
}

fn parse_number<T: std::str::FromStr>(text: &str) -> Result<T, DateError> {
    text.parse().map_err(|_| DateError::Number(text.to_owned()))
}

/// Builds a date the lenient way: a zero-based month and a day past the end
/// of the month roll over into the following months.
fn lenient_date(day: u32, month0: u32, year: i32) -> Result<Date, DateError> {
    let offset = day.checked_sub(1).ok_or(DateError::Date)?;
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|date| date.checked_add_months(Months::new(month0)))
        .and_then(|date| date.checked_add_days(Days::new(u64::from(offset))))
        .map(Date::from)
        .ok_or(DateError::Date)
}

struct Records<R> {
    inner: R,
    index: usize,
}

impl<R: BufRead> Records<R> {
    fn new(inner: R) -> Self {
        Self { inner, index: 0 }
    }

    fn at_end(&mut self) -> io::Result<bool> {
        Ok(self.inner.fill_buf()?.is_empty())
    }

    fn byte(&mut self) -> io::Result<Option<u8>> {
        let byte = self.inner.fill_buf()?.first().copied();
        if byte.is_some() {
            self.inner.consume(1);
        }
        Ok(byte)
    }

    fn week_mode(&mut self) -> Result<bool, Error> {
        let double_week = match self.byte()? {
            None => return Err(Error::Empty),
            Some(b'0') => false,
            Some(b'1') => true,
            Some(other) => return Err(Error::Marker(other)),
        };
        if self.byte()? != Some(RECORD_BYTE) {
            return Err(Error::MissingSeparator);
        }
        self.index += 1;
        Ok(double_week)
    }

    fn record(&mut self) -> Result<String, Error> {
        let mut buf = Vec::new();
        self.inner.read_until(RECORD_BYTE, &mut buf)?;
        self.index += 1;
        if buf.pop() != Some(RECORD_BYTE) {
            return Err(Error::Truncated(self.index));
        }
        String::from_utf8(buf).map_err(|_| Error::Utf8(self.index))
    }

    fn number<T: std::str::FromStr>(&mut self) -> Result<T, Error> {
        let record = self.record()?;
        parse_number(&record).map_err(|e| Error::Date(self.index, e))
    }

    fn date(&mut self) -> Result<Date, Error> {
        let day = self.number()?;
        let month0 = self.number()?;
        let year = self.number()?;
        lenient_date(day, month0, year).map_err(|e| Error::Date(self.index, e))
    }

    fn day(&mut self) -> Result<Day, Error> {
        let mut day = empty_day();
        for slot in &mut day {
            *slot = parse_lesson(&self.record()?);
        }
        Ok(day)
    }
}

impl Timetable {
    /// Reads a timetable in the stored file layout. Either the whole input is
    /// read or an error is returned.
    pub fn read_from(r: impl BufRead) -> Result<Self, Error> {
        let mut records = Records::new(r);
        let double_week = records.week_mode()?;
        let first_day = records.date()?;
        let mut timetable = Timetable::with_first_day(double_week, first_day);
        for day in &mut timetable.lessons {
            *day = records.day()?;
        }
        while !records.at_end()? {
            let date = records.date()?;
            let day = records.day()?;
            timetable.special_days.insert(date, day);
        }
        Ok(timetable)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let timetable = Self::read_from(BufReader::new(File::open(path)?))?;
        debug!(
            "Loaded timetable with {} special days from {}",
            timetable.special_days.len(),
            path.display()
        );
        Ok(timetable)
    }
}
