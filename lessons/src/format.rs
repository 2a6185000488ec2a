use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Datelike;
use fs_err::File;
use log::debug;
use thiserror::Error;

use crate::{Day, FIELD_SEPARATOR, Lesson, RECORD_SEPARATOR, Timetable};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Io error: {0}")]
    Io(#[from] io::Error),
    #[error("Lesson text {0:?} contains a reserved separator character")]
    ReservedCharacter(String),
}

trait Format {
    fn format(&self, w: &mut impl Write) -> io::Result<()>;
}

impl Format for Option<Lesson> {
    /// A free slot is an empty record, a lesson always has all of its
    /// field separators even when every field is absent.
    fn format(&self, w: &mut impl Write) -> io::Result<()> {
        if let Some(lesson) = self {
            for field in lesson.fields() {
                write!(w, "{}{FIELD_SEPARATOR}", field.unwrap_or_default())?;
            }
        }
        write!(w, "{RECORD_SEPARATOR}")
    }
}

impl Format for Day {
    fn format(&self, w: &mut impl Write) -> io::Result<()> {
        self.iter().try_for_each(|lesson| lesson.format(w))
    }
}

fn format_date(w: &mut impl Write, day: u32, month0: u32, year: i32) -> io::Result<()> {
    write!(
        w,
        "{day}{RECORD_SEPARATOR}{month0}{RECORD_SEPARATOR}{year}{RECORD_SEPARATOR}"
    )
}

impl Format for Timetable {
    fn format(&self, w: &mut impl Write) -> io::Result<()> {
        let marker = if self.double_week { '1' } else { '0' };
        write!(w, "{marker}{RECORD_SEPARATOR}")?;
        let first = self.first_day.0;
        format_date(w, first.day(), first.month0(), first.year())?;
        for day in &self.lessons {
            day.format(w)?;
        }
        for (date, day) in &self.special_days {
            // The month always comes from the first day. Files written by
            // earlier versions rely on it, so it is kept.
            format_date(w, date.0.day(), first.month0(), date.0.year())?;
            day.format(w)?;
        }
        Ok(())
    }
}

impl Timetable {
    fn check_separators(&self) -> Result<(), Error> {
        let reserved = |c: char| c == FIELD_SEPARATOR || c == RECORD_SEPARATOR;
        for lesson in self.all_lessons() {
            if let Some(text) = lesson.fields().into_iter().flatten().find(|t| t.contains(reserved)) {
                return Err(Error::ReservedCharacter(text.to_owned()));
            }
        }
        Ok(())
    }

    /// Writes the timetable to `w` in the stored file layout.
    pub fn write_to(&self, w: &mut impl Write) -> Result<(), Error> {
        self.check_separators()?;
        self.format(w)?;
        Ok(())
    }

    /// Replaces the contents of `path` with this timetable. A failed write
    /// may leave the file partially written.
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        self.check_separators()?;
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.format(&mut writer)?;
        writer.flush()?;
        debug!(
            "Saved timetable with {} special days to {}",
            self.special_days.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::format::{Error, Format};
    use crate::{Date, Lesson, SLOTS_PER_DAY, Timetable};

    const RS: char = '\u{1e}';
    const FS: char = '\u{1f}';

    fn formatted<T: Format>(value: &T) -> String {
        let mut out = Vec::new();
        value.format(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_lesson() {
        let lesson = Lesson {
            room: Some("1310".to_owned()),
            comment: Some(String::new()),
            ..Lesson::new("Algebra")
        };
        assert_eq!(
            formatted(&Some(lesson)),
            format!("Algebra{FS}{FS}{FS}1310{FS}{FS}{FS}{FS}{RS}")
        );
        assert_eq!(
            formatted(&Some(Lesson::default())),
            format!("{FS}{FS}{FS}{FS}{FS}{FS}{FS}{RS}")
        );
        assert_eq!(formatted(&None::<Lesson>), format!("{RS}"));
    }

    #[test]
    fn test_format_header_and_grid() {
        let mut timetable = Timetable::with_first_day(false, Date::from_ymd(2024, 9, 2).unwrap());
        timetable.set_weekday_lesson(Some(Lesson::new("Algebra")), 1, 0);
        let text = formatted(&timetable);

        let header = format!("0{RS}2{RS}8{RS}2024{RS}");
        assert!(text.starts_with(&header), "{text:?}");
        let grid = &text[header.len()..];
        assert_eq!(grid.matches(RS).count(), 8 * SLOTS_PER_DAY);
        // row 0 comes first, then Monday
        let monday = SLOTS_PER_DAY;
        assert_eq!(grid.split(RS).nth(monday), Some(format!("Algebra{FS}{FS}{FS}{FS}{FS}{FS}{FS}").as_str()));
    }

    #[test]
    fn test_format_special_day_uses_first_month() {
        let mut timetable = Timetable::with_first_day(true, Date::from_ymd(2024, 9, 2).unwrap());
        timetable.add_holiday(Date::from_ymd(2025, 1, 7).unwrap());
        let text = formatted(&timetable);

        let grid_end = format!("1{RS}2{RS}8{RS}2024{RS}").len() + 15 * SLOTS_PER_DAY;
        let special = &text[grid_end..];
        assert_eq!(
            special,
            format!("7{RS}8{RS}2025{RS}{}", RS.to_string().repeat(SLOTS_PER_DAY))
        );
        assert!(text.starts_with('1'));
    }

    #[test]
    fn test_write_rejects_separators() {
        let mut timetable = Timetable::with_first_day(false, Date::from_ymd(2024, 9, 2).unwrap());
        timetable.set_weekday_lesson(Some(Lesson::new(format!("bad{RS}name"))), 2, 1);
        let mut out = Vec::new();
        assert!(matches!(
            timetable.write_to(&mut out),
            Err(Error::ReservedCharacter(text)) if text == format!("bad{RS}name")
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_save_as_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group-11-301");
        std::fs::write(&path, "x".repeat(10_000)).unwrap();

        let timetable = Timetable::with_first_day(false, Date::from_ymd(2024, 9, 2).unwrap());
        timetable.save_as(&path).unwrap();

        let mut expected = Vec::new();
        timetable.write_to(&mut expected).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), expected);
    }

    #[test]
    fn test_save_as_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let timetable = Timetable::with_first_day(false, Date::from_ymd(2024, 9, 2).unwrap());
        assert!(matches!(
            timetable.save_as(dir.path().join("missing").join("file")),
            Err(Error::Io(_))
        ));
    }
}
