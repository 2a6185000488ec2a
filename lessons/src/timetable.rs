use std::collections::BTreeMap;

use crate::{Date, Day, EMPTY_DAY, Lesson, SLOTS_PER_DAY, align_day, empty_day};

/// A recurring weekly (or two-weekly) grid of lessons plus per-date
/// overrides.
///
/// Grid rows are weekdays numbered from Monday = 1. Row 0 is never used
/// but is still part of the grid so the stored layout stays the same.
/// A two-week schedule keeps the second week in rows 8 to 14.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Timetable {
    pub(crate) lessons: Vec<Day>,
    pub(crate) first_day: Date,
    pub(crate) double_week: bool,
    pub(crate) special_days: BTreeMap<Date, Day>,
}

impl Timetable {
    /// An empty timetable starting at the beginning of the current term.
    #[must_use]
    pub fn new(double_week: bool) -> Self {
        Self::with_first_day(double_week, Date::today().term_start())
    }

    /// An empty timetable. `first_day` decides which weeks are odd and even
    /// in a two-week schedule, and no lessons are returned before it.
    #[must_use]
    pub fn with_first_day(double_week: bool, first_day: Date) -> Self {
        Self {
            lessons: vec![empty_day(); Self::rows(double_week)],
            first_day,
            double_week,
            special_days: BTreeMap::new(),
        }
    }

    pub(crate) fn rows(double_week: bool) -> usize {
        if double_week { 15 } else { 8 }
    }

    #[must_use]
    pub fn is_doubled(&self) -> bool {
        self.double_week
    }

    #[must_use]
    pub fn first_day(&self) -> Date {
        self.first_day
    }

    /// Days with explicitly stored lessons, ordered by date.
    pub fn special_days(&self) -> impl Iterator<Item = (Date, &Day)> {
        self.special_days.iter().map(|(date, day)| (*date, day))
    }

    fn weekday_row(&self, day_of_week: i32) -> usize {
        let days = if self.double_week { 14 } else { 7 };
        let row = (i64::from(day_of_week) - 1).rem_euclid(days) + 1;
        usize::try_from(row).unwrap_or(1)
    }

    fn date_row(&self, date: Date) -> usize {
        let weekday = date.weekday();
        if self.double_week && date.weeks_since(self.first_day) % 2 != 0 {
            weekday + 7
        } else {
            weekday
        }
    }

    /// Lessons on `date`. An override for the date wins, days before the
    /// first day are empty, everything else comes from the grid.
    #[must_use]
    pub fn lessons(&self, date: Date) -> &Day {
        if let Some(day) = self.special_days.get(&date) {
            return day;
        }
        if date < self.first_day {
            return &EMPTY_DAY;
        }
        &self.lessons[self.date_row(date)]
    }

    /// Lessons of a grid weekday. Monday = 1; in a two-week schedule the
    /// second Monday is 8. Out of range values wrap around.
    #[must_use]
    pub fn weekday_lessons(&self, day_of_week: i32) -> &Day {
        &self.lessons[self.weekday_row(day_of_week)]
    }

    #[must_use]
    pub fn lesson(&self, date: Date, slot: usize) -> Option<&Lesson> {
        if slot >= SLOTS_PER_DAY {
            return None;
        }
        self.lessons(date)[slot].as_ref()
    }

    #[must_use]
    pub fn weekday_lesson(&self, day_of_week: i32, slot: usize) -> Option<&Lesson> {
        if slot >= SLOTS_PER_DAY {
            return None;
        }
        self.weekday_lessons(day_of_week)[slot].as_ref()
    }

    pub fn set_weekday_lessons(
        &mut self,
        lessons: impl IntoIterator<Item = Option<Lesson>>,
        day_of_week: i32,
    ) {
        let row = self.weekday_row(day_of_week);
        self.lessons[row] = align_day(lessons);
    }

    /// Replaces the lessons of `date` only, leaving the grid untouched.
    pub fn set_lessons(&mut self, lessons: impl IntoIterator<Item = Option<Lesson>>, date: Date) {
        self.special_days.insert(date, align_day(lessons));
    }

    /// Slots past the end of the day are clamped to the last slot.
    pub fn set_weekday_lesson(&mut self, lesson: Option<Lesson>, day_of_week: i32, slot: usize) {
        let slot = slot.min(SLOTS_PER_DAY - 1);
        let row = self.weekday_row(day_of_week);
        self.lessons[row][slot] = lesson;
    }

    /// Replaces one lesson on `date`. The other lessons of that day are kept
    /// as they currently are.
    pub fn set_lesson(&mut self, lesson: Option<Lesson>, date: Date, slot: usize) {
        let slot = slot.min(SLOTS_PER_DAY - 1);
        let mut day = self.lessons(date).clone();
        day[slot] = lesson;
        self.special_days.insert(date, day);
    }

    /// Cancels every lesson on `holiday`.
    pub fn add_holiday(&mut self, holiday: Date) {
        self.special_days.insert(holiday, empty_day());
    }

    /// Moves the lessons of `holiday` to `shift` and cancels `holiday`.
    pub fn shift_holiday(&mut self, holiday: Date, shift: Date) {
        let moved = self.lessons(holiday).clone();
        self.special_days.insert(shift, moved);
        self.add_holiday(holiday);
    }

    /// Drops every override, going back to the plain grid.
    pub fn flush_holidays(&mut self) {
        self.special_days.clear();
    }

    pub(crate) fn all_lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons
            .iter()
            .chain(self.special_days.values())
            .flat_map(|day| day.iter().flatten())
    }

    pub(crate) fn all_lessons_mut(&mut self) -> impl Iterator<Item = &mut Lesson> {
        self.lessons
            .iter_mut()
            .chain(self.special_days.values_mut())
            .flat_map(|day| day.iter_mut().flatten())
    }
}
