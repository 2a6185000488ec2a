use std::fmt::{Display, Formatter, Result};

use lessons::{Day, Lesson};

/// Plain text list of the named lessons of one day.
pub struct Listing<'a>(pub &'a Day);

impl Listing<'_> {
    fn details(lesson: &Lesson) -> String {
        let place = [lesson.room.as_deref(), lesson.building.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        [lesson.kind.as_deref(), Some(place.as_str()), lesson.teacher.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Display for Listing<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let mut empty = true;
        for (slot, lesson) in self.0.iter().enumerate() {
            let Some(lesson) = lesson else { continue };
            // lessons without a name are placeholders
            let Some(name) = &lesson.full_name else {
                continue;
            };
            empty = false;
            write!(f, "{slot:>2} {name}")?;
            let details = Self::details(lesson);
            if !details.is_empty() {
                write!(f, " ({details})")?;
            }
            if let Some(comment) = &lesson.comment {
                write!(f, " - {comment}")?;
            }
            writeln!(f)?;
        }
        if empty {
            writeln!(f, "No lessons")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use lessons::{Lesson, align_day, empty_day};

    use crate::listing::Listing;

    #[test]
    fn test_listing() {
        let day = align_day([
            Some(Lesson {
                kind: Some("lecture".to_owned()),
                room: Some("1310".to_owned()),
                building: Some("Main".to_owned()),
                teacher: Some("Ivanov".to_owned()),
                ..Lesson::new("Algebra")
            }),
            None,
            Some(Lesson {
                room: Some("Gym".to_owned()),
                ..Lesson::default()
            }),
            Some(Lesson {
                comment: Some("bring a laptop".to_owned()),
                ..Lesson::new("Databases")
            }),
        ]);
        assert_eq!(
            Listing(&day).to_string(),
            " 0 Algebra (lecture, 1310 Main, Ivanov)\n 3 Databases - bring a laptop\n"
        );
    }

    #[test]
    fn test_listing_empty() {
        assert_eq!(Listing(&empty_day()).to_string(), "No lessons\n");
    }
}
