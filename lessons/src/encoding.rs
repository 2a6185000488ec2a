use encoding_rs::{Encoding, WINDOWS_1252};
use log::warn;
use thiserror::Error;

use crate::{Lesson, Timetable};

#[derive(Debug, Error, Eq, PartialEq)]
pub enum Error {
    #[error("Unknown encoding {0:?}")]
    UnknownEncoding(String),
}

pub fn lookup(label: &str) -> Result<&'static Encoding, Error> {
    Encoding::for_label(label.as_bytes()).ok_or_else(|| Error::UnknownEncoding(label.to_owned()))
}

/// Bytes of `value` under ISO-8859-1, where every char up to U+00FF is the
/// byte of the same value. `Encoding::for_label` maps the Latin-1 labels to
/// windows-1252, which has typographic characters at 0x80 to 0x9F instead.
fn latin1_bytes(value: &str) -> Option<Vec<u8>> {
    value.chars().map(|c| u8::try_from(c).ok()).collect()
}

/// Reads `value` back as the bytes it had under `source` and decodes those
/// bytes as UTF-8. Returns `None` if `value` has characters `source` cannot
/// represent.
fn transcode(value: &str, source: &'static Encoding) -> Option<String> {
    let latin1 = if source == WINDOWS_1252 {
        latin1_bytes(value)
    } else {
        None
    };
    let bytes = match latin1 {
        Some(bytes) => bytes,
        None => {
            let (bytes, _, unmappable) = source.encode(value);
            if unmappable {
                return None;
            }
            bytes.into_owned()
        }
    };
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

impl Lesson {
    /// Repairs text that was decoded with `source` although it was UTF-8.
    ///
    /// Fields that cannot be repaired are left as they are. Text that was
    /// not garbled in the first place may get garbled by this.
    pub fn fix_encoding(&mut self, source: &'static Encoding) {
        for field in self.fields_mut().into_iter().flatten() {
            match transcode(field, source) {
                Some(fixed) => *field = fixed,
                None => warn!("Keeping {field:?}, it is not representable in {}", source.name()),
            }
        }
    }
}

impl Timetable {
    /// Applies [`Lesson::fix_encoding`] to every lesson, including the ones
    /// on special days.
    pub fn fix_encoding(&mut self, label: &str) -> Result<(), Error> {
        let source = lookup(label)?;
        for lesson in self.all_lessons_mut() {
            lesson.fix_encoding(source);
        }
        Ok(())
    }
}
