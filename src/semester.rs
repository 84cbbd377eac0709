//! Semester code codec.
//!
//! A semester code is a 4-digit integer `YYYC` where `YYY` counts years since
//! 1900 and `C` is the term digit: `1` Spring, `4` Summer, `7` Fall. For
//! example `1257` is Fall 2025 and `1261` is Spring 2026.
//!
//! Codes are validated once, at the boundary, by [`decode`] or
//! [`SemesterCode::new`]; a [`SemesterCode`] value is always well formed.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

const BASE_YEAR: i32 = 1900;
const MIN_CODE: i64 = 1000;
const MAX_CODE: i64 = 9999;

// ---

/// Academic term within a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    Spring,
    Summer,
    Fall,
}

impl Term {
    // ---
    /// Trailing digit of the semester code for this term.
    pub fn digit(self) -> u16 {
        match self {
            Term::Spring => 1,
            Term::Summer => 4,
            Term::Fall => 7,
        }
    }

    pub fn from_digit(digit: i64) -> Option<Self> {
        match digit {
            1 => Some(Term::Spring),
            4 => Some(Term::Summer),
            7 => Some(Term::Fall),
            _ => None,
        }
    }

    /// Lowercase name, as used in outline URLs.
    pub fn slug(self) -> &'static str {
        match self {
            Term::Spring => "spring",
            Term::Summer => "summer",
            Term::Fall => "fall",
        }
    }

    /// Term in session during the given calendar month (1-12).
    fn for_month(month: u32) -> Self {
        match month {
            1..=4 => Term::Spring,
            5..=8 => Term::Summer,
            _ => Term::Fall,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Term::Spring => "Spring",
            Term::Summer => "Summer",
            Term::Fall => "Fall",
        };
        f.write_str(name)
    }
}

/// Decoded form of a semester code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Semester {
    pub year: i32,
    pub term: Term,
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.term, self.year)
    }
}

/// Decode a raw semester code into its year and term.
///
/// Fails with [`EngineError::InvalidSemesterCode`] when the code is outside
/// `[1000, 9999]` or its last digit is not a term digit.
pub fn decode(code: i64) -> Result<Semester, EngineError> {
    // ---
    if !(MIN_CODE..=MAX_CODE).contains(&code) {
        return Err(EngineError::InvalidSemesterCode(code.to_string()));
    }
    let term = Term::from_digit(code % 10)
        .ok_or_else(|| EngineError::InvalidSemesterCode(code.to_string()))?;

    Ok(Semester {
        year: BASE_YEAR + (code / 10) as i32,
        term,
    })
}

/// Encode a year and term into a semester code.
///
/// Fails when `year` is before 1900 or the resulting code would not fit in
/// four digits.
pub fn encode(year: i32, term: Term) -> Result<SemesterCode, EngineError> {
    // ---
    let code = (i64::from(year) - i64::from(BASE_YEAR)) * 10 + i64::from(term.digit());
    if year < BASE_YEAR || !(MIN_CODE..=MAX_CODE).contains(&code) {
        return Err(EngineError::InvalidSemesterCode(code.to_string()));
    }
    Ok(SemesterCode(code as u16))
}

/// A validated semester code.
///
/// Ordering follows chronology: a later semester always has a larger code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct SemesterCode(u16);

impl SemesterCode {
    // ---
    pub fn new(code: i64) -> Result<Self, EngineError> {
        decode(code)?;
        Ok(SemesterCode(code as u16))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn year(self) -> i32 {
        BASE_YEAR + i32::from(self.0 / 10)
    }

    pub fn term(self) -> Term {
        // Constructors only admit term digits 1, 4 and 7.
        match self.0 % 10 {
            1 => Term::Spring,
            4 => Term::Summer,
            _ => Term::Fall,
        }
    }

    pub fn semester(self) -> Semester {
        Semester {
            year: self.year(),
            term: self.term(),
        }
    }

    /// Semester in session on the given date.
    pub fn containing(date: NaiveDate) -> Result<Self, EngineError> {
        encode(date.year(), Term::for_month(date.month()))
    }

    /// The following term, or `None` past the last representable code.
    pub fn next(self) -> Option<Self> {
        let (year, term) = match self.term() {
            Term::Spring => (self.year(), Term::Summer),
            Term::Summer => (self.year(), Term::Fall),
            Term::Fall => (self.year() + 1, Term::Spring),
        };
        encode(year, term).ok()
    }

    /// The preceding term, or `None` before the first representable code.
    pub fn previous(self) -> Option<Self> {
        let (year, term) = match self.term() {
            Term::Spring => (self.year() - 1, Term::Fall),
            Term::Summer => (self.year(), Term::Spring),
            Term::Fall => (self.year(), Term::Summer),
        };
        encode(year, term).ok()
    }

    /// The `count` most recent codes ending at (and including) `self`, newest first.
    pub fn recent(self, count: usize) -> Vec<SemesterCode> {
        std::iter::successors(Some(self), |code| code.previous())
            .take(count)
            .collect()
    }
}

impl TryFrom<i64> for SemesterCode {
    type Error = EngineError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        SemesterCode::new(code)
    }
}

impl From<SemesterCode> for u16 {
    fn from(code: SemesterCode) -> Self {
        code.0
    }
}

impl fmt::Display for SemesterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
