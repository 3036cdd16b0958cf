//! Bill file-number parsing.
//!
//! Legistar identifies a bill by its file number: a text token like
//! "Int 0107-2024" encoding a (type, number, session year) triple.
//!
//! # File-number conventions
//!
//! - Type token: "Int" (introduction), "Res" (resolution), "LU" (land use), ...
//! - Number: zero-padded to four digits within the session
//! - Year: the legislative session the bill belongs to
//!
//! The same bill concept recurring in a later session gets a new file
//! number, so cross-session links are lists of these identifiers.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("empty file number")]
    Empty,
    #[error("malformed file number: {0:?}")]
    Malformed(String),
}

/// Canonical token identifying one bill in one legislative session.
///
/// Parses from and displays as the sheet/API form `"Int 0107-2024"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BillIdentifier {
    /// Matter type token, e.g. "Int", "Res", "LU".
    pub kind: String,
    pub number: u32,
    /// Session year.
    pub year: u16,
}

impl BillIdentifier {
    pub fn new(kind: impl Into<String>, number: u32, year: u16) -> Self {
        Self {
            kind: kind.into(),
            number,
            year,
        }
    }
}

impl fmt::Display for BillIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:04}-{}", self.kind, self.number, self.year)
    }
}

/// Session year first, so sorted identifier lists read chronologically.
impl Ord for BillIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year, &self.kind, self.number).cmp(&(other.year, &other.kind, other.number))
    }
}

impl PartialOrd for BillIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for BillIdentifier {
    type Err = IdentifierError;

    /// Parse `"<kind> <number>-<year>"`.
    ///
    /// The kind must be alphabetic, the number all digits (any padding,
    /// re-padded to four on display), and the year exactly four digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdentifierError::Empty);
        }
        let malformed = || IdentifierError::Malformed(s.to_string());

        let (kind, rest) = s.split_once(' ').ok_or_else(malformed)?;
        if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(malformed());
        }

        let (number, year) = rest.trim().split_once('-').ok_or_else(malformed)?;
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        Ok(Self {
            kind: kind.to_string(),
            number: number.parse().map_err(|_| malformed())?,
            year: year.parse().map_err(|_| malformed())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_form() {
        let id: BillIdentifier = "Int 0107-2024".parse().unwrap();
        assert_eq!(id, BillIdentifier::new("Int", 107, 2024));
    }

    #[test]
    fn parses_other_kinds() {
        let res: BillIdentifier = "Res 0021-2023".parse().unwrap();
        assert_eq!(res.kind, "Res");
        let lu: BillIdentifier = "LU 0005-2022".parse().unwrap();
        assert_eq!(lu.kind, "LU");
        assert_eq!(lu.number, 5);
    }

    #[test]
    fn display_restores_zero_padding() {
        let id = BillIdentifier::new("Int", 5, 2024);
        assert_eq!(id.to_string(), "Int 0005-2024");

        let parsed: BillIdentifier = "Int 5-2024".parse().unwrap();
        assert_eq!(parsed.to_string(), "Int 0005-2024");
    }

    #[test]
    fn display_roundtrips() {
        for s in ["Int 0107-2024", "Res 0021-2023", "LU 1234-2020"] {
            let id: BillIdentifier = s.parse().unwrap();
            assert_eq!(id.to_string(), s);
        }
    }

    #[test]
    fn whitespace_trimmed() {
        let id: BillIdentifier = "  Int 0107-2024  ".parse().unwrap();
        assert_eq!(id.to_string(), "Int 0107-2024");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(
            "".parse::<BillIdentifier>().unwrap_err(),
            IdentifierError::Empty
        );
        assert_eq!(
            "   ".parse::<BillIdentifier>().unwrap_err(),
            IdentifierError::Empty
        );
    }

    #[test]
    fn rejects_malformed() {
        for s in [
            "Int0107-2024",   // missing space
            "Int 0107",       // missing year
            "Int 0107-24",    // two-digit year
            "Int 0107-20244", // five-digit year
            "Int x107-2024",  // non-digit number
            "Int 0107-202x",  // non-digit year
            "107-2024",       // missing kind
            "1nt 0107-2024",  // non-alphabetic kind
        ] {
            assert!(
                matches!(
                    s.parse::<BillIdentifier>(),
                    Err(IdentifierError::Malformed(_))
                ),
                "expected {s:?} to be rejected",
            );
        }
    }

    #[test]
    fn orders_chronologically() {
        let mut ids: Vec<BillIdentifier> = ["Int 0005-2024", "Res 0900-2022", "Int 0651-2023"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        ids.sort();
        let years: Vec<u16> = ids.iter().map(|id| id.year).collect();
        assert_eq!(years, vec![2022, 2023, 2024]);
    }
}
