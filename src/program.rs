// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Parsing of the textual Intcode representation: comma-separated ASCII decimal integers.

use std::error::Error;
use std::fmt::{self, Display};
use std::num::ParseIntError;

/// An error parsing the textual Intcode representation
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseProgramError {
    /// Index of the offending comma-separated item, starting at 0
    pub position: usize,
    /// The offending item, with surrounding whitespace trimmed
    pub token: Box<str>,
    /// Why `token` could not be parsed
    pub reason: ParseIntError,
}

impl Display for ParseProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid integer {:?} at position {}: {}",
            self.token, self.position, self.reason
        )
    }
}

impl Error for ParseProgramError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.reason)
    }
}

/// Parse a program from comma-separated decimal integers
///
/// Whitespace around the whole program and around each integer is ignored, so a trailing newline
/// is fine.
///
/// ```
/// use intcode::program::parse_program;
/// assert_eq!(parse_program("1,0, -3,99\n").unwrap(), vec![1, 0, -3, 99]);
/// assert!(parse_program("1,,99").is_err());
/// ```
pub fn parse_program(source: &str) -> Result<Vec<i64>, ParseProgramError> {
    source
        .trim()
        .split(',')
        .map(str::trim)
        .enumerate()
        .map(|(position, token)| {
            token.parse().map_err(|reason| ParseProgramError {
                position,
                token: Box::from(token),
                reason,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed() {
        assert_eq!(
            parse_program("109,-1,+4,1125899906842624").unwrap(),
            vec![109, -1, 4, 1125899906842624]
        );
    }

    #[test]
    fn reports_bad_token() {
        let err = parse_program("1,2,x3, 99").unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(&*err.token, "x3");
        assert!(err.to_string().starts_with("invalid integer \"x3\" at position 2"));

        let err = parse_program("").unwrap_err();
        assert_eq!(err.position, 0);
        assert_eq!(&*err.token, "");
    }
}
