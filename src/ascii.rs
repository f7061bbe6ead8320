// SPDX-FileCopyrightText: 2025 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Helpers for programs that talk in ASCII text, one character per int.

use std::error::Error;
use std::fmt::{self, Display};

macro_rules! to_ascii_char {
    ($e: expr) => {{
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "in macro to make it explicit"
        )]
        {
            $e as u8 as char
        }
    }};
}

/// An error converting between text and ASCII ints
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AsciiError {
    /// A character in the text was not ASCII
    InvalidAsciiChar(char),
    /// An int in the program's output was outside of the ASCII range
    InvalidAsciiInt(i64),
}

impl Error for AsciiError {}
impl Display for AsciiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsciiError::InvalidAsciiInt(n) => write!(f, "{n} is not a valid ASCII character"),
            AsciiError::InvalidAsciiChar(c) => write!(f, "{c:?} is not a valid ASCII character"),
        }
    }
}

/// Encode `line` as program input, terminated by a newline.
///
/// A newline is only appended if `line` doesn't already end with one.
pub fn encode_line(line: &str) -> Result<Vec<i64>, AsciiError> {
    if let Some(bad_char) = line.chars().find(|c| !c.is_ascii()) {
        return Err(AsciiError::InvalidAsciiChar(bad_char));
    }
    let mut encoded: Vec<i64> = line.bytes().map(i64::from).collect();
    if !line.ends_with('\n') {
        encoded.push(i64::from(b'\n'));
    }
    Ok(encoded)
}

/// Decode program output into text
pub fn decode(output: &[i64]) -> Result<String, AsciiError> {
    let mut s = String::with_capacity(output.len());
    for &i in output {
        match i {
            c @ 0..=127 => s.push(to_ascii_char!(c)),
            _ => return Err(AsciiError::InvalidAsciiInt(i)),
        }
    }
    Ok(s)
}

/// Split off a final non-ASCII int from the program's output.
///
/// Programs that draw text often finish by outputting a single large number as their result.
pub fn split_trailer(output: &[i64]) -> (&[i64], Option<i64>) {
    match output.split_last() {
        Some((&last, text)) if !(0..=127).contains(&last) => (text, Some(last)),
        _ => (output, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode() {
        assert_eq!(encode_line("NOT A J").unwrap().len(), 8);
        assert_eq!(encode_line("WALK\n").unwrap(), vec![87, 65, 76, 75, 10]);
        assert_eq!(encode_line(""), Ok(vec![10]));
        assert_eq!(encode_line("naïve"), Err(AsciiError::InvalidAsciiChar('ï')));
    }

    #[test]
    fn decode_with_trailer() {
        let output = [46, 35, 10, 19_358_688];
        let (text, trailer) = split_trailer(&output);
        assert_eq!(decode(text).unwrap(), ".#\n");
        assert_eq!(trailer, Some(19_358_688));
        assert_eq!(decode(&output), Err(AsciiError::InvalidAsciiInt(19_358_688)));
        let text: &[i64] = &[72, 105];
        assert_eq!(split_trailer(text), (text, None));
        assert_eq!(split_trailer(&[]).1, None);
    }
}
