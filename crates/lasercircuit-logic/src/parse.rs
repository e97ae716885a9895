//! Textual input lines: board size, entity declarations and pulse lines.
//!
//! These only interpret the format. Placement rules (bounds, occupied
//! cells, symbol uniqueness) are checked when the entity is added to a
//! circuit.

use std::fmt;

use crate::entities::{Emitter, Mirror, MirrorOrientation, Receiver};
use crate::geometry::{Direction, Position};

/// A line that does not match its expected format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Wrong number of whitespace-separated fields.
    FieldCount { expected: &'static str, found: usize },
    /// A field that should be a number is not one.
    NotANumber(String),
    /// Board dimensions must be positive.
    NonPositiveSize,
    /// Symbol field is not a single character.
    BadSymbol(String),
    BadDirection(String),
    BadMirror(String),
    /// Frequency field is not `<high>-<low>`.
    BadFrequency(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::FieldCount { expected, found } => {
                write!(f, "expected {}, found {} field(s)", expected, found)
            }
            ParseError::NotANumber(s) => write!(f, "'{}' is not a number", s),
            ParseError::NonPositiveSize => f.write_str("width and height must be greater than zero"),
            ParseError::BadSymbol(s) => write!(f, "'{}' is not a single-character symbol", s),
            ParseError::BadDirection(s) => write!(f, "'{}' is not a direction", s),
            ParseError::BadMirror(s) => write!(f, "'{}' is not a mirror, use / or \\", s),
            ParseError::BadFrequency(s) => {
                write!(f, "'{}' must be <high frequency>-<low frequency>", s)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// A parsed `<symbol> <start> <duration>` pulse line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseLine {
    pub symbol: char,
    pub start: u64,
    pub duration: u64,
}

fn fields<'a>(line: &'a str, counts: &[usize], expected: &'static str) -> Result<Vec<&'a str>, ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if !counts.contains(&parts.len()) {
        return Err(ParseError::FieldCount {
            expected,
            found: parts.len(),
        });
    }
    Ok(parts)
}

fn number<T: std::str::FromStr>(s: &str) -> Result<T, ParseError> {
    s.parse().map_err(|_| ParseError::NotANumber(s.to_string()))
}

fn symbol(s: &str) -> Result<char, ParseError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ParseError::BadSymbol(s.to_string())),
    }
}

fn position(x: &str, y: &str) -> Result<Position, ParseError> {
    Ok(Position::new(number(x)?, number(y)?))
}

/// `<width> <height>`
pub fn parse_size(line: &str) -> Result<(u32, u32), ParseError> {
    let parts = fields(line, &[2], "<width> <height>")?;
    let width: u32 = number(parts[0])?;
    let height: u32 = number(parts[1])?;
    if width == 0 || height == 0 {
        return Err(ParseError::NonPositiveSize);
    }
    Ok((width, height))
}

/// `<symbol> <x> <y> <facing> [<high>-<low>]`
pub fn parse_emitter(line: &str) -> Result<Emitter, ParseError> {
    let parts = fields(line, &[4, 5], "<symbol> <x> <y> <facing> [<high>-<low>]")?;
    let facing =
        Direction::from_name(parts[3]).ok_or_else(|| ParseError::BadDirection(parts[3].to_string()))?;
    let emitter = Emitter::new(symbol(parts[0])?, position(parts[1], parts[2])?, facing);
    match parts.get(4) {
        Some(range) => {
            let (high, low) = parse_frequency(range)?;
            Ok(emitter.with_frequency(high, low))
        }
        None => Ok(emitter),
    }
}

/// `<symbol> <x> <y>`
pub fn parse_receiver(line: &str) -> Result<Receiver, ParseError> {
    let parts = fields(line, &[3], "<symbol> <x> <y>")?;
    Ok(Receiver::new(symbol(parts[0])?, position(parts[1], parts[2])?))
}

/// `<x> <y> <orientation>` with orientation `/` or `\`.
pub fn parse_mirror(line: &str) -> Result<Mirror, ParseError> {
    let parts = fields(line, &[3], "<x> <y> </ or \\>")?;
    let orientation = symbol(parts[2])
        .ok()
        .and_then(MirrorOrientation::from_symbol)
        .ok_or_else(|| ParseError::BadMirror(parts[2].to_string()))?;
    Ok(Mirror::new(position(parts[0], parts[1])?, orientation))
}

/// `<symbol> <start tick> <duration>`
pub fn parse_pulse_sequence(line: &str) -> Result<PulseLine, ParseError> {
    let parts = fields(line, &[3], "<symbol> <start> <duration>")?;
    Ok(PulseLine {
        symbol: symbol(parts[0])?,
        start: number(parts[1])?,
        duration: number(parts[2])?,
    })
}

/// `<high>-<low>`
pub fn parse_frequency(s: &str) -> Result<(u32, u32), ParseError> {
    let bad = || ParseError::BadFrequency(s.to_string());
    let (high, low) = s.split_once('-').ok_or_else(bad)?;
    let high = high.trim().parse().map_err(|_| bad())?;
    let low = low.trim().parse().map_err(|_| bad())?;
    Ok((high, low))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("18 6"), Ok((18, 6)));
        assert_eq!(parse_size("  3   3 "), Ok((3, 3)));
        assert_eq!(parse_size("0 3"), Err(ParseError::NonPositiveSize));
        assert_eq!(parse_size("3 x"), Err(ParseError::NotANumber("x".into())));
        assert!(matches!(parse_size("3"), Err(ParseError::FieldCount { found: 1, .. })));
        assert!(parse_size("-1 3").is_err());
    }

    #[test]
    fn test_parse_emitter() {
        let e = parse_emitter("A 0 1 E").unwrap();
        assert_eq!(e.symbol, 'A');
        assert_eq!(e.position, Position::new(0, 1));
        assert_eq!(e.facing, Direction::East);
        assert_eq!(e.frequency, None);

        let e = parse_emitter("B 2 2 south 520-510").unwrap();
        assert_eq!(e.facing, Direction::South);
        assert_eq!(e.frequency, Some((520, 510)));

        assert_eq!(
            parse_emitter("AB 0 0 N").unwrap_err(),
            ParseError::BadSymbol("AB".into())
        );
        assert_eq!(
            parse_emitter("A 0 0 up").unwrap_err(),
            ParseError::BadDirection("up".into())
        );
        assert_eq!(
            parse_emitter("A 0 0 N 520").unwrap_err(),
            ParseError::BadFrequency("520".into())
        );
    }

    #[test]
    fn test_parse_receiver() {
        let r = parse_receiver("R 2 1").unwrap();
        assert_eq!(r, Receiver::new('R', Position::new(2, 1)));
        assert!(parse_receiver("R 2").is_err());
    }

    #[test]
    fn test_parse_mirror() {
        let m = parse_mirror("1 1 /").unwrap();
        assert_eq!(m.orientation, MirrorOrientation::Forward);
        let m = parse_mirror("0 4 \\").unwrap();
        assert_eq!(m.orientation, MirrorOrientation::Back);
        assert_eq!(
            parse_mirror("0 4 |").unwrap_err(),
            ParseError::BadMirror("|".into())
        );
    }

    #[test]
    fn test_parse_pulse_sequence() {
        assert_eq!(
            parse_pulse_sequence("A 0 3"),
            Ok(PulseLine {
                symbol: 'A',
                start: 0,
                duration: 3
            })
        );
        assert!(parse_pulse_sequence("A -1 3").is_err());
        assert!(parse_pulse_sequence("A 0").is_err());
    }

    #[test]
    fn test_parse_frequency() {
        assert_eq!(parse_frequency("700-650"), Ok((700, 650)));
        assert!(parse_frequency("700").is_err());
        assert!(parse_frequency("a-b").is_err());
    }
}
