//! Error values returned by circuit setup.
//!
//! Every variant is recoverable: the rejected call leaves the circuit
//! unchanged and the caller may retry with corrected input.

use std::fmt;

use crate::geometry::{Board, Position};
use crate::spectrum::SpectrumError;

/// Which kind of board occupant a placement concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Emitter,
    Receiver,
    Mirror,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Emitter => "emitter",
            EntityKind::Receiver => "receiver",
            EntityKind::Mirror => "mirror",
        })
    }
}

/// Circuit setup error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    /// Board dimensions are zero or above the configured maximum.
    InvalidBoardSize { width: u32, height: u32 },
    /// Position lies outside the board.
    OutOfBounds { position: Position, board: Board },
    /// Another entity already sits on the cell.
    CellOccupied { position: Position, occupant: EntityKind },
    /// The circuit already holds the maximum number of this kind.
    CapacityExceeded { kind: EntityKind, limit: usize },
    /// Symbol is not allowed for this kind of entity.
    InvalidSymbol { kind: EntityKind, symbol: char },
    /// Symbol already used by another emitter or receiver.
    DuplicateSymbol(char),
    /// The emitter already has its pulse sequence.
    SequenceAlreadySet(char),
    /// A pulse window has zero duration, or windows overlap.
    InvalidPulseWindow { start: u64, duration: u64 },
    /// No emitter carries the symbol.
    UnknownEmitter(char),
    /// Frequency mode is active but the emitter declared no frequency pair.
    MissingFrequency(char),
    /// The color-frequency table could not be loaded.
    MalformedSpectrumFile(SpectrumError),
    /// The frequency pair does not fit in any band of the spectrum.
    FrequencyOutOfRange { high: u32, low: u32 },
}

impl fmt::Display for CircuitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitError::InvalidBoardSize { width, height } => {
                write!(f, "invalid board size {}x{}", width, height)
            }
            CircuitError::OutOfBounds { position, board } => write!(
                f,
                "position {} is out of bounds of {}x{} board",
                position, board.width, board.height
            ),
            CircuitError::CellOccupied { position, occupant } => {
                write!(f, "position {} is already occupied by a {}", position, occupant)
            }
            CircuitError::CapacityExceeded { kind, limit } => {
                write!(f, "cannot add more than {} {}s", limit, kind)
            }
            CircuitError::InvalidSymbol { kind, symbol } => {
                write!(f, "'{}' is not a valid {} symbol", symbol, kind)
            }
            CircuitError::DuplicateSymbol(symbol) => {
                write!(f, "symbol '{}' is already in use", symbol)
            }
            CircuitError::SequenceAlreadySet(symbol) => {
                write!(f, "emitter '{}' already has its pulse sequence set", symbol)
            }
            CircuitError::InvalidPulseWindow { start, duration } => {
                write!(f, "invalid pulse window start={} duration={}", start, duration)
            }
            CircuitError::UnknownEmitter(symbol) => {
                write!(f, "emitter '{}' does not exist", symbol)
            }
            CircuitError::MissingFrequency(symbol) => {
                write!(f, "emitter '{}' needs a frequency in frequency mode", symbol)
            }
            CircuitError::MalformedSpectrumFile(e) => write!(f, "malformed spectrum: {}", e),
            CircuitError::FrequencyOutOfRange { high, low } => {
                write!(f, "frequency {}-{} is outside the spectrum", high, low)
            }
        }
    }
}

impl std::error::Error for CircuitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CircuitError::MalformedSpectrumFile(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SpectrumError> for CircuitError {
    fn from(e: SpectrumError) -> Self {
        CircuitError::MalformedSpectrumFile(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_messages() {
        let e = CircuitError::CellOccupied {
            position: Position::new(1, 2),
            occupant: EntityKind::Mirror,
        };
        assert_eq!(e.to_string(), "position (1, 2) is already occupied by a mirror");
        assert_eq!(
            CircuitError::UnknownEmitter('Q').to_string(),
            "emitter 'Q' does not exist"
        );
        assert_eq!(
            CircuitError::CapacityExceeded {
                kind: EntityKind::Receiver,
                limit: 10
            }
            .to_string(),
            "cannot add more than 10 receivers"
        );
    }

    #[test]
    fn test_spectrum_error_is_source() {
        let e: CircuitError = SpectrumError::WrongLineCount(3).into();
        assert!(e.source().is_some());
        assert!(CircuitError::DuplicateSymbol('A').source().is_none());
    }
}
