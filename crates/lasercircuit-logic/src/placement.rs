//! Placement validation for board occupants.
//!
//! Pure checks against the board rectangle and the circuit's occupancy
//! table. No database of entities is consulted beyond `Occupancy`, which
//! the circuit keeps in step with its entity lists.

use std::collections::HashMap;

use crate::config::CircuitConfig;
use crate::error::{CircuitError, EntityKind};
use crate::geometry::{Board, Position};

/// Reference from a cell or symbol to the entity list index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    Emitter(usize),
    Receiver(usize),
    Mirror(usize),
}

impl Occupant {
    pub fn kind(self) -> EntityKind {
        match self {
            Occupant::Emitter(_) => EntityKind::Emitter,
            Occupant::Receiver(_) => EntityKind::Receiver,
            Occupant::Mirror(_) => EntityKind::Mirror,
        }
    }
}

/// A proposed placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    Emitter { symbol: char, position: Position },
    Receiver { symbol: char, position: Position },
    Mirror { position: Position },
}

impl Candidate {
    pub fn position(&self) -> Position {
        match *self {
            Candidate::Emitter { position, .. }
            | Candidate::Receiver { position, .. }
            | Candidate::Mirror { position } => position,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Candidate::Emitter { .. } => EntityKind::Emitter,
            Candidate::Receiver { .. } => EntityKind::Receiver,
            Candidate::Mirror { .. } => EntityKind::Mirror,
        }
    }
}

/// Cell → occupant and symbol → occupant lookup tables.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    cells: HashMap<Position, Occupant>,
    symbols: HashMap<char, Occupant>,
    emitters: usize,
    receivers: usize,
}

impl Occupancy {
    pub fn at(&self, position: Position) -> Option<Occupant> {
        self.cells.get(&position).copied()
    }

    pub fn by_symbol(&self, symbol: char) -> Option<Occupant> {
        self.symbols.get(&symbol).copied()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Emitter => self.emitters,
            EntityKind::Receiver => self.receivers,
            EntityKind::Mirror => self.cells.len() - self.emitters - self.receivers,
        }
    }

    /// Register an accepted candidate under the given list index.
    pub(crate) fn record(&mut self, candidate: &Candidate, index: usize) {
        let occupant = match *candidate {
            Candidate::Emitter { symbol, .. } => {
                self.emitters += 1;
                let o = Occupant::Emitter(index);
                self.symbols.insert(symbol, o);
                o
            }
            Candidate::Receiver { symbol, .. } => {
                self.receivers += 1;
                let o = Occupant::Receiver(index);
                self.symbols.insert(symbol, o);
                o
            }
            Candidate::Mirror { .. } => Occupant::Mirror(index),
        };
        self.cells.insert(candidate.position(), occupant);
    }
}

/// Emitters use uppercase letters, receivers letters or digits.
pub fn is_valid_symbol(kind: EntityKind, symbol: char) -> bool {
    match kind {
        EntityKind::Emitter => symbol.is_ascii_uppercase(),
        EntityKind::Receiver => symbol.is_ascii_alphanumeric(),
        EntityKind::Mirror => false,
    }
}

/// Check a placement. Checks run in a fixed order: bounds, occupied cell,
/// capacity, symbol validity, symbol uniqueness.
pub fn validate(
    board: &Board,
    occupancy: &Occupancy,
    candidate: &Candidate,
    config: &CircuitConfig,
) -> Result<(), CircuitError> {
    let position = candidate.position();
    if !board.contains(position) {
        return Err(CircuitError::OutOfBounds {
            position,
            board: *board,
        });
    }
    if let Some(existing) = occupancy.at(position) {
        return Err(CircuitError::CellOccupied {
            position,
            occupant: existing.kind(),
        });
    }

    let (kind, symbol, limit) = match *candidate {
        Candidate::Emitter { symbol, .. } => (EntityKind::Emitter, symbol, config.max_emitters),
        Candidate::Receiver { symbol, .. } => {
            (EntityKind::Receiver, symbol, config.max_receivers)
        }
        Candidate::Mirror { .. } => return Ok(()),
    };
    if occupancy.count(kind) >= limit {
        return Err(CircuitError::CapacityExceeded { kind, limit });
    }
    if !is_valid_symbol(kind, symbol) {
        return Err(CircuitError::InvalidSymbol { kind, symbol });
    }
    if occupancy.by_symbol(symbol).is_some() {
        return Err(CircuitError::DuplicateSymbol(symbol));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board {
            width: 4,
            height: 3,
        }
    }

    fn place(occupancy: &mut Occupancy, candidate: Candidate) -> Result<(), CircuitError> {
        validate(&board(), occupancy, &candidate, &CircuitConfig::default())?;
        let index = occupancy.count(candidate.kind());
        occupancy.record(&candidate, index);
        Ok(())
    }

    #[test]
    fn test_out_of_bounds() {
        let occ = Occupancy::default();
        for pos in [Position::new(4, 0), Position::new(0, 3), Position::new(-1, 1)] {
            let c = Candidate::Mirror { position: pos };
            assert!(matches!(
                validate(&board(), &occ, &c, &CircuitConfig::default()),
                Err(CircuitError::OutOfBounds { .. })
            ));
        }
    }

    #[test]
    fn test_cell_occupied_any_order() {
        let pos = Position::new(1, 1);
        let candidates = [
            Candidate::Emitter {
                symbol: 'A',
                position: pos,
            },
            Candidate::Receiver {
                symbol: 'R',
                position: pos,
            },
            Candidate::Mirror { position: pos },
        ];
        for first in &candidates {
            for second in &candidates {
                let mut occ = Occupancy::default();
                place(&mut occ, *first).unwrap();
                let err = place(&mut occ, *second).unwrap_err();
                assert_eq!(
                    err,
                    CircuitError::CellOccupied {
                        position: pos,
                        occupant: first.kind()
                    }
                );
            }
        }
    }

    #[test]
    fn test_capacity_limit() {
        let mut occ = Occupancy::default();
        let config = CircuitConfig {
            max_emitters: 2,
            ..CircuitConfig::default()
        };
        for (i, symbol) in ['A', 'B'].into_iter().enumerate() {
            let c = Candidate::Emitter {
                symbol,
                position: Position::new(i as i32, 0),
            };
            validate(&board(), &occ, &c, &config).unwrap();
            occ.record(&c, i);
        }
        let c = Candidate::Emitter {
            symbol: 'C',
            position: Position::new(3, 0),
        };
        assert_eq!(
            validate(&board(), &occ, &c, &config),
            Err(CircuitError::CapacityExceeded {
                kind: EntityKind::Emitter,
                limit: 2
            })
        );
        // receivers have their own budget
        let r = Candidate::Receiver {
            symbol: 'R',
            position: Position::new(3, 0),
        };
        assert!(validate(&board(), &occ, &r, &config).is_ok());
    }

    #[test]
    fn test_duplicate_symbol_across_kinds() {
        let mut occ = Occupancy::default();
        place(
            &mut occ,
            Candidate::Emitter {
                symbol: 'A',
                position: Position::new(0, 0),
            },
        )
        .unwrap();
        let err = place(
            &mut occ,
            Candidate::Receiver {
                symbol: 'A',
                position: Position::new(1, 0),
            },
        )
        .unwrap_err();
        assert_eq!(err, CircuitError::DuplicateSymbol('A'));
    }

    #[test]
    fn test_invalid_symbols() {
        let occ = Occupancy::default();
        let c = Candidate::Emitter {
            symbol: 'a',
            position: Position::new(0, 0),
        };
        assert!(matches!(
            validate(&board(), &occ, &c, &CircuitConfig::default()),
            Err(CircuitError::InvalidSymbol { .. })
        ));
        assert!(is_valid_symbol(EntityKind::Receiver, '7'));
        assert!(!is_valid_symbol(EntityKind::Receiver, '/'));
    }

    #[test]
    fn test_lookup_tables() {
        let mut occ = Occupancy::default();
        place(
            &mut occ,
            Candidate::Receiver {
                symbol: 'R',
                position: Position::new(2, 2),
            },
        )
        .unwrap();
        place(
            &mut occ,
            Candidate::Mirror {
                position: Position::new(1, 2),
            },
        )
        .unwrap();
        assert_eq!(occ.by_symbol('R'), Some(Occupant::Receiver(0)));
        assert_eq!(occ.at(Position::new(1, 2)), Some(Occupant::Mirror(0)));
        assert_eq!(occ.count(EntityKind::Mirror), 1);
        assert_eq!(occ.at(Position::new(0, 0)), None);
    }
}
