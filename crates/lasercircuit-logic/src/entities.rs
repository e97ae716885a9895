//! Static board occupants: emitters, receivers and mirrors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Direction, Position};
use crate::pulse::PulseSequence;
use crate::spectrum::Color;

/// Light source. Spawns one beam per pulse window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emitter {
    pub symbol: char,
    pub position: Position,
    pub facing: Direction,
    /// Declared `(high, low)` frequency pair, used in frequency mode.
    pub frequency: Option<(u32, u32)>,
    /// Classified from `frequency` when the emitter joins a circuit
    /// running in frequency mode.
    pub color: Option<Color>,
    pub(crate) pulses: PulseSequence,
    /// Windows already fired during the current run.
    #[serde(skip)]
    pub(crate) fired: usize,
}

impl Emitter {
    pub fn new(symbol: char, position: Position, facing: Direction) -> Self {
        Self {
            symbol,
            position,
            facing,
            frequency: None,
            color: None,
            pulses: PulseSequence::default(),
            fired: 0,
        }
    }

    pub fn with_frequency(mut self, high: u32, low: u32) -> Self {
        self.frequency = Some((high, low));
        self
    }

    pub fn pulse_sequence(&self) -> &PulseSequence {
        &self.pulses
    }

    pub fn is_pulse_sequence_set(&self) -> bool {
        self.pulses.is_set()
    }

    /// No window left to fire in this run.
    pub fn is_exhausted(&self) -> bool {
        self.fired >= self.pulses.windows().len()
    }

    /// Start of the first window not yet fired in this run.
    pub fn next_window_start(&self) -> Option<u64> {
        self.pulses.windows().get(self.fired).map(|w| w.start)
    }

    /// Whether the emitter should spawn a beam at `tick`, marking the
    /// window as fired if so.
    pub(crate) fn try_fire(&mut self, tick: u64) -> bool {
        match self.pulses.window_at(tick) {
            Some(window) if window >= self.fired => {
                self.fired = window + 1;
                true
            }
            _ => false,
        }
    }
}

/// Light sink. Accepts beams arriving from any side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub symbol: char,
    pub position: Position,
}

impl Receiver {
    pub fn new(symbol: char, position: Position) -> Self {
        Self { symbol, position }
    }
}

/// Mirror glyph, which is also its orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MirrorOrientation {
    /// `/`
    Forward,
    /// `\`
    Back,
}

impl MirrorOrientation {
    pub fn symbol(self) -> char {
        match self {
            MirrorOrientation::Forward => '/',
            MirrorOrientation::Back => '\\',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '/' => Some(MirrorOrientation::Forward),
            '\\' => Some(MirrorOrientation::Back),
            _ => None,
        }
    }

    /// Turn a travel direction by 90°.
    ///
    /// `/` swaps North↔East and South↔West; `\` swaps North↔West and
    /// South↔East.
    pub fn reflect(self, direction: Direction) -> Direction {
        use Direction::*;
        match (self, direction) {
            (MirrorOrientation::Forward, North) => East,
            (MirrorOrientation::Forward, East) => North,
            (MirrorOrientation::Forward, South) => West,
            (MirrorOrientation::Forward, West) => South,
            (MirrorOrientation::Back, North) => West,
            (MirrorOrientation::Back, West) => North,
            (MirrorOrientation::Back, South) => East,
            (MirrorOrientation::Back, East) => South,
        }
    }
}

impl fmt::Display for MirrorOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mirror {
    pub position: Position,
    pub orientation: MirrorOrientation,
}

impl Mirror {
    pub fn new(position: Position, orientation: MirrorOrientation) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_table() {
        let fwd = MirrorOrientation::Forward;
        let back = MirrorOrientation::Back;
        assert_eq!(fwd.reflect(Direction::East), Direction::North);
        assert_eq!(fwd.reflect(Direction::North), Direction::East);
        assert_eq!(fwd.reflect(Direction::South), Direction::West);
        assert_eq!(back.reflect(Direction::East), Direction::South);
        assert_eq!(back.reflect(Direction::North), Direction::West);
    }

    #[test]
    fn test_reflect_is_involutive() {
        for o in [MirrorOrientation::Forward, MirrorOrientation::Back] {
            for d in Direction::ALL {
                let turned = o.reflect(d);
                assert_ne!(turned, d);
                assert_ne!(turned, d.opposite());
                assert_eq!(o.reflect(turned), d);
            }
        }
    }

    #[test]
    fn test_reflect_off_mirror_reverses_path() {
        // a beam bounced by a mirror and sent back the way it left
        // retraces its incoming line
        for o in [MirrorOrientation::Forward, MirrorOrientation::Back] {
            for d in Direction::ALL {
                let out = o.reflect(d);
                assert_eq!(o.reflect(out.opposite()), d.opposite());
            }
        }
    }

    #[test]
    fn test_mirror_symbols() {
        assert_eq!(MirrorOrientation::from_symbol('/'), Some(MirrorOrientation::Forward));
        assert_eq!(MirrorOrientation::from_symbol('\\'), Some(MirrorOrientation::Back));
        assert_eq!(MirrorOrientation::from_symbol('|'), None);
        assert_eq!(MirrorOrientation::Back.to_string(), "\\");
    }

    #[test]
    fn test_emitter_fires_once_per_window() {
        let mut e = Emitter::new('A', Position::new(0, 0), Direction::East);
        e.pulses.set(1, 3, 'A').unwrap();
        assert!(!e.try_fire(0));
        assert!(e.try_fire(1));
        assert!(!e.try_fire(2));
        assert!(!e.try_fire(3));
        assert!(e.is_exhausted());
    }

    #[test]
    fn test_emitter_without_sequence_is_exhausted() {
        let e = Emitter::new('A', Position::new(0, 0), Direction::East);
        assert!(!e.is_pulse_sequence_set());
        assert!(e.is_exhausted());
    }
}
