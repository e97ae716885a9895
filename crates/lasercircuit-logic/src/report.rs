//! Run output: terminal beam events, the per-tick trace and the board.

use serde::Serialize;
use std::fmt;

use crate::geometry::{Direction, Position};
use crate::spectrum::Color;

/// How a beam ended. One entry per terminated beam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BeamEvent {
    /// Reached a receiver.
    Delivered {
        tick: u64,
        receiver: char,
        emitter: char,
        color: Option<Color>,
    },
    /// Left the board. `exit` is the first off-board cell.
    Lost {
        tick: u64,
        emitter: char,
        exit: Position,
        color: Option<Color>,
    },
    /// Revisited a state, or was still in flight at the tick bound.
    Trapped {
        tick: u64,
        emitter: char,
        position: Position,
        direction: Direction,
        color: Option<Color>,
    },
    /// Ran into an emitter.
    Absorbed {
        tick: u64,
        emitter: char,
        by: char,
        color: Option<Color>,
    },
    /// Cancelled by an opposing beam on the same cell.
    Annihilated {
        tick: u64,
        emitter: char,
        position: Position,
        color: Option<Color>,
    },
}

impl BeamEvent {
    pub fn tick(&self) -> u64 {
        match *self {
            BeamEvent::Delivered { tick, .. }
            | BeamEvent::Lost { tick, .. }
            | BeamEvent::Trapped { tick, .. }
            | BeamEvent::Absorbed { tick, .. }
            | BeamEvent::Annihilated { tick, .. } => tick,
        }
    }

    /// Symbol of the emitter the beam came from.
    pub fn emitter(&self) -> char {
        match *self {
            BeamEvent::Delivered { emitter, .. }
            | BeamEvent::Lost { emitter, .. }
            | BeamEvent::Trapped { emitter, .. }
            | BeamEvent::Absorbed { emitter, .. }
            | BeamEvent::Annihilated { emitter, .. } => emitter,
        }
    }

    fn color(&self) -> Option<Color> {
        match *self {
            BeamEvent::Delivered { color, .. }
            | BeamEvent::Lost { color, .. }
            | BeamEvent::Trapped { color, .. }
            | BeamEvent::Absorbed { color, .. }
            | BeamEvent::Annihilated { color, .. } => color,
        }
    }
}

impl fmt::Display for BeamEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {}: ", self.tick())?;
        match self {
            BeamEvent::Delivered {
                receiver, emitter, ..
            } => write!(f, "{} -> {} delivered", emitter, receiver)?,
            BeamEvent::Lost { emitter, exit, .. } => {
                write!(f, "{} lost off the board at {}", emitter, exit)?
            }
            BeamEvent::Trapped {
                emitter,
                position,
                direction,
                ..
            } => write!(
                f,
                "{} trapped at {} heading {}",
                emitter, position, direction
            )?,
            BeamEvent::Absorbed { emitter, by, .. } => {
                write!(f, "{} absorbed by emitter {}", emitter, by)?
            }
            BeamEvent::Annihilated {
                emitter, position, ..
            } => write!(f, "{} annihilated at {}", emitter, position)?,
        }
        if let Some(color) = self.color() {
            write!(f, " [{}]", color.name)?;
        }
        Ok(())
    }
}

/// Non-terminal things that happened during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEvent {
    Spawned {
        tick: u64,
        beam: u64,
        emitter: char,
        position: Position,
        direction: Direction,
    },
    Reflected {
        tick: u64,
        beam: u64,
        position: Position,
        direction: Direction,
    },
    /// Beam `from` was folded into beam `into`, which now carries `color`.
    Merged {
        tick: u64,
        into: u64,
        from: u64,
        color: Color,
    },
}

/// Everything a run produced, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    /// Number of ticks simulated.
    pub ticks: u64,
    pub events: Vec<BeamEvent>,
    pub trace: Vec<TraceEvent>,
    /// Emitters that never had a pulse sequence attached.
    pub idle_emitters: Vec<char>,
    pub board: String,
}

impl DeliveryReport {
    /// No beam terminated.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn deliveries(&self) -> impl Iterator<Item = &BeamEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, BeamEvent::Delivered { .. }))
    }

    pub fn deliveries_for(&self, receiver: char) -> impl Iterator<Item = &BeamEvent> {
        self.deliveries().filter(
            move |e| matches!(e, BeamEvent::Delivered { receiver: r, .. } if *r == receiver),
        )
    }
}

impl fmt::Display for DeliveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.board)?;
        writeln!(f, "Ran for {} tick(s).", self.ticks)?;
        for event in &self.events {
            writeln!(f, "  {}", event)?;
        }
        if !self.idle_emitters.is_empty() {
            let idle: Vec<String> = self.idle_emitters.iter().map(|c| c.to_string()).collect();
            writeln!(f, "No pulse sequence: {}", idle.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::ColorName;

    fn sample() -> DeliveryReport {
        DeliveryReport {
            ticks: 4,
            events: vec![
                BeamEvent::Lost {
                    tick: 3,
                    emitter: 'B',
                    exit: Position::new(3, 0),
                    color: None,
                },
                BeamEvent::Delivered {
                    tick: 4,
                    receiver: 'R',
                    emitter: 'A',
                    color: Some(Color {
                        name: ColorName::Green,
                        high: 520,
                        low: 510,
                    }),
                },
            ],
            trace: vec![],
            idle_emitters: vec!['C'],
            board: "+-+\n| |\n+-+".to_string(),
        }
    }

    #[test]
    fn test_deliveries_filter() {
        let report = sample();
        assert_eq!(report.deliveries().count(), 1);
        assert_eq!(report.deliveries_for('R').count(), 1);
        assert_eq!(report.deliveries_for('Q').count(), 0);
        assert!(!report.is_empty());
    }

    #[test]
    fn test_event_display() {
        let report = sample();
        assert_eq!(
            report.events[0].to_string(),
            "tick 3: B lost off the board at (3, 0)"
        );
        assert_eq!(report.events[1].to_string(), "tick 4: A -> R delivered [green]");
    }

    #[test]
    fn test_report_display() {
        let text = sample().to_string();
        assert!(text.starts_with("+-+\n| |\n+-+\n"));
        assert!(text.contains("Ran for 4 tick(s)."));
        assert!(text.contains("No pulse sequence: C"));
    }

    #[test]
    fn test_accessors() {
        let report = sample();
        assert_eq!(report.events[1].tick(), 4);
        assert_eq!(report.events[1].emitter(), 'A');
    }
}
