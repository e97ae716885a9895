//! Beams: light travelling one cell per tick.

use std::collections::HashSet;

use crate::entities::MirrorOrientation;
use crate::geometry::{Direction, Position};
use crate::spectrum::Color;

/// A beam in flight. Owned by the simulation clock until it terminates.
#[derive(Debug, Clone)]
pub struct Beam {
    /// Creation order; lower ids are resolved first.
    pub id: u64,
    pub position: Position,
    pub direction: Direction,
    pub origin: char,
    pub color: Option<Color>,
    pub spawn_tick: u64,
    /// Set on the tick a mirror turns the beam; the next tick is spent
    /// on the mirror cell.
    turning: bool,
    visited: HashSet<(Position, Direction)>,
}

impl Beam {
    pub fn new(
        id: u64,
        position: Position,
        direction: Direction,
        origin: char,
        color: Option<Color>,
        spawn_tick: u64,
    ) -> Self {
        let mut visited = HashSet::new();
        visited.insert((position, direction));
        Self {
            id,
            position,
            direction,
            origin,
            color,
            spawn_tick,
            turning: false,
            visited,
        }
    }

    /// Move one cell, unless the beam is turning on a mirror.
    /// Returns whether the beam changed cell.
    pub fn advance(&mut self) -> bool {
        if self.turning {
            self.turning = false;
            return false;
        }
        self.position = self.position.step(self.direction);
        true
    }

    /// Turn on a mirror. The beam stays on this cell for one more tick.
    pub fn reflect(&mut self, mirror: MirrorOrientation) {
        self.direction = mirror.reflect(self.direction);
        self.turning = true;
    }

    pub fn is_turning(&self) -> bool {
        self.turning
    }

    /// Record the current `(position, direction)` state. Returns `false`
    /// if the beam has been in this state before, i.e. it is looping.
    pub fn mark_visited(&mut self) -> bool {
        self.visited.insert((self.position, self.direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beam() -> Beam {
        Beam::new(0, Position::new(0, 0), Direction::East, 'A', None, 0)
    }

    #[test]
    fn test_advance_moves_one_cell() {
        let mut b = beam();
        assert!(b.advance());
        assert_eq!(b.position, Position::new(1, 0));
        assert!(b.advance());
        assert_eq!(b.position, Position::new(2, 0));
    }

    #[test]
    fn test_reflection_costs_one_tick() {
        let mut b = beam();
        b.advance();
        b.reflect(MirrorOrientation::Forward);
        assert_eq!(b.direction, Direction::North);
        assert!(b.is_turning());
        assert!(!b.advance());
        assert_eq!(b.position, Position::new(1, 0));
        assert!(b.advance());
        assert_eq!(b.position, Position::new(1, 1));
    }

    #[test]
    fn test_double_forward_reflection_restores_direction() {
        // `/` at (1,0) sends the beam north, `/` at (1,1) would send a
        // northbound beam east again
        let mut b = beam();
        b.advance();
        b.reflect(MirrorOrientation::Forward);
        b.advance();
        b.advance();
        b.reflect(MirrorOrientation::Forward);
        assert_eq!(b.direction, Direction::East);
        assert_eq!(b.position, Position::new(1, 1));
    }

    #[test]
    fn test_revisit_detected() {
        let mut b = beam();
        assert!(!b.mark_visited()); // spawn state already recorded
        b.advance();
        assert!(b.mark_visited());
        assert!(!b.mark_visited());
    }
}
