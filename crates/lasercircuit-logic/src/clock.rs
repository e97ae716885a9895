//! The simulation clock: lock-step tick loop.
//!
//! Per tick, in order:
//!
//! 1. Spawn: emitters active at this tick, ascending by position, place a
//!    beam on their own cell. A fresh beam does not move on its spawn tick.
//! 2. Advance: older beams move one cell, except beams turning on a mirror.
//! 3. Interact: moved beams, ascending by id, resolve their new cell
//!    (board edge, receiver, emitter, mirror) and the loop check.
//! 4. Collide: beams sharing a cell merge (frequency mode) or follow the
//!    configured collision policy.
//!
//! The run ends once no emitter can fire and no beam is in flight.

use std::collections::{BTreeMap, HashSet};

use crate::beam::Beam;
use crate::circuit::LaserCircuit;
use crate::config::CollisionPolicy;
use crate::placement::Occupant;
use crate::report::{BeamEvent, DeliveryReport, TraceEvent};
use crate::spectrum::Composition;

/// Run state: the tick counter and every beam in flight.
#[derive(Debug, Default)]
pub(crate) struct Clock {
    tick: u64,
    next_id: u64,
    beams: Vec<Beam>,
    events: Vec<BeamEvent>,
    trace: Vec<TraceEvent>,
}

/// Last tick a run may reach.
///
/// A beam path is a chain of straight segments joined by mirror turns.
/// Without revisiting a state a beam hits each (mirror, incoming direction)
/// at most once, so it makes at most `4·M` turns and `4·M + 1` segments,
/// each at most `longest_side` cells plus one turning tick.
pub(crate) fn tick_limit(circuit: &LaserCircuit) -> u64 {
    let last_end = circuit
        .emitters
        .iter()
        .map(|e| e.pulse_sequence().end_tick())
        .max()
        .unwrap_or(0);
    let segments = (circuit.mirrors.len() as u64).saturating_mul(4).saturating_add(1);
    last_end.saturating_add(segments.saturating_mul(circuit.board.longest_side() as u64 + 1))
}

/// Start of the earliest window some emitter has yet to fire.
fn next_spawn_tick(circuit: &LaserCircuit) -> Option<u64> {
    circuit
        .emitters
        .iter()
        .filter_map(|e| e.next_window_start())
        .min()
}

pub(crate) fn run(circuit: &mut LaserCircuit) -> DeliveryReport {
    for emitter in &mut circuit.emitters {
        emitter.fired = 0;
    }

    let mut order: Vec<usize> = (0..circuit.emitters.len()).collect();
    order.sort_by_key(|&i| circuit.emitters[i].position);

    let limit = tick_limit(circuit);
    let mut clock = Clock::default();
    while !clock.is_finished(circuit) {
        // nothing in flight: skip the idle ticks before the next window
        if clock.beams.is_empty() {
            if let Some(next) = next_spawn_tick(circuit) {
                clock.tick = clock.tick.max(next);
            }
        }
        if clock.tick > limit {
            clock.abandon();
            break;
        }
        clock.step(circuit, &order);
        match clock.tick.checked_add(1) {
            Some(tick) => clock.tick = tick,
            None => {
                clock.abandon();
                break;
            }
        }
    }

    let report = DeliveryReport {
        ticks: clock.tick,
        events: clock.events,
        trace: clock.trace,
        idle_emitters: circuit.emitters_without_sequence(),
        board: circuit.render_board(),
    };
    log::info!(
        "Circuit finished after {} tick(s): {} delivered, {} ended otherwise",
        report.ticks,
        report.deliveries().count(),
        report.events.len() - report.deliveries().count()
    );
    report
}

impl Clock {
    fn is_finished(&self, circuit: &LaserCircuit) -> bool {
        self.beams.is_empty() && circuit.emitters.iter().all(|e| e.is_exhausted())
    }

    fn step(&mut self, circuit: &mut LaserCircuit, order: &[usize]) {
        self.spawn(circuit, order);

        let circuit = &*circuit;
        let mut ended = HashSet::new();
        for beam in self.beams.iter_mut() {
            if beam.spawn_tick == self.tick {
                continue;
            }
            if beam.is_turning() {
                log::debug!(
                    "tick {}: beam {} turning {} at {}",
                    self.tick,
                    beam.id,
                    beam.direction,
                    beam.position
                );
            }
            if !beam.advance() {
                continue;
            }
            if let Some(event) = interact(beam, circuit, self.tick, &mut self.trace) {
                log::debug!("beam {}: {}", beam.id, event);
                ended.insert(beam.id);
                self.events.push(event);
            }
        }
        self.collide(circuit, &mut ended);
        self.beams.retain(|b| !ended.contains(&b.id));
    }

    fn spawn(&mut self, circuit: &mut LaserCircuit, order: &[usize]) {
        for &i in order {
            let emitter = &mut circuit.emitters[i];
            if !emitter.try_fire(self.tick) {
                continue;
            }
            let beam = Beam::new(
                self.next_id,
                emitter.position,
                emitter.facing,
                emitter.symbol,
                emitter.color,
                self.tick,
            );
            self.next_id += 1;
            log::debug!(
                "tick {}: {} fires beam {} {}",
                self.tick,
                emitter.symbol,
                beam.id,
                beam.direction
            );
            self.trace.push(TraceEvent::Spawned {
                tick: self.tick,
                beam: beam.id,
                emitter: beam.origin,
                position: beam.position,
                direction: beam.direction,
            });
            self.beams.push(beam);
        }
    }

    /// Resolve beams that ended this tick on the same cell.
    fn collide(&mut self, circuit: &LaserCircuit, ended: &mut HashSet<u64>) {
        let mut cells: BTreeMap<_, Vec<usize>> = BTreeMap::new();
        for (i, beam) in self.beams.iter().enumerate() {
            if !ended.contains(&beam.id) {
                cells.entry(beam.position).or_default().push(i);
            }
        }

        for group in cells.into_values().filter(|g| g.len() > 1) {
            if let Some(spectrum) = &circuit.spectrum {
                let survivor = group[0];
                for &other in &group[1..] {
                    let (Some(a), Some(b)) = (self.beams[survivor].color, self.beams[other].color)
                    else {
                        continue;
                    };
                    match spectrum.compose(&a, &b) {
                        Composition::Color(color) => {
                            self.beams[survivor].color = Some(color);
                            ended.insert(self.beams[other].id);
                            self.trace.push(TraceEvent::Merged {
                                tick: self.tick,
                                into: self.beams[survivor].id,
                                from: self.beams[other].id,
                                color,
                            });
                        }
                        Composition::Conflict => log::warn!(
                            "beams {} and {} cannot merge, passing through",
                            self.beams[survivor].id,
                            self.beams[other].id
                        ),
                    }
                }
                continue;
            }

            if circuit.config.collision_policy == CollisionPolicy::Annihilate {
                self.annihilate(&group, ended);
            }
        }
    }

    /// Cancel pairs of opposing beams within one cell, lowest ids first.
    fn annihilate(&mut self, group: &[usize], ended: &mut HashSet<u64>) {
        for (n, &i) in group.iter().enumerate() {
            if ended.contains(&self.beams[i].id) {
                continue;
            }
            let opposing = group[n + 1..].iter().copied().find(|&j| {
                !ended.contains(&self.beams[j].id)
                    && self.beams[j].direction == self.beams[i].direction.opposite()
            });
            if let Some(j) = opposing {
                for k in [i, j] {
                    let beam = &self.beams[k];
                    ended.insert(beam.id);
                    self.events.push(BeamEvent::Annihilated {
                        tick: self.tick,
                        emitter: beam.origin,
                        position: beam.position,
                        color: beam.color,
                    });
                }
            }
        }
    }

    /// Terminate everything still in flight once the tick bound is hit.
    fn abandon(&mut self) {
        for beam in self.beams.drain(..) {
            log::warn!(
                "beam {} from {} still in flight at tick {}, treated as trapped",
                beam.id,
                beam.origin,
                self.tick
            );
            self.events.push(BeamEvent::Trapped {
                tick: self.tick,
                emitter: beam.origin,
                position: beam.position,
                direction: beam.direction,
                color: beam.color,
            });
        }
    }
}

/// Resolve the cell a beam has just moved into. Returns the terminal event
/// if the beam ends here.
fn interact(
    beam: &mut Beam,
    circuit: &LaserCircuit,
    tick: u64,
    trace: &mut Vec<TraceEvent>,
) -> Option<BeamEvent> {
    if !circuit.board.contains(beam.position) {
        return Some(BeamEvent::Lost {
            tick,
            emitter: beam.origin,
            exit: beam.position,
            color: beam.color,
        });
    }

    match circuit.occupancy.at(beam.position) {
        Some(Occupant::Receiver(i)) => {
            return Some(BeamEvent::Delivered {
                tick,
                receiver: circuit.receivers[i].symbol,
                emitter: beam.origin,
                color: beam.color,
            })
        }
        Some(Occupant::Emitter(i)) => {
            return Some(BeamEvent::Absorbed {
                tick,
                emitter: beam.origin,
                by: circuit.emitters[i].symbol,
                color: beam.color,
            })
        }
        Some(Occupant::Mirror(i)) => {
            beam.reflect(circuit.mirrors[i].orientation);
            trace.push(TraceEvent::Reflected {
                tick,
                beam: beam.id,
                position: beam.position,
                direction: beam.direction,
            });
        }
        None => {}
    }

    if !beam.mark_visited() {
        log::warn!(
            "beam {} from {} trapped in a loop at {}",
            beam.id,
            beam.origin,
            beam.position
        );
        return Some(BeamEvent::Trapped {
            tick,
            emitter: beam.origin,
            position: beam.position,
            direction: beam.direction,
            color: beam.color,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Emitter, Mirror, MirrorOrientation, Receiver};
    use crate::geometry::{Direction, Position};

    /// Four mirrors forming a closed loop around the centre of a 5×5 board.
    fn mirror_loop() -> LaserCircuit {
        let mut circuit = LaserCircuit::new(5, 5).unwrap();
        for (x, y, o) in [
            (1, 1, MirrorOrientation::Back),
            (3, 1, MirrorOrientation::Forward),
            (3, 3, MirrorOrientation::Back),
            (1, 3, MirrorOrientation::Forward),
        ] {
            circuit.add_mirror(Mirror::new(Position::new(x, y), o)).unwrap();
        }
        circuit
    }

    #[test]
    fn test_tick_limit_without_mirrors() {
        let mut circuit = LaserCircuit::new(4, 6).unwrap();
        circuit
            .add_emitter(Emitter::new('A', Position::new(0, 0), Direction::North))
            .unwrap();
        circuit.attach_pulse_sequence('A', 3, 2).unwrap();
        assert_eq!(tick_limit(&circuit), 5 + 6 + 1);
    }

    #[test]
    fn test_tick_limit_grows_with_mirrors() {
        let circuit = mirror_loop();
        assert_eq!(tick_limit(&circuit), 17 * 6);
    }

    #[test]
    fn test_tick_limit_saturates() {
        let mut circuit = LaserCircuit::new(3, 3).unwrap();
        circuit
            .add_emitter(Emitter::new('E', Position::new(0, 1), Direction::East))
            .unwrap();
        circuit.attach_pulse_sequence('E', u64::MAX - 1, 1).unwrap();
        assert_eq!(tick_limit(&circuit), u64::MAX);
    }

    #[test]
    fn test_next_spawn_tick_follows_firing() {
        let mut circuit = LaserCircuit::new(3, 3).unwrap();
        circuit
            .add_emitter(Emitter::new('A', Position::new(0, 0), Direction::North))
            .unwrap();
        circuit
            .add_emitter(Emitter::new('B', Position::new(1, 0), Direction::North))
            .unwrap();
        circuit.attach_pulse_sequence('A', 40, 2).unwrap();
        circuit.attach_pulse_sequence('B', 7, 1).unwrap();
        assert_eq!(next_spawn_tick(&circuit), Some(7));

        assert!(circuit.emitters[1].try_fire(7));
        assert_eq!(next_spawn_tick(&circuit), Some(40));
        assert!(circuit.emitters[0].try_fire(41));
        assert_eq!(next_spawn_tick(&circuit), None);
    }

    #[test]
    fn test_beam_in_mirror_loop_is_trapped() {
        let mut circuit = mirror_loop();
        let mut clock = Clock::default();
        // placed on the bottom edge of the loop, heading east
        clock.beams.push(Beam::new(
            0,
            Position::new(2, 1),
            Direction::East,
            'A',
            None,
            0,
        ));
        clock.next_id = 1;
        let order: Vec<usize> = Vec::new();
        while !clock.beams.is_empty() && clock.tick < 100 {
            clock.tick += 1;
            clock.step(&mut circuit, &order);
        }

        assert!(clock.beams.is_empty());
        assert_eq!(clock.events.len(), 1);
        match &clock.events[0] {
            BeamEvent::Trapped {
                position,
                direction,
                ..
            } => {
                // back where it started after one lap
                assert_eq!(*position, Position::new(2, 1));
                assert_eq!(*direction, Direction::East);
            }
            other => panic!("expected trapped, got {:?}", other),
        }
        let reflections = clock
            .trace
            .iter()
            .filter(|t| matches!(t, TraceEvent::Reflected { .. }))
            .count();
        assert_eq!(reflections, 4);
        assert_eq!(clock.events[0].tick(), 12);
    }

    #[test]
    fn test_abandon_reports_trapped() {
        let mut clock = Clock::default();
        clock.tick = 9;
        clock.beams.push(Beam::new(
            3,
            Position::new(1, 1),
            Direction::West,
            'B',
            None,
            2,
        ));
        clock.abandon();
        assert!(clock.beams.is_empty());
        assert!(matches!(
            clock.events[0],
            BeamEvent::Trapped {
                tick: 9,
                emitter: 'B',
                ..
            }
        ));
    }

    #[test]
    fn test_spawn_order_by_position() {
        let mut circuit = LaserCircuit::new(3, 3).unwrap();
        // inserted right-to-left, fired left-to-right
        for (symbol, x) in [('C', 2), ('B', 1), ('A', 0)] {
            circuit
                .add_emitter(Emitter::new(symbol, Position::new(x, 0), Direction::North))
                .unwrap();
            circuit.attach_pulse_sequence(symbol, 0, 1).unwrap();
        }
        circuit
            .add_receiver(Receiver::new('R', Position::new(1, 2)))
            .unwrap();
        let report = circuit.run();
        let spawned: Vec<char> = report
            .trace
            .iter()
            .filter_map(|t| match t {
                TraceEvent::Spawned { emitter, .. } => Some(*emitter),
                _ => None,
            })
            .collect();
        assert_eq!(spawned, vec!['A', 'B', 'C']);
    }
}
