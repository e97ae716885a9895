//! Pure simulation logic for laser circuits.
//!
//! A circuit is a rectangular board holding emitters, receivers and
//! mirrors. Emitters fire beams according to their pulse sequences; beams
//! travel one cell per tick, turn on mirrors and end at receivers or the
//! board edge. Nothing here performs I/O: callers hand in validated values
//! and get back a rendered board and a delivery report.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`beam`] | Beams in flight, movement and loop detection |
//! | [`circuit`] | `LaserCircuit`: setup operations, `run`, board rendering |
//! | `clock` | Lock-step tick loop: spawn, advance, interact, collide |
//! | [`config`] | Board limits, capacities, collision and spectrum policies |
//! | [`entities`] | Emitter, receiver, mirror and the reflection table |
//! | [`error`] | Setup errors |
//! | [`geometry`] | Positions, directions, board rectangle |
//! | [`parse`] | Textual input lines for sizes, entities and pulses |
//! | [`placement`] | Placement validation and the occupancy lookup tables |
//! | [`pulse`] | Pulse sequences (activation windows) |
//! | [`report`] | Delivery report, beam events, trace |
//! | [`spectrum`] | Seven-band color spectrum for frequency mode |

pub mod beam;
pub mod circuit;
mod clock;
pub mod config;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod parse;
pub mod placement;
pub mod pulse;
pub mod report;
pub mod spectrum;

pub use circuit::LaserCircuit;
pub use config::CircuitConfig;
pub use error::CircuitError;
pub use report::{BeamEvent, DeliveryReport};
