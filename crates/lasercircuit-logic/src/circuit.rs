//! The laser circuit: board, occupants and the entry points of a run.
//!
//! ```
//! use lasercircuit_logic::circuit::LaserCircuit;
//! use lasercircuit_logic::entities::{Emitter, Receiver};
//! use lasercircuit_logic::geometry::{Direction, Position};
//!
//! let mut circuit = LaserCircuit::new(3, 3).unwrap();
//! circuit
//!     .add_emitter(Emitter::new('E', Position::new(0, 1), Direction::East))
//!     .unwrap();
//! circuit.add_receiver(Receiver::new('R', Position::new(2, 1))).unwrap();
//! circuit.attach_pulse_sequence('E', 0, 1).unwrap();
//!
//! let report = circuit.run();
//! assert_eq!(report.deliveries().count(), 1);
//! assert_eq!(report.events[0].tick(), 2);
//! ```

use crate::clock;
use crate::config::{CircuitConfig, SpectrumFallback};
use crate::entities::{Emitter, Mirror, Receiver};
use crate::error::CircuitError;
use crate::geometry::Board;
use crate::placement::{self, Candidate, Occupancy, Occupant};
use crate::pulse::PulseWindow;
use crate::report::DeliveryReport;
use crate::spectrum::ColorSpectrum;

/// A board with its emitters, receivers and mirrors.
///
/// Entities are validated on the way in, so every stored position is on
/// the board and every cell holds at most one occupant.
#[derive(Debug, Clone)]
pub struct LaserCircuit {
    pub(crate) board: Board,
    pub(crate) config: CircuitConfig,
    /// Present in frequency mode.
    pub(crate) spectrum: Option<ColorSpectrum>,
    pub(crate) emitters: Vec<Emitter>,
    pub(crate) receivers: Vec<Receiver>,
    pub(crate) mirrors: Vec<Mirror>,
    pub(crate) occupancy: Occupancy,
}

impl LaserCircuit {
    /// Plain circuit with the default configuration.
    pub fn new(width: u32, height: u32) -> Result<Self, CircuitError> {
        Self::with_config(width, height, CircuitConfig::default())
    }

    pub fn with_config(width: u32, height: u32, config: CircuitConfig) -> Result<Self, CircuitError> {
        if !config.accepts_board(width, height) {
            return Err(CircuitError::InvalidBoardSize { width, height });
        }
        log::debug!("{}x{} board created", width, height);
        Ok(Self {
            board: Board { width, height },
            config,
            spectrum: None,
            emitters: Vec::new(),
            receivers: Vec::new(),
            mirrors: Vec::new(),
            occupancy: Occupancy::default(),
        })
    }

    /// Circuit in frequency mode.
    pub fn with_spectrum(
        width: u32,
        height: u32,
        spectrum: ColorSpectrum,
        config: CircuitConfig,
    ) -> Result<Self, CircuitError> {
        let mut circuit = Self::with_config(width, height, config)?;
        circuit.spectrum = Some(spectrum);
        Ok(circuit)
    }

    /// Load the spectrum table and build a frequency-mode circuit.
    ///
    /// A malformed table either fails the whole setup or drops back to a
    /// plain circuit, depending on `config.spectrum_fallback`.
    pub fn with_spectrum_lines<S: AsRef<str>>(
        width: u32,
        height: u32,
        lines: &[S],
        config: CircuitConfig,
    ) -> Result<Self, CircuitError> {
        match ColorSpectrum::load(lines) {
            Ok(spectrum) => Self::with_spectrum(width, height, spectrum, config),
            Err(e) => match config.spectrum_fallback {
                SpectrumFallback::Abort => Err(e.into()),
                SpectrumFallback::Disable => {
                    log::warn!("Spectrum rejected ({}), frequency mode disabled", e);
                    Self::with_config(width, height, config)
                }
            },
        }
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn config(&self) -> &CircuitConfig {
        &self.config
    }

    pub fn spectrum(&self) -> Option<&ColorSpectrum> {
        self.spectrum.as_ref()
    }

    pub fn is_frequency_mode(&self) -> bool {
        self.spectrum.is_some()
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    pub fn receivers(&self) -> &[Receiver] {
        &self.receivers
    }

    pub fn mirrors(&self) -> &[Mirror] {
        &self.mirrors
    }

    pub fn emitter(&self, symbol: char) -> Option<&Emitter> {
        match self.occupancy.by_symbol(symbol)? {
            Occupant::Emitter(i) => self.emitters.get(i),
            _ => None,
        }
    }

    /// Place an emitter. In frequency mode its declared frequency pair is
    /// classified into a color; outside it any pair is ignored.
    pub fn add_emitter(&mut self, mut emitter: Emitter) -> Result<(), CircuitError> {
        let candidate = Candidate::Emitter {
            symbol: emitter.symbol,
            position: emitter.position,
        };
        placement::validate(&self.board, &self.occupancy, &candidate, &self.config)?;

        emitter.color = match (&self.spectrum, emitter.frequency) {
            (Some(spectrum), Some((high, low))) => Some(spectrum.classify(high, low)?),
            (Some(_), None) => return Err(CircuitError::MissingFrequency(emitter.symbol)),
            (None, _) => None,
        };
        emitter.fired = 0;

        self.occupancy.record(&candidate, self.emitters.len());
        log::debug!(
            "Emitter {} added at {} facing {}",
            emitter.symbol,
            emitter.position,
            emitter.facing
        );
        self.emitters.push(emitter);
        Ok(())
    }

    pub fn add_receiver(&mut self, receiver: Receiver) -> Result<(), CircuitError> {
        let candidate = Candidate::Receiver {
            symbol: receiver.symbol,
            position: receiver.position,
        };
        placement::validate(&self.board, &self.occupancy, &candidate, &self.config)?;
        self.occupancy.record(&candidate, self.receivers.len());
        log::debug!("Receiver {} added at {}", receiver.symbol, receiver.position);
        self.receivers.push(receiver);
        Ok(())
    }

    pub fn add_mirror(&mut self, mirror: Mirror) -> Result<(), CircuitError> {
        let candidate = Candidate::Mirror {
            position: mirror.position,
        };
        placement::validate(&self.board, &self.occupancy, &candidate, &self.config)?;
        self.occupancy.record(&candidate, self.mirrors.len());
        log::debug!("Mirror {} added at {}", mirror.orientation, mirror.position);
        self.mirrors.push(mirror);
        Ok(())
    }

    /// Give an emitter its single activation window.
    pub fn attach_pulse_sequence(
        &mut self,
        symbol: char,
        start: u64,
        duration: u64,
    ) -> Result<(), CircuitError> {
        self.attach_pulse_windows(symbol, &[PulseWindow::new(start, duration)])
    }

    pub fn attach_pulse_windows(
        &mut self,
        symbol: char,
        windows: &[PulseWindow],
    ) -> Result<(), CircuitError> {
        let index = match self.occupancy.by_symbol(symbol) {
            Some(Occupant::Emitter(i)) => i,
            _ => return Err(CircuitError::UnknownEmitter(symbol)),
        };
        let emitter = self
            .emitters
            .get_mut(index)
            .ok_or(CircuitError::UnknownEmitter(symbol))?;
        emitter.pulses.set_windows(windows, symbol)?;
        log::debug!("Pulse sequence set for {}: {:?}", symbol, windows);
        Ok(())
    }

    /// Emitters that still have no pulse sequence, in insertion order.
    pub fn emitters_without_sequence(&self) -> Vec<char> {
        self.emitters
            .iter()
            .filter(|e| !e.is_pulse_sequence_set())
            .map(|e| e.symbol)
            .collect()
    }

    /// Run the simulation to completion.
    ///
    /// Runs are repeatable: firing bookkeeping is reset at the start.
    pub fn run(&mut self) -> DeliveryReport {
        clock::run(self)
    }

    /// Bordered text grid, top row first. Empty cells are spaces.
    pub fn render_board(&self) -> String {
        let width = self.board.width as usize;
        let border = format!("+{}+", "-".repeat(width));
        let mut out = String::with_capacity((width + 3) * (self.board.height as usize + 2));
        out.push_str(&border);
        out.push('\n');
        for row in self.board.rows() {
            out.push('|');
            for pos in row {
                let glyph = match self.occupancy.at(pos) {
                    Some(Occupant::Emitter(i)) => self.emitters[i].symbol,
                    Some(Occupant::Receiver(i)) => self.receivers[i].symbol,
                    Some(Occupant::Mirror(i)) => self.mirrors[i].orientation.symbol(),
                    None => ' ',
                };
                out.push(glyph);
            }
            out.push_str("|\n");
        }
        out.push_str(&border);
        out
    }
}
