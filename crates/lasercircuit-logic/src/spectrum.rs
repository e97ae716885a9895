//! Visible-light color spectrum for frequency mode.
//!
//! The table is loaded from exactly seven `name: high-low` lines, violet
//! first, red last. Bands are contiguous and descending: each band's low
//! frequency is the next band's high frequency.
//!
//! ```
//! use lasercircuit_logic::spectrum::{ColorName, ColorSpectrum};
//!
//! let spectrum: ColorSpectrum = "violet: 789-668
//! blue: 668-606
//! cyan: 606-526
//! green: 526-508
//! yellow: 508-484
//! orange: 484-400
//! red: 400-384"
//!     .parse()
//!     .unwrap();
//! let color = spectrum.classify(520, 510).unwrap();
//! assert_eq!(color.name, ColorName::Green);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CircuitError;

/// Number of bands in a spectrum file.
pub const BAND_COUNT: usize = 7;

/// The seven band names, highest frequency first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorName {
    Violet,
    Blue,
    Cyan,
    Green,
    Yellow,
    Orange,
    Red,
}

impl ColorName {
    /// Required file order.
    pub const ORDER: [ColorName; BAND_COUNT] = [
        ColorName::Violet,
        ColorName::Blue,
        ColorName::Cyan,
        ColorName::Green,
        ColorName::Yellow,
        ColorName::Orange,
        ColorName::Red,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorName::Violet => "violet",
            ColorName::Blue => "blue",
            ColorName::Cyan => "cyan",
            ColorName::Green => "green",
            ColorName::Yellow => "yellow",
            ColorName::Orange => "orange",
            ColorName::Red => "red",
        }
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named band with its frequency range, `high > low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub name: ColorName,
    pub high: u32,
    pub low: u32,
}

impl Band {
    /// Half-open membership `low ≤ f < high`.
    fn holds(&self, frequency: u32) -> bool {
        self.low <= frequency && frequency < self.high
    }
}

/// Color carried by an emitter or a beam.
///
/// `high`/`low` is the frequency range the color was built from, so that
/// composed beams keep widening rather than snapping to a band's edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub name: ColorName,
    pub high: u32,
    pub low: u32,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}-{})", self.name, self.high, self.low)
    }
}

/// Outcome of combining two beam colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    Color(Color),
    /// The combined range has no band in this spectrum.
    Conflict,
}

/// Reason a spectrum table was rejected. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpectrumError {
    /// Found this many lines instead of seven.
    WrongLineCount(usize),
    /// Line is not `<color>: <high>-<low>`.
    MalformedLine { line: usize },
    /// Color name missing or out of order.
    WrongColor { line: usize, expected: ColorName },
    /// A frequency is not an integer.
    NonIntegerFrequency { line: usize },
    /// High frequency does not exceed low frequency.
    HighNotAboveLow { line: usize },
    /// High frequency differs from the previous band's low frequency.
    Discontinuity { line: usize, expected_high: u32 },
}

impl fmt::Display for SpectrumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpectrumError::WrongLineCount(n) => {
                write!(f, "expected {} lines, got {}", BAND_COUNT, n)
            }
            SpectrumError::MalformedLine { line } => write!(
                f,
                "line {} - must be in format <color>: <high frequency>-<low frequency>",
                line
            ),
            SpectrumError::WrongColor { line, expected } => {
                write!(f, "line {} - colour must be {}", line, expected)
            }
            SpectrumError::NonIntegerFrequency { line } => {
                write!(f, "line {} - both frequencies must be integers", line)
            }
            SpectrumError::HighNotAboveLow { line } => write!(
                f,
                "line {} - high frequency must be higher than low frequency",
                line
            ),
            SpectrumError::Discontinuity {
                line,
                expected_high,
            } => write!(
                f,
                "line {} - high frequency must equal low frequency of previous colour ({})",
                line, expected_high
            ),
        }
    }
}

impl std::error::Error for SpectrumError {}

/// A validated seven-band table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorSpectrum {
    bands: Vec<Band>,
}

impl ColorSpectrum {
    /// Validate a table given line by line.
    ///
    /// The table is accepted or rejected as a whole: contiguity depends on
    /// every line, so there is no partial result.
    pub fn load<S: AsRef<str>>(lines: &[S]) -> Result<Self, SpectrumError> {
        if lines.len() != BAND_COUNT {
            return Err(SpectrumError::WrongLineCount(lines.len()));
        }

        let mut bands = Vec::with_capacity(BAND_COUNT);
        for (i, (raw, expected)) in lines.iter().zip(ColorName::ORDER).enumerate() {
            let line = i + 1;
            let band = parse_band(raw.as_ref(), line, expected)?;
            if let Some(prev) = bands.last().map(|b: &Band| b.low) {
                if band.high != prev {
                    return Err(SpectrumError::Discontinuity {
                        line,
                        expected_high: prev,
                    });
                }
            }
            bands.push(band);
        }

        log::debug!(
            "Loaded color spectrum {}-{}",
            bands[0].high,
            bands[BAND_COUNT - 1].low
        );
        Ok(Self { bands })
    }

    /// Bands in file order, violet first.
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn band(&self, name: ColorName) -> &Band {
        &self.bands[name as usize]
    }

    /// Band containing `frequency`. The top band also owns its high edge.
    pub fn band_of(&self, frequency: u32) -> Option<&Band> {
        let top = self.band(ColorName::Violet);
        if frequency == top.high {
            return Some(top);
        }
        self.bands.iter().find(|b| b.holds(frequency))
    }

    /// Classify an emitter's declared frequency pair.
    ///
    /// The pair must be ordered (`high > low`) and fit entirely inside one
    /// band.
    pub fn classify(&self, high: u32, low: u32) -> Result<Color, CircuitError> {
        if high > low {
            if let Some(band) = self
                .bands
                .iter()
                .find(|b| b.low <= low && high <= b.high)
            {
                return Ok(Color {
                    name: band.name,
                    high,
                    low,
                });
            }
        }
        Err(CircuitError::FrequencyOutOfRange { high, low })
    }

    /// Combine two beam colors.
    ///
    /// The union of both frequency ranges is taken and named after the band
    /// holding its midpoint. Swapping the arguments gives the same result.
    pub fn compose(&self, a: &Color, b: &Color) -> Composition {
        let high = a.high.max(b.high);
        let low = a.low.min(b.low);
        let midpoint = low + (high - low) / 2;
        match self.band_of(midpoint) {
            Some(band) => Composition::Color(Color {
                name: band.name,
                high,
                low,
            }),
            None => Composition::Conflict,
        }
    }
}

impl FromStr for ColorSpectrum {
    type Err = SpectrumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s.lines().collect();
        Self::load(&lines)
    }
}

fn parse_band(raw: &str, line: usize, expected: ColorName) -> Result<Band, SpectrumError> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    if parts.len() != 2 {
        return Err(SpectrumError::MalformedLine { line });
    }
    let range: Vec<&str> = parts[1].trim().split('-').collect();
    if range.len() != 2 {
        return Err(SpectrumError::MalformedLine { line });
    }
    if parts[0].trim() != expected.as_str() {
        return Err(SpectrumError::WrongColor { line, expected });
    }
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| SpectrumError::NonIntegerFrequency { line })
    };
    let high = parse(range[0])?;
    let low = parse(range[1])?;
    if high <= low {
        return Err(SpectrumError::HighNotAboveLow { line });
    }
    Ok(Band {
        name: expected,
        high,
        low,
    })
}
