//! Laser Circuit Headless Harness
//!
//! Runs the built-in check suite against the pure engine, or loads a
//! scenario file, runs it and prints the board and delivery report.
//! Runs entirely in-process with plain text output.
//!
//! Usage:
//!   cargo run -p lasercircuit-simtest
//!   cargo run -p lasercircuit-simtest -- --verbose
//!   cargo run -p lasercircuit-simtest -- --scenario circuit.json [--json]

use std::path::{Path, PathBuf};

use lasercircuit_logic::config::{CircuitConfig, CollisionPolicy, SpectrumFallback};
use lasercircuit_logic::entities::{Emitter, Mirror, MirrorOrientation, Receiver};
use lasercircuit_logic::geometry::{Direction, Position};
use lasercircuit_logic::parse;
use lasercircuit_logic::report::BeamEvent;
use lasercircuit_logic::spectrum::{ColorName, ColorSpectrum, SpectrumError};
use lasercircuit_logic::{CircuitError, DeliveryReport, LaserCircuit};
use serde::Deserialize;

// ── Scenario file ───────────────────────────────────────────────────────

/// A circuit described with the same textual lines the engine parses.
#[derive(Debug, Deserialize)]
struct Scenario {
    width: u32,
    height: u32,
    #[serde(default)]
    emitters: Vec<String>,
    #[serde(default)]
    receivers: Vec<String>,
    #[serde(default)]
    mirrors: Vec<String>,
    #[serde(default)]
    pulses: Vec<String>,
    /// Spectrum file, relative to the scenario file. Enables frequency mode.
    #[serde(default)]
    spectrum: Option<PathBuf>,
    #[serde(default)]
    config: CircuitConfig,
}

const VISIBLE_SPECTRUM: [&str; 7] = [
    "violet: 789-668",
    "blue: 668-606",
    "cyan: 606-526",
    "green: 526-508",
    "yellow: 508-484",
    "orange: 484-400",
    "red: 400-384",
];

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Args {
    verbose: bool,
    json: bool,
    scenario: Option<PathBuf>,
}

fn parse_args<I>(argv: I) -> Result<Args, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = Args {
        verbose: false,
        json: false,
        scenario: None,
    };
    let mut iter = argv.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--verbose" => args.verbose = true,
            "--json" => args.json = true,
            "--scenario" => match iter.next() {
                Some(path) => args.scenario = Some(PathBuf::from(path)),
                None => return Err("--scenario needs a file path".into()),
            },
            flag if flag.starts_with("--") => return Err(format!("unknown flag '{}'", flag)),
            path => args.scenario = Some(PathBuf::from(path)),
        }
    }
    Ok(args)
}

fn main() {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: lasercircuit-simtest [--verbose] [--json] [--scenario <file>]");
            std::process::exit(1);
        }
    };
    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Some(path) = &args.scenario {
        match run_scenario(path) {
            Ok(report) => {
                if args.json {
                    match serde_json::to_string_pretty(&report) {
                        Ok(json) => println!("{}", json),
                        Err(e) => {
                            eprintln!("Error: cannot serialize report: {}", e);
                            std::process::exit(1);
                        }
                    }
                } else {
                    print!("{}", report);
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("=== Laser Circuit Harness ===\n");

    let mut results = Vec::new();

    // 1. Spectrum table validation
    results.extend(validate_spectrum(args.verbose));

    // 2. Placement rules
    results.extend(validate_placement(args.verbose));

    // 3. Reference circuits
    results.extend(validate_reference_runs(args.verbose));

    // 4. Mirror geometry
    results.extend(validate_reflection_table(args.verbose));

    // 5. Beam collisions
    results.extend(validate_collisions(args.verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Scenario runs ───────────────────────────────────────────────────────

/// Load a scenario, build the circuit and run it.
///
/// Malformed entity and pulse lines are reported and skipped, the same way
/// an interactive prompt would ask again. A missing or malformed spectrum
/// file fails the whole scenario unless the config falls back.
fn run_scenario(path: &Path) -> Result<DeliveryReport, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let scenario: Scenario = serde_json::from_str(&text)
        .map_err(|e| format!("cannot parse {}: {}", path.display(), e))?;

    let mut circuit = match &scenario.spectrum {
        Some(file) => {
            let spectrum_path = path.parent().unwrap_or(Path::new(".")).join(file);
            let table = std::fs::read_to_string(&spectrum_path).map_err(|e| {
                format!("spectrum file {} unavailable: {}", spectrum_path.display(), e)
            })?;
            let lines: Vec<&str> = table.lines().collect();
            LaserCircuit::with_spectrum_lines(
                scenario.width,
                scenario.height,
                &lines,
                scenario.config.clone(),
            )
        }
        None => LaserCircuit::with_config(scenario.width, scenario.height, scenario.config.clone()),
    }
    .map_err(|e| e.to_string())?;
    println!("{}x{} board created.", scenario.width, scenario.height);

    let added = add_lines(&scenario.emitters, |line| {
        let emitter = parse::parse_emitter(line).map_err(|e| e.to_string())?;
        circuit.add_emitter(emitter).map_err(|e| e.to_string())
    });
    println!("{} emitter(s) added.", added);

    let added = add_lines(&scenario.receivers, |line| {
        let receiver = parse::parse_receiver(line).map_err(|e| e.to_string())?;
        circuit.add_receiver(receiver).map_err(|e| e.to_string())
    });
    println!("{} receiver(s) added.", added);

    let added = add_lines(&scenario.mirrors, |line| {
        let mirror = parse::parse_mirror(line).map_err(|e| e.to_string())?;
        circuit.add_mirror(mirror).map_err(|e| e.to_string())
    });
    println!("{} mirror(s) added.", added);

    add_lines(&scenario.pulses, |line| {
        let pulse = parse::parse_pulse_sequence(line).map_err(|e| e.to_string())?;
        circuit
            .attach_pulse_sequence(pulse.symbol, pulse.start, pulse.duration)
            .map_err(|e| e.to_string())
    });
    println!("Pulse sequence set.\n");

    Ok(circuit.run())
}

/// Apply each line, printing rejected ones. Returns how many were accepted.
fn add_lines<F>(lines: &[String], mut apply: F) -> usize
where
    F: FnMut(&str) -> Result<(), String>,
{
    let mut accepted = 0;
    for (i, line) in lines.iter().enumerate() {
        match apply(line) {
            Ok(()) => accepted += 1,
            Err(e) => println!("Error: line {} '{}': {}", i + 1, line, e),
        }
    }
    accepted
}

// ── 1. Spectrum ─────────────────────────────────────────────────────────

fn validate_spectrum(verbose: bool) -> Vec<TestResult> {
    println!("--- Color Spectrum ---");
    let mut results = Vec::new();

    let spectrum = ColorSpectrum::load(&VISIBLE_SPECTRUM);
    results.push(TestResult {
        name: "spectrum_visible_loads".into(),
        passed: spectrum.is_ok(),
        detail: match &spectrum {
            Ok(s) => format!("{} bands loaded", s.bands().len()),
            Err(e) => format!("rejected: {}", e),
        },
    });
    let Ok(spectrum) = spectrum else {
        return results;
    };

    // Every band flipped to high ≤ low must reject the table
    let mut flipped_rejected = 0;
    for (i, band) in spectrum.bands().iter().enumerate() {
        let mut lines: Vec<String> = VISIBLE_SPECTRUM.iter().map(|s| s.to_string()).collect();
        lines[i] = format!("{}: {}-{}", band.name, band.low, band.high);
        if ColorSpectrum::load(&lines).is_err() {
            flipped_rejected += 1;
        }
    }
    results.push(TestResult {
        name: "spectrum_high_not_above_low".into(),
        passed: flipped_rejected == spectrum.bands().len(),
        detail: format!("{}/{} flipped bands rejected", flipped_rejected, spectrum.bands().len()),
    });

    // Shifting a low edge by one breaks contiguity
    let mut lines: Vec<String> = VISIBLE_SPECTRUM.iter().map(|s| s.to_string()).collect();
    lines[2] = "cyan: 606-527".into();
    let shifted = ColorSpectrum::load(&lines);
    results.push(TestResult {
        name: "spectrum_contiguity".into(),
        passed: matches!(shifted, Err(SpectrumError::Discontinuity { line: 4, .. })),
        detail: format!("{:?}", shifted.err()),
    });

    // Composition is commutative over every band pair
    let colors: Vec<_> = spectrum
        .bands()
        .iter()
        .filter_map(|b| spectrum.classify(b.high, b.low).ok())
        .collect();
    let commutative = colors.iter().all(|a| {
        colors
            .iter()
            .all(|b| spectrum.compose(a, b) == spectrum.compose(b, a))
    });
    results.push(TestResult {
        name: "spectrum_compose_commutative".into(),
        passed: colors.len() == 7 && commutative,
        detail: format!("{} colors, commutative={}", colors.len(), commutative),
    });

    if verbose {
        println!("  Bands:");
        for band in spectrum.bands() {
            println!("    {:7}: {}-{}", band.name, band.high, band.low);
        }
    }

    results
}

// ── 2. Placement ────────────────────────────────────────────────────────

fn validate_placement(_verbose: bool) -> Vec<TestResult> {
    println!("--- Placement Rules ---");
    let mut results = Vec::new();

    let Ok(mut circuit) = LaserCircuit::new(4, 4) else {
        results.push(TestResult {
            name: "placement_board".into(),
            passed: false,
            detail: "4x4 board rejected".into(),
        });
        return results;
    };

    let first = circuit.add_emitter(Emitter::new('A', Position::new(1, 1), Direction::East));
    let second = circuit.add_mirror(Mirror::new(Position::new(1, 1), MirrorOrientation::Forward));
    results.push(TestResult {
        name: "placement_cell_occupied".into(),
        passed: first.is_ok() && matches!(second, Err(CircuitError::CellOccupied { .. })),
        detail: format!("second placement → {:?}", second),
    });

    let outside = circuit.add_receiver(Receiver::new('R', Position::new(4, 0)));
    results.push(TestResult {
        name: "placement_out_of_bounds".into(),
        passed: matches!(outside, Err(CircuitError::OutOfBounds { .. })),
        detail: format!("(4, 0) on 4x4 → {:?}", outside),
    });

    let duplicate = circuit.add_receiver(Receiver::new('A', Position::new(2, 2)));
    results.push(TestResult {
        name: "placement_duplicate_symbol".into(),
        passed: duplicate == Err(CircuitError::DuplicateSymbol('A')),
        detail: format!("receiver 'A' → {:?}", duplicate),
    });

    let set_once = circuit.attach_pulse_sequence('A', 0, 1);
    let set_twice = circuit.attach_pulse_sequence('A', 2, 1);
    results.push(TestResult {
        name: "placement_sequence_once".into(),
        passed: set_once.is_ok() && set_twice == Err(CircuitError::SequenceAlreadySet('A')),
        detail: format!("second sequence → {:?}", set_twice),
    });

    let unknown = circuit.attach_pulse_sequence('Z', 0, 1);
    results.push(TestResult {
        name: "placement_unknown_emitter".into(),
        passed: unknown == Err(CircuitError::UnknownEmitter('Z')),
        detail: format!("pulse for 'Z' → {:?}", unknown),
    });

    results
}

// ── 3. Reference runs ───────────────────────────────────────────────────

/// 3×3 board, E at (0,1) facing east, optional mirror and receiver.
fn reference_circuit(
    receiver: Option<Position>,
    mirror: Option<Position>,
    pulse: bool,
) -> Result<LaserCircuit, CircuitError> {
    let mut circuit = LaserCircuit::new(3, 3)?;
    circuit.add_emitter(Emitter::new('E', Position::new(0, 1), Direction::East))?;
    if let Some(pos) = receiver {
        circuit.add_receiver(Receiver::new('R', pos))?;
    }
    if let Some(pos) = mirror {
        circuit.add_mirror(Mirror::new(pos, MirrorOrientation::Forward))?;
    }
    if pulse {
        circuit.attach_pulse_sequence('E', 0, 1)?;
    }
    Ok(circuit)
}

fn first_delivery_tick(report: &DeliveryReport) -> Option<u64> {
    report.deliveries().next().map(BeamEvent::tick)
}

fn validate_reference_runs(verbose: bool) -> Vec<TestResult> {
    println!("--- Reference Circuits ---");
    let mut results = Vec::new();

    let cases: [(&str, Option<Position>, Option<Position>, bool); 4] = [
        ("run_straight", Some(Position::new(2, 1)), None, true),
        (
            "run_mirror",
            Some(Position::new(1, 2)),
            Some(Position::new(1, 1)),
            true,
        ),
        ("run_no_sequence", Some(Position::new(2, 1)), None, false),
        ("run_lost", None, None, true),
    ];

    for (name, receiver, mirror, pulse) in cases {
        let report = match reference_circuit(receiver, mirror, pulse) {
            Ok(mut circuit) => circuit.run(),
            Err(e) => {
                results.push(TestResult {
                    name: name.into(),
                    passed: false,
                    detail: format!("setup failed: {}", e),
                });
                continue;
            }
        };
        if verbose {
            println!("{}", report);
        }
        let (passed, detail) = match name {
            "run_straight" => (
                report.events.len() == 1 && first_delivery_tick(&report) == Some(2),
                format!("delivered at {:?}", first_delivery_tick(&report)),
            ),
            "run_mirror" => (
                first_delivery_tick(&report) == Some(3),
                format!("delivered at {:?} (one turning tick)", first_delivery_tick(&report)),
            ),
            "run_no_sequence" => (
                report.is_empty() && report.idle_emitters == vec!['E'],
                format!("{} events, idle {:?}", report.events.len(), report.idle_emitters),
            ),
            _ => (
                report.deliveries().count() == 0
                    && matches!(report.events.as_slice(), [BeamEvent::Lost { .. }]),
                format!("{:?}", report.events),
            ),
        };
        results.push(TestResult {
            name: name.into(),
            passed,
            detail,
        });
    }

    results
}

// ── 4. Reflection table ─────────────────────────────────────────────────

fn validate_reflection_table(_verbose: bool) -> Vec<TestResult> {
    println!("--- Mirror Geometry ---");
    let mut results = Vec::new();

    for orientation in [MirrorOrientation::Forward, MirrorOrientation::Back] {
        let involutive = Direction::ALL
            .iter()
            .all(|&d| orientation.reflect(orientation.reflect(d)) == d);
        let perpendicular = Direction::ALL.iter().all(|&d| {
            let r = orientation.reflect(d);
            r != d && r != d.opposite()
        });
        results.push(TestResult {
            name: format!("mirror_{:?}_table", orientation),
            passed: involutive && perpendicular,
            detail: format!("involutive={} perpendicular={}", involutive, perpendicular),
        });
    }

    results
}

// ── 5. Collisions ───────────────────────────────────────────────────────

fn head_on(config: CircuitConfig) -> Result<LaserCircuit, CircuitError> {
    let mut circuit = LaserCircuit::with_config(5, 3, config)?;
    circuit.add_emitter(Emitter::new('A', Position::new(0, 1), Direction::East))?;
    circuit.add_emitter(Emitter::new('B', Position::new(4, 1), Direction::West))?;
    circuit.attach_pulse_sequence('A', 0, 1)?;
    circuit.attach_pulse_sequence('B', 0, 1)?;
    Ok(circuit)
}

fn crossing_colors() -> Result<LaserCircuit, CircuitError> {
    let mut circuit = LaserCircuit::with_spectrum_lines(
        5,
        5,
        &VISIBLE_SPECTRUM,
        CircuitConfig {
            spectrum_fallback: SpectrumFallback::Abort,
            ..CircuitConfig::default()
        },
    )?;
    circuit.add_emitter(
        Emitter::new('A', Position::new(0, 2), Direction::East).with_frequency(780, 700),
    )?;
    circuit.add_emitter(
        Emitter::new('B', Position::new(2, 4), Direction::South).with_frequency(399, 385),
    )?;
    circuit.add_receiver(Receiver::new('R', Position::new(4, 2)))?;
    circuit.attach_pulse_sequence('A', 0, 1)?;
    circuit.attach_pulse_sequence('B', 0, 1)?;
    Ok(circuit)
}

fn validate_collisions(_verbose: bool) -> Vec<TestResult> {
    println!("--- Beam Collisions ---");
    let mut results = Vec::new();

    let pass = head_on(CircuitConfig::default()).map(|mut c| c.run());
    results.push(TestResult {
        name: "collision_pass_through".into(),
        passed: matches!(&pass, Ok(r) if r.events.iter().all(|e| matches!(e, BeamEvent::Absorbed { .. }))),
        detail: format!("{:?}", pass.map(|r| r.events.len())),
    });

    let annihilate = head_on(CircuitConfig {
        collision_policy: CollisionPolicy::Annihilate,
        ..CircuitConfig::default()
    })
    .map(|mut c| c.run());
    results.push(TestResult {
        name: "collision_annihilate".into(),
        passed: matches!(&annihilate, Ok(r) if r.events.len() == 2
            && r.events.iter().all(|e| matches!(e, BeamEvent::Annihilated { tick: 2, .. }))),
        detail: format!("{:?}", annihilate.map(|r| r.events.len())),
    });

    let merged = crossing_colors().map(|mut c| c.run());
    let merged_color = merged.as_ref().ok().and_then(|r| {
        r.deliveries().find_map(|e| match e {
            BeamEvent::Delivered { color, .. } => color.map(|c| c.name),
            _ => None,
        })
    });
    results.push(TestResult {
        name: "collision_frequency_merge".into(),
        passed: merged_color == Some(ColorName::Cyan),
        detail: format!("violet + red delivered as {:?}", merged_color),
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_flags_and_path() {
        let args = parse_args(argv(&["--verbose", "--json", "circuit.json"])).unwrap();
        assert!(args.verbose);
        assert!(args.json);
        assert_eq!(args.scenario, Some(PathBuf::from("circuit.json")));

        let args = parse_args(argv(&["--scenario", "a.json"])).unwrap();
        assert_eq!(args.scenario, Some(PathBuf::from("a.json")));
        assert!(!args.verbose);
    }

    #[test]
    fn test_parse_args_rejects_unknown_flag() {
        let err = parse_args(argv(&["--verbos"])).err().unwrap();
        assert!(err.contains("--verbos"));
        assert!(parse_args(argv(&["--scenario"])).is_err());
    }
}
