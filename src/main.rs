use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use num_complex::Complex64;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bloch::config::Settings;
use bloch::geometry::QuantumState;
use bloch::presets::{GatePreset, StatePreset};
use bloch::rotation::{extract_rotation, GateMatrix, RotationDescriptor};

mod terminal;

/// Bloch sphere state explorer
#[derive(Parser, Debug)]
#[command(name = "bloch", version, about)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drag the state vector around in the terminal (default)
    Interactive(Settings),
    /// Print the rotation a gate induces on the sphere
    Rotation(GateArgs),
    /// Print a state as angles, point and amplitudes
    State(StateArgs),
    /// Apply a gate to a state
    Apply {
        #[command(flatten)]
        gate: GateArgs,
        #[command(flatten)]
        state: StateArgs,
    },
    /// List the state and gate presets
    Presets,
}

#[derive(Args, Debug)]
struct GateArgs {
    /// Named gate (X, Y, Z, H, RX, RY, SX, S)
    #[arg(long, conflicts_with = "matrix")]
    gate: Option<GatePreset>,

    /// Matrix literal with rows separated by a backslash, e.g. "0 -i \ i 0"
    #[arg(long, allow_hyphen_values = true)]
    matrix: Option<String>,

    /// Real scalar factor for --matrix, e.g. "sqrt(1/2)"
    #[arg(long, default_value = "")]
    scalar: String,
}

impl GateArgs {
    fn matrix(&self) -> Result<GateMatrix> {
        match (self.gate, &self.matrix) {
            (Some(gate), _) => Ok(gate.matrix()?),
            (None, Some(literal)) => Ok(GateMatrix::parse_literal(&self.scalar, literal)?),
            (None, None) => bail!("either --gate or --matrix is required"),
        }
    }
}

#[derive(Args, Debug)]
struct StateArgs {
    /// Named state (0, 1, +, -, i, -i)
    #[arg(long, allow_hyphen_values = true, conflicts_with_all = ["theta", "phi", "point"])]
    preset: Option<StatePreset>,

    /// Polar angle, in multiples of pi unless --radians
    #[arg(long, allow_negative_numbers = true, conflicts_with = "point")]
    theta: Option<f64>,

    /// Azimuth, in multiples of pi unless --radians
    #[arg(long, allow_negative_numbers = true, conflicts_with = "point")]
    phi: Option<f64>,

    /// Cartesian direction "x,y,z"; need not be normalized
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    point: Option<Vec<f64>>,

    /// Read --theta and --phi as radians
    #[arg(long)]
    radians: bool,
}

impl StateArgs {
    fn state(&self) -> Result<QuantumState> {
        if let Some(preset) = self.preset {
            return Ok(preset.state());
        }
        if let Some(point) = &self.point {
            let [x, y, z] = point.as_slice() else {
                bail!("--point takes exactly three components");
            };
            return Ok(QuantumState::from_point(&[*x, *y, *z])?);
        }
        let unit = if self.radians { 1.0 } else { std::f64::consts::PI };
        let theta = self.theta.unwrap_or(0.0) * unit;
        let phi = self.phi.unwrap_or(0.0) * unit;
        Ok(QuantumState::new(theta, phi)?)
    }
}

pub(crate) fn format_complex(value: Complex64) -> String {
    format!("{:.4}{:+.4}i", value.re, value.im)
}

pub(crate) fn describe_rotation(rotation: Option<&RotationDescriptor>) -> String {
    match rotation {
        Some(d) => format!(
            "{:.4}pi about ({:.4}, {:.4}, {:.4})",
            d.angle / std::f64::consts::PI,
            d.axis[0],
            d.axis[1],
            d.axis[2]
        ),
        None => "no rotation (global phase only)".to_string(),
    }
}

fn describe_state(state: &QuantumState) -> String {
    let [x, y, z] = state.to_point();
    let [alpha, beta] = state.amplitudes();
    format!(
        "theta = {:.4}pi  phi = {:.4}pi\npoint = ({x:.4}, {y:.4}, {z:.4})\n|psi> = ({})|0> + ({})|1>",
        state.theta() / std::f64::consts::PI,
        state.phi() / std::f64::consts::PI,
        format_complex(alpha),
        format_complex(beta)
    )
}

fn init_tracing(level: &str, log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        // stderr would scribble over the alternate screen
        None if interactive => {}
        None => registry.with(fmt::layer().with_writer(io::stderr)).init(),
    }
    Ok(())
}

/// Main function
fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Interactive(Settings::default()));
    init_tracing(
        &cli.log_level,
        cli.log_file.as_deref(),
        matches!(command, Command::Interactive(_)),
    )?;

    match command {
        Command::Interactive(settings) => terminal::run(&settings)?,
        Command::Rotation(gate) => {
            let matrix = gate.matrix()?;
            let rotation = extract_rotation(&matrix)?;
            println!("{}", describe_rotation(rotation.descriptor()));
        }
        Command::State(state) => println!("{}", describe_state(&state.state()?)),
        Command::Apply { gate, state } => {
            let matrix = gate.matrix()?;
            let before = state.state()?;
            let after = matrix.apply(&before)?;
            tracing::debug!("[apply] {before:?} -> {after:?}");
            println!("{}", describe_state(&after));
        }
        Command::Presets => {
            println!("states:");
            for preset in StatePreset::ALL {
                let (theta, phi) = preset.angles();
                println!(
                    "  {preset:<5} theta = {:.2}pi  phi = {:.2}pi",
                    theta / std::f64::consts::PI,
                    phi / std::f64::consts::PI
                );
            }
            println!("gates:");
            for preset in GatePreset::ALL {
                let (scalar, literal) = preset.literal();
                let scalar = if scalar.is_empty() { "1" } else { scalar };
                println!("  {preset:<3} {scalar} * [{literal}]");
            }
        }
    }

    Ok(())
}
