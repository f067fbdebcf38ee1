//! Named basis states and gates offered as one-click inputs.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::BlochError;
use crate::geometry::QuantumState;
use crate::rotation::GateMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatePreset {
    Zero,
    One,
    Plus,
    Minus,
    PlusI,
    MinusI,
}

impl StatePreset {
    pub const ALL: [StatePreset; 6] = [
        StatePreset::Zero,
        StatePreset::One,
        StatePreset::Plus,
        StatePreset::Minus,
        StatePreset::PlusI,
        StatePreset::MinusI,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatePreset::Zero => "0",
            StatePreset::One => "1",
            StatePreset::Plus => "+",
            StatePreset::Minus => "-",
            StatePreset::PlusI => "i",
            StatePreset::MinusI => "-i",
        }
    }

    /// `(theta, phi)` of the preset.
    pub fn angles(self) -> (f64, f64) {
        match self {
            StatePreset::Zero => (0.0, 0.0),
            StatePreset::One => (PI, 0.0),
            StatePreset::Plus => (FRAC_PI_2, 0.0),
            StatePreset::Minus => (FRAC_PI_2, PI),
            StatePreset::PlusI => (FRAC_PI_2, FRAC_PI_2),
            StatePreset::MinusI => (FRAC_PI_2, 3.0 * FRAC_PI_2),
        }
    }

    pub fn state(self) -> QuantumState {
        let (theta, phi) = self.angles();
        QuantumState::new(theta, phi).unwrap_or_default()
    }
}

impl std::fmt::Display for StatePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "|{}>", self.label())
    }
}

impl std::str::FromStr for StatePreset {
    type Err = BlochError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('|').trim_end_matches(['>', '⟩']);
        StatePreset::ALL
            .into_iter()
            .find(|preset| preset.label() == trimmed)
            .ok_or_else(|| BlochError::UnknownPreset(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePreset {
    X,
    Y,
    Z,
    H,
    /// θ=π/2 rotation about X
    Rx,
    /// θ=π/2 rotation about Y
    Ry,
    /// square root of X
    Sx,
    S,
}

impl GatePreset {
    pub const ALL: [GatePreset; 8] = [
        GatePreset::X,
        GatePreset::Y,
        GatePreset::Z,
        GatePreset::H,
        GatePreset::Rx,
        GatePreset::Ry,
        GatePreset::Sx,
        GatePreset::S,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GatePreset::X => "X",
            GatePreset::Y => "Y",
            GatePreset::Z => "Z",
            GatePreset::H => "H",
            GatePreset::Rx => "RX",
            GatePreset::Ry => "RY",
            GatePreset::Sx => "SX",
            GatePreset::S => "S",
        }
    }

    /// Scalar and matrix literal as a matrix editor would show them.
    pub fn literal(self) -> (&'static str, &'static str) {
        match self {
            GatePreset::X => ("", "0 1 \\ 1 0"),
            GatePreset::Y => ("", "0 -i \\ i 0"),
            GatePreset::Z => ("", "1 0 \\ 0 -1"),
            GatePreset::H => ("sqrt(1/2)", "1 1 \\ 1 -1"),
            GatePreset::Rx => ("sqrt(1/2)", "1 -i \\ -i 1"),
            GatePreset::Ry => ("sqrt(1/2)", "1 -1 \\ 1 1"),
            GatePreset::Sx => ("sqrt(1/2)", "1+i 1-i \\ 1-i 1+i"),
            GatePreset::S => ("", "1 0 \\ 0 i"),
        }
    }

    pub fn matrix(self) -> Result<GateMatrix, BlochError> {
        let (scalar, literal) = self.literal();
        GateMatrix::parse_literal(scalar, literal)
    }
}

impl std::fmt::Display for GatePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for GatePreset {
    type Err = BlochError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GatePreset::ALL
            .into_iter()
            .find(|preset| preset.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BlochError::UnknownPreset(s.to_string()))
    }
}
