use thiserror::Error;

/// Degenerate geometry input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("arithmetic error: direction of a zero-length vector is undefined")]
    ZeroLength,
    #[error("arithmetic error: non-finite component in {0:?}")]
    NonFinite([f64; 3]),
    #[error("arithmetic error: non-finite state angles theta={theta}, phi={phi}")]
    NonFiniteAngles { theta: f64, phi: f64 },
    #[error("arithmetic error: both amplitudes vanish")]
    ZeroAmplitudes,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RotationError {
    #[error("invalid matrix: entry ({row}, {col}) is not finite")]
    NonFiniteEntry { row: usize, col: usize },
    #[error("invalid matrix: scalar factor {0} is not finite")]
    NonFiniteScalar(f64),
}

/// Error raised while evaluating a textual matrix entry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("malformed number '{0}'")]
    MalformedNumber(String),
    #[error("scalar factor must be real, got {re}{im:+}i")]
    NonRealScalar { re: f64, im: f64 },
    #[error("matrix row must have two entries separated by whitespace, got '{0}'")]
    MalformedRow(String),
    #[error("matrix must have two rows separated by '\\', got {0}")]
    MalformedMatrix(usize),
}

#[derive(Debug, Error)]
pub enum BlochError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Rotation(#[from] RotationError),
    #[error(transparent)]
    Expr(#[from] ExprError),
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
}
