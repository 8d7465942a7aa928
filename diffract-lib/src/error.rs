use thiserror::Error;

use crate::propagation::PropagationMode;

#[derive(Debug, Error)]
pub enum DiffractError {
    #[error("unknown material type: {0}")]
    UnknownMaterial(String),

    #[error("unknown element: {0}")]
    UnknownElement(String),

    #[error("invalid composition: {0}")]
    InvalidComposition(String),

    #[error("invalid chemical formula: {0}")]
    InvalidFormula(String),

    #[error("photon energy {energy} eV outside tabulated range [{min}, {max}] eV for {element}")]
    OutOfTableRange {
        element: String,
        energy: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid rotation: {0}")]
    InvalidRotation(String),

    #[error("{model} does not support {mode:?} propagation")]
    UnsupportedMode {
        model: &'static str,
        mode: PropagationMode,
    },

    #[error("geometry mismatch: {0}")]
    GeometryMismatch(String),

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("data error: {0}")]
    Data(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DiffractError>;

/// Rejects non-finite or non-positive values for a named parameter.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DiffractError::InvalidParameter {
            name,
            reason: format!("must be finite and positive, got {value}"),
        })
    }
}
