//! Error types for double-difference pairing.

use thiserror::Error;

/// Errors raised by reshaping, pairing and adjoint hand-off.
///
/// Precondition and lookup failures are caller bugs and are never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PairingError {
    #[error("invalid channel id: {0:?}")]
    InvalidChannel(String),

    #[error("invalid window name: {0:?}")]
    InvalidWindowName(String),

    #[error("empty window set: {0}")]
    EmptyWindowSet(String),

    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("window {0} not found")]
    MissingWindow(String),

    #[error("no location for channel {0}")]
    MissingLocation(String),

    #[error("no trace for channel {0}")]
    MissingTrace(String),

    #[error("no waveform for station {0}")]
    MissingWaveform(String),

    #[error("window [{start}, {end}] outside of trace [{trace_start}, {trace_end}]")]
    SliceOutOfRange {
        start: String,
        end: String,
        trace_start: String,
        trace_end: String,
    },

    #[error("adjoint engine failure: {0}")]
    Engine(String),
}

pub type Result<T> = std::result::Result<T, PairingError>;
