// error types
pub mod error;

// data module
pub mod data {
    pub mod channel;
    pub mod window;
    pub mod pair;
    pub mod trace;
    pub mod location;
    pub mod views;
}

// algorithm module
pub mod algorithm {
    pub mod geodesy;
    pub mod correlation;
    pub mod taper;
}

// pairing module
pub mod pairing {
    pub mod reshape;
    pub mod enumerate;
    pub mod filter;
    pub mod slicer;
    pub mod weights;
    pub mod partition;
    pub mod pipeline;
}

// adjoint module
pub mod adjoint {
    pub mod source;
    pub mod engine;
}

pub use error::{PairingError, Result};
