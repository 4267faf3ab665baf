//! Transfer function analysis, difference-equation filtering and FIR design

pub mod analysis;
pub mod design;
pub mod lfilter;
pub mod roots;

pub use analysis::{
    freqz, frequency_response, poles_zeros_gain, FrequencyBounds, FrequencyResponse, Spacing,
    TransferFunction, ZeroPoleGain,
};
pub use design::{design_fir, Band, FirSpec};
pub use lfilter::{impulse_response, lfilter, LinearFilter};
