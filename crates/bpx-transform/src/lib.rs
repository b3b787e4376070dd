//! Transformation stage: turning raw readings into reportable
//! systolic/diastolic measurements.

pub mod pairing;

pub use pairing::{
    DIASTOLIC_RANGE, PairingOutcome, SYSTOLIC_RANGE, in_plausible_range, pair_readings,
};
