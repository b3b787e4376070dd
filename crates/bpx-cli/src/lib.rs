//! Library components of the blood-pressure export CLI.

pub mod logging;
pub mod pipeline;
