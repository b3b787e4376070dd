//! Pairing policy configuration.

/// What to do with a reading that has no partner at the same instant.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub enum UnmatchedPolicy {
    /// Drop the singleton and report it.
    #[default]
    Drop,
    /// Emit a one-sided measurement.
    KeepPartial,
}

/// Options controlling how readings are paired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairingPolicy {
    pub unmatched: UnmatchedPolicy,
    /// Keep only the chronologically newest measurement per patient.
    pub latest_only: bool,
}

impl PairingPolicy {
    #[must_use]
    pub fn with_unmatched(mut self, unmatched: UnmatchedPolicy) -> Self {
        self.unmatched = unmatched;
        self
    }

    #[must_use]
    pub fn with_latest_only(mut self, latest_only: bool) -> Self {
        self.latest_only = latest_only;
        self
    }
}
