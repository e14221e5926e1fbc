use serde::{Deserialize, Serialize};

/// Feature type tag
///
/// Exactly five feature types are recognized. Any iteration over feature
/// types must visit them in the order of [`FType::ALL`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FType {
    /// Dirichlet-Discrete with at most 16 values
    Dd16,
    /// Dirichlet-Discrete with at most 256 values
    Dd256,
    /// Dirichlet-Process-Discrete
    Dpd,
    /// Gamma-Poisson
    Gp,
    /// Normal-Inverse-Chi-Squared
    Nich,
}

impl FType {
    /// Every feature type, in the canonical visit order.
    pub const ALL: [FType; 5] =
        [FType::Dd16, FType::Dd256, FType::Dpd, FType::Gp, FType::Nich];
}

impl std::fmt::Display for FType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dd16 => write!(f, "DD16"),
            Self::Dd256 => write!(f, "DD256"),
            Self::Dpd => write!(f, "DPD"),
            Self::Gp => write!(f, "GP"),
            Self::Nich => write!(f, "NICH"),
        }
    }
}
