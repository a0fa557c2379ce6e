//! Distance norms and the column naming convention tied to them.
//!
//! Every metric column in a distance file is prefixed with the norm it was
//! measured in, e.g. `2-norm-PGD-dist` or `inf-norm-Clever-1024-samples`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Number of samples used for the CLEVER estimate when none is given.
pub const DEFAULT_CLEVER_SAMPLES: u32 = 1024;

/// An Lp norm used to measure perturbation size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    /// L1 (Manhattan) norm.
    L1,
    /// L2 (Euclidean) norm.
    L2,
    /// L-infinity (max) norm.
    LInf,
}

impl Norm {
    /// All supported norms, in column order.
    #[must_use]
    pub fn all() -> [Norm; 3] {
        [Norm::L1, Norm::L2, Norm::LInf]
    }

    /// Prefix used in column names (`1`, `2` or `inf`).
    #[must_use]
    pub fn column_prefix(self) -> &'static str {
        match self {
            Norm::L1 => "1",
            Norm::L2 => "2",
            Norm::LInf => "inf",
        }
    }

    /// Y-axis label for plots measured in this norm.
    #[must_use]
    pub fn axis_label(self) -> String {
        format!("{self} Distance")
    }

    /// Name of the CLEVER score column for the given sample count.
    #[must_use]
    pub fn clever_column(self, samples: u32) -> String {
        format!("{}-norm-Clever-{}-samples", self.column_prefix(), samples)
    }

    /// Name of the PGD distance column.
    #[must_use]
    pub fn pgd_column(self) -> String {
        format!("{}-norm-PGD-dist", self.column_prefix())
    }

    /// Name of the secondary attack distance column.
    #[must_use]
    pub fn secondary_column(self) -> String {
        format!("{}-norm-sec-att-dist", self.column_prefix())
    }
}

impl fmt::Display for Norm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Norm::L1 => f.write_str("L1"),
            Norm::L2 => f.write_str("L2"),
            Norm::LInf => f.write_str("Linf"),
        }
    }
}

impl FromStr for Norm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "l1" => Ok(Norm::L1),
            "2" | "l2" => Ok(Norm::L2),
            "inf" | "linf" | "infinity" | "np.inf" => Ok(Norm::LInf),
            _ => Err(Error::UnknownNorm(s.to_string())),
        }
    }
}
