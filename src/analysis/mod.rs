//! Per-image comparison of CLEVER scores against empirical attack distances.
//!
//! For every image the smaller of the two attack distances is the
//! *minimum adversarial distance*: an upper bound on the true minimal
//! perturbation. CLEVER estimates a lower bound on the same quantity, so a
//! CLEVER score above the minimum distance means the estimate was too
//! optimistic for that image.

use serde::{Deserialize, Serialize};

use crate::import::DistanceRecord;
use crate::norm::Norm;
use crate::stats::Summary;

/// Attack that produced the minimum adversarial distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attack {
    /// Projected Gradient Descent.
    Pgd,
    /// The secondary attack.
    Secondary,
}

impl Attack {
    /// Legend label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Attack::Pgd => "Adversarial Distance (PGD)",
            Attack::Secondary => "Adversarial Distance (Second attack)",
        }
    }

    /// Short identifier used in exported tables.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Attack::Pgd => "pgd",
            Attack::Secondary => "secondary",
        }
    }
}

/// Whether the CLEVER score exceeds the minimum adversarial distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleverComparison {
    /// `min_distance < clever`: an adversarial example exists closer than
    /// the CLEVER score claims is possible.
    Exceeds,
    /// `min_distance >= clever`, or the comparison is undefined (NaN).
    Bounded,
}

impl CleverComparison {
    /// Compare a minimum adversarial distance against a CLEVER score.
    ///
    /// # Example
    ///
    /// ```
    /// use clever_eval::analysis::CleverComparison;
    ///
    /// assert_eq!(CleverComparison::compare(0.2, 0.5), CleverComparison::Exceeds);
    /// assert_eq!(CleverComparison::compare(0.5, 0.5), CleverComparison::Bounded);
    /// ```
    #[must_use]
    pub fn compare(min_distance: f64, clever: f64) -> Self {
        if min_distance < clever {
            CleverComparison::Exceeds
        } else {
            CleverComparison::Bounded
        }
    }

    /// Legend label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CleverComparison::Exceeds => "Clever Score > Adversarial Distance",
            CleverComparison::Bounded => "Clever Score <= Adversarial Distance",
        }
    }

    /// True for [`CleverComparison::Exceeds`].
    #[must_use]
    pub fn exceeds(self) -> bool {
        self == CleverComparison::Exceeds
    }
}

/// Smaller of the two attack distances and the attack that found it.
///
/// PGD wins only when strictly smaller; ties and NaN go to the secondary
/// attack.
///
/// # Example
///
/// ```
/// use clever_eval::analysis::{min_adversarial_distance, Attack};
///
/// assert_eq!(min_adversarial_distance(0.1, 0.3), (0.1, Attack::Pgd));
/// assert_eq!(min_adversarial_distance(0.3, 0.3), (0.3, Attack::Secondary));
/// ```
#[must_use]
pub fn min_adversarial_distance(pgd: f64, secondary: f64) -> (f64, Attack) {
    if pgd < secondary {
        (pgd, Attack::Pgd)
    } else {
        (secondary, Attack::Secondary)
    }
}

/// A record with its derived values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPoint {
    /// 0-based image index.
    pub image_id: usize,
    /// CLEVER score.
    pub clever: f64,
    /// PGD distance.
    pub pgd: f64,
    /// Secondary attack distance.
    pub secondary: f64,
    /// Minimum of the two attack distances.
    pub min_distance: f64,
    /// Attack that produced `min_distance`.
    pub source: Attack,
    /// CLEVER score against `min_distance`.
    pub comparison: CleverComparison,
}

impl From<&DistanceRecord> for AnalyzedPoint {
    fn from(record: &DistanceRecord) -> Self {
        let (min_distance, source) = min_adversarial_distance(record.pgd, record.secondary);
        Self {
            image_id: record.image_id,
            clever: record.clever,
            pgd: record.pgd,
            secondary: record.secondary,
            min_distance,
            source,
            comparison: CleverComparison::compare(min_distance, record.clever),
        }
    }
}

/// Analyzed points for one norm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Norm the distances were measured in.
    pub norm: Norm,
    /// One entry per image, in file order.
    pub points: Vec<AnalyzedPoint>,
}

impl Analysis {
    /// Analyze imported records.
    #[must_use]
    pub fn from_records(norm: Norm, records: &[DistanceRecord]) -> Self {
        Self {
            norm,
            points: records.iter().map(AnalyzedPoint::from).collect(),
        }
    }

    /// Number of images whose minimum came from `attack`.
    #[must_use]
    pub fn count_by_attack(&self, attack: Attack) -> usize {
        self.points.iter().filter(|p| p.source == attack).count()
    }

    /// Number of images where the CLEVER score exceeds the minimum distance.
    #[must_use]
    pub fn exceeding_count(&self) -> usize {
        self.points.iter().filter(|p| p.comparison.exceeds()).count()
    }

    /// Aggregate counts and distributions.
    #[must_use]
    pub fn summary(&self) -> AnalysisSummary {
        let total = self.points.len();
        let exceeds = self.exceeding_count();

        let min_distances: Vec<f64> = self.points.iter().map(|p| p.min_distance).collect();
        let clever: Vec<f64> = self.points.iter().map(|p| p.clever).collect();
        let gaps: Vec<f64> = self
            .points
            .iter()
            .map(|p| p.min_distance - p.clever)
            .collect();

        AnalysisSummary {
            norm: self.norm,
            total,
            pgd_minimum: self.count_by_attack(Attack::Pgd),
            secondary_minimum: self.count_by_attack(Attack::Secondary),
            clever_exceeds: exceeds,
            clever_bounded: total - exceeds,
            exceeds_fraction: if total == 0 {
                0.0
            } else {
                exceeds as f64 / total as f64
            },
            min_distance: Summary::compute(&min_distances),
            clever: Summary::compute(&clever),
            gap: Summary::compute(&gaps),
        }
    }
}

/// Counts and distributions over an [`Analysis`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Norm of the analysis.
    pub norm: Norm,
    /// Number of images.
    pub total: usize,
    /// Images whose minimum came from PGD.
    pub pgd_minimum: usize,
    /// Images whose minimum came from the secondary attack.
    pub secondary_minimum: usize,
    /// Images where CLEVER exceeds the minimum distance.
    pub clever_exceeds: usize,
    /// Images where CLEVER does not exceed the minimum distance.
    pub clever_bounded: usize,
    /// `clever_exceeds / total`.
    pub exceeds_fraction: f64,
    /// Distribution of finite minimum distances.
    pub min_distance: Option<Summary>,
    /// Distribution of finite CLEVER scores.
    pub clever: Option<Summary>,
    /// Distribution of `min_distance - clever`.
    pub gap: Option<Summary>,
}
