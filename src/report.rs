//! Report types for analysis results.
//!
//! An [`AnalysisReport`] bundles the per-image points with their summary and
//! is written as JSON. [`write_points_csv`] exports the derived columns in
//! the same CSV conventions as the input.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::{Analysis, AnalysisSummary, AnalyzedPoint};
use crate::error::Result;
use crate::import::CsvFormat;
use crate::norm::Norm;

/// Analysis of one distance file for one norm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Distance file the report was computed from.
    pub source: PathBuf,
    /// Norm of the analyzed columns.
    pub norm: Norm,
    /// Sample count of the CLEVER column.
    pub clever_samples: u32,
    /// When this report was generated.
    #[serde(with = "chrono_serde")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
    /// Aggregate counts and distributions.
    pub summary: AnalysisSummary,
    /// Per-image values.
    pub points: Vec<AnalyzedPoint>,
}

impl AnalysisReport {
    /// Create a report for an analysis.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, clever_samples: u32, analysis: &Analysis) -> Self {
        Self {
            source: source.into(),
            norm: analysis.norm,
            clever_samples,
            generated_at: chrono::Utc::now(),
            summary: analysis.summary(),
            points: analysis.points.clone(),
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        tracing::debug!(path = %path.as_ref().display(), "wrote analysis report");
        Ok(())
    }
}

#[derive(Serialize)]
struct PointRow<'a> {
    image_id: usize,
    clever: String,
    pgd: String,
    secondary: String,
    min_distance: String,
    source: &'a str,
    clever_exceeds: bool,
}

/// Write one row per image with the derived columns.
pub fn write_points_csv(
    path: impl AsRef<Path>,
    analysis: &Analysis,
    format: CsvFormat,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter)
        .from_path(path)?;

    let number = |v: f64| format_decimal(v, format.decimal);
    for p in &analysis.points {
        writer.serialize(PointRow {
            image_id: p.image_id,
            clever: number(p.clever),
            pgd: number(p.pgd),
            secondary: number(p.secondary),
            min_distance: number(p.min_distance),
            source: p.source.as_str(),
            clever_exceeds: p.comparison.exceeds(),
        })?;
    }
    writer.flush()?;
    tracing::debug!(path = %path.display(), rows = analysis.points.len(), "wrote point table");
    Ok(())
}

/// Format a number with the given decimal separator. NaN is written as an
/// empty cell so it reads back as NaN.
fn format_decimal(value: f64, decimal: char) -> String {
    if value.is_nan() {
        return String::new();
    }
    let text = value.to_string();
    if decimal == '.' {
        text
    } else {
        text.replace('.', &decimal.to_string())
    }
}

mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
