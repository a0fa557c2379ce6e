//! CSV import for precomputed adversarial distance tables.
//!
//! A distance table has one row per image and, for every norm that was
//! evaluated, three columns: the CLEVER score, the PGD attack distance, and
//! the distance found by a secondary attack. Files are written with `;` as
//! the field delimiter and `,` as the decimal separator by default.
//!
//! ## Example
//!
//! ```rust,ignore
//! use clever_eval::import::{DistanceImporter, DistanceSchema};
//! use clever_eval::Norm;
//!
//! let schema = DistanceSchema::for_norm(Norm::L2, 1024);
//! let records = DistanceImporter::new(schema).import("adversarial_distances.csv")?;
//! ```

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::norm::Norm;

/// Distances and CLEVER score for a single image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    /// 0-based data row index.
    pub image_id: usize,
    /// CLEVER robustness score.
    pub clever: f64,
    /// Distance of the adversarial example found by PGD.
    pub pgd: f64,
    /// Distance of the adversarial example found by the secondary attack.
    pub secondary: f64,
}

/// Field and decimal separators of a CSV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvFormat {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Decimal separator in numeric cells.
    pub decimal: char,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b';',
            decimal: ',',
        }
    }
}

impl CsvFormat {
    /// Comma-delimited with `.` decimals.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            delimiter: b',',
            decimal: '.',
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the decimal separator.
    #[must_use]
    pub fn with_decimal(mut self, decimal: char) -> Self {
        self.decimal = decimal;
        self
    }

    fn reader_builder(self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.delimiter(self.delimiter).trim(csv::Trim::Headers);
        builder
    }
}

/// Names of the three columns read for one norm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceSchema {
    /// Column holding the CLEVER score.
    pub clever_column: String,
    /// Column holding the PGD distance.
    pub pgd_column: String,
    /// Column holding the secondary attack distance.
    pub secondary_column: String,
}

impl DistanceSchema {
    /// Standard column names for a norm and CLEVER sample count.
    #[must_use]
    pub fn for_norm(norm: Norm, samples: u32) -> Self {
        Self {
            clever_column: norm.clever_column(samples),
            pgd_column: norm.pgd_column(),
            secondary_column: norm.secondary_column(),
        }
    }

    /// Create a schema builder starting from the L2, 1024-sample names.
    #[must_use]
    pub fn builder() -> DistanceSchemaBuilder {
        DistanceSchemaBuilder {
            schema: Self::for_norm(Norm::L2, crate::norm::DEFAULT_CLEVER_SAMPLES),
        }
    }

    /// Find the columns for `norm` in a header row, whatever the CLEVER
    /// sample count is.
    ///
    /// Returns the schema and the detected sample count, or `None` if any of
    /// the three columns is missing. When several CLEVER columns exist the
    /// first one in header order wins.
    #[must_use]
    pub fn detect(headers: &[&str], norm: Norm) -> Option<(Self, u32)> {
        let pgd = norm.pgd_column();
        let secondary = norm.secondary_column();
        find_header_index(headers, &pgd)?;
        find_header_index(headers, &secondary)?;

        let (header, samples) = headers
            .iter()
            .find_map(|h| clever_samples(h, norm).map(|n| (*h, n)))?;

        Some((
            Self {
                clever_column: header.trim().to_string(),
                pgd_column: pgd,
                secondary_column: secondary,
            },
            samples,
        ))
    }
}

/// Builder for [`DistanceSchema`].
#[derive(Debug)]
pub struct DistanceSchemaBuilder {
    schema: DistanceSchema,
}

impl DistanceSchemaBuilder {
    /// Set the CLEVER score column name.
    #[must_use]
    pub fn clever_column(mut self, name: impl Into<String>) -> Self {
        self.schema.clever_column = name.into();
        self
    }

    /// Set the PGD distance column name.
    #[must_use]
    pub fn pgd_column(mut self, name: impl Into<String>) -> Self {
        self.schema.pgd_column = name.into();
        self
    }

    /// Set the secondary attack distance column name.
    #[must_use]
    pub fn secondary_column(mut self, name: impl Into<String>) -> Self {
        self.schema.secondary_column = name.into();
        self
    }

    /// Build the schema.
    #[must_use]
    pub fn build(self) -> DistanceSchema {
        self.schema
    }
}

/// Importer for distance tables.
pub struct DistanceImporter {
    schema: DistanceSchema,
    format: CsvFormat,
}

impl DistanceImporter {
    /// Create an importer for the given schema using the default format.
    #[must_use]
    pub fn new(schema: DistanceSchema) -> Self {
        Self {
            schema,
            format: CsvFormat::default(),
        }
    }

    /// Use a different delimiter/decimal convention.
    #[must_use]
    pub fn with_format(mut self, format: CsvFormat) -> Self {
        self.format = format;
        self
    }

    /// The schema this importer reads.
    #[must_use]
    pub fn schema(&self) -> &DistanceSchema {
        &self.schema
    }

    /// Import records from a CSV file.
    pub fn import(&self, path: impl AsRef<Path>) -> Result<Vec<DistanceRecord>> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let records = self.import_reader(file)?;
        tracing::debug!(path = %path.display(), rows = records.len(), "imported distance table");
        Ok(records)
    }

    /// Import records from any reader.
    pub fn import_reader<R: Read>(&self, reader: R) -> Result<Vec<DistanceRecord>> {
        let mut reader = self.format.reader_builder().from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();

        let column = |name: &str| {
            find_header_index(&header_refs, name).ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
                available: headers.clone(),
            })
        };
        let clever_idx = column(&self.schema.clever_column)?;
        let pgd_idx = column(&self.schema.pgd_column)?;
        let secondary_idx = column(&self.schema.secondary_column)?;

        let mut results = Vec::new();

        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| Error::CsvImport {
                line: row + 2, // +2 for 1-based and header
                reason: e.to_string(),
            })?;
            let line = record
                .position()
                .map_or(row + 2, |p| p.line() as usize);

            let cell = |idx: usize, name: &str| -> Result<f64> {
                let raw = record.get(idx).unwrap_or("");
                parse_decimal(raw, self.format.decimal).ok_or_else(|| Error::ParseValue {
                    line,
                    column: name.to_string(),
                    value: raw.to_string(),
                })
            };

            results.push(DistanceRecord {
                image_id: row,
                clever: cell(clever_idx, &self.schema.clever_column)?,
                pgd: cell(pgd_idx, &self.schema.pgd_column)?,
                secondary: cell(secondary_idx, &self.schema.secondary_column)?,
            });
        }

        Ok(results)
    }
}

/// Read only the header row of a CSV file.
pub fn read_headers(path: impl AsRef<Path>, format: CsvFormat) -> Result<Vec<String>> {
    let mut reader = format.reader_builder().from_path(path.as_ref())?;
    Ok(reader.headers()?.iter().map(String::from).collect())
}

/// Norms for which all three distance columns are present.
#[must_use]
pub fn detect_norms(headers: &[&str]) -> Vec<Norm> {
    Norm::all()
        .into_iter()
        .filter(|&norm| DistanceSchema::detect(headers, norm).is_some())
        .collect()
}

/// Extract the sample count from a CLEVER column header for `norm`.
///
/// # Example
///
/// ```
/// use clever_eval::import::clever_samples;
/// use clever_eval::Norm;
///
/// assert_eq!(clever_samples("2-norm-Clever-1024-samples", Norm::L2), Some(1024));
/// assert_eq!(clever_samples("2-norm-PGD-dist", Norm::L2), None);
/// assert_eq!(clever_samples("1-norm-Clever-500-samples", Norm::L2), None);
/// ```
#[must_use]
pub fn clever_samples(header: &str, norm: Norm) -> Option<u32> {
    let lower = header.trim().to_lowercase();
    let prefix = format!("{}-norm-clever-", norm.column_prefix());
    lower
        .strip_prefix(&prefix)?
        .strip_suffix("-samples")?
        .parse()
        .ok()
}

/// Parse a numeric cell written with the given decimal separator.
///
/// Empty cells become `NaN`. Returns `None` for text that is not a number.
///
/// # Example
///
/// ```
/// use clever_eval::import::parse_decimal;
///
/// assert_eq!(parse_decimal("0,125", ','), Some(0.125));
/// assert_eq!(parse_decimal(" 3.5 ", '.'), Some(3.5));
/// assert!(parse_decimal("", ',').unwrap().is_nan());
/// assert_eq!(parse_decimal("abc", ','), None);
/// ```
#[must_use]
pub fn parse_decimal(raw: &str, decimal: char) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(f64::NAN);
    }
    if decimal == '.' {
        return trimmed.parse().ok();
    }
    trimmed.replace(decimal, ".").parse().ok()
}

/// Find a header index by name (case-insensitive, surrounding whitespace ignored).
fn find_header_index(headers: &[&str], name: &str) -> Option<usize> {
    let name_lower = name.trim().to_lowercase();
    headers
        .iter()
        .position(|h| h.trim().to_lowercase() == name_lower)
}
