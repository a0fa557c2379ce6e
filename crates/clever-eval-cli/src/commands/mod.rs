//! Subcommands and the input handling they share.

pub mod export;
pub mod plot;
pub mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use clever_eval::import::{CsvFormat, DistanceImporter, DistanceSchema, read_headers};
use clever_eval::{Analysis, DEFAULT_CLEVER_SAMPLES, Norm};

/// Input file and how to read it.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Input CSV file with CLEVER scores and attack distances
    #[arg(short, long)]
    pub input: PathBuf,

    /// CLEVER sample count in the column name [default: detected from the header]
    #[arg(long)]
    pub samples: Option<u32>,

    /// Field delimiter
    #[arg(long, default_value_t = ';')]
    pub delimiter: char,

    /// Decimal separator
    #[arg(long, default_value_t = ',')]
    pub decimal: char,
}

impl InputArgs {
    pub fn format(&self) -> Result<CsvFormat> {
        if !self.delimiter.is_ascii() {
            bail!("Delimiter must be a single ASCII character, got '{}'", self.delimiter);
        }
        Ok(CsvFormat::default()
            .with_delimiter(self.delimiter as u8)
            .with_decimal(self.decimal))
    }

    pub fn headers(&self) -> Result<Vec<String>> {
        read_headers(&self.input, self.format()?)
            .with_context(|| format!("Failed to read header of {}", self.input.display()))
    }
}

/// An analysis together with the CLEVER sample count it was read with.
pub struct Loaded {
    pub analysis: Analysis,
    pub samples: u32,
}

/// Read the distance columns for `norm` and analyze them.
pub fn load(input: &InputArgs, norm: Norm) -> Result<Loaded> {
    let format = input.format()?;

    let (schema, samples) = match input.samples {
        Some(samples) => (DistanceSchema::for_norm(norm, samples), samples),
        None => {
            let headers = input.headers()?;
            let refs: Vec<&str> = headers.iter().map(String::as_str).collect();
            DistanceSchema::detect(&refs, norm).unwrap_or_else(|| {
                (
                    DistanceSchema::for_norm(norm, DEFAULT_CLEVER_SAMPLES),
                    DEFAULT_CLEVER_SAMPLES,
                )
            })
        }
    };
    tracing::debug!(%norm, samples, clever = %schema.clever_column, "using columns");

    let records = DistanceImporter::new(schema)
        .with_format(format)
        .import(&input.input)
        .with_context(|| format!("Failed to import distances from {}", input.input.display()))?;

    Ok(Loaded {
        analysis: Analysis::from_records(norm, &records),
        samples,
    })
}
