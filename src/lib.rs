//! # clever-eval
//!
//! Compare CLEVER robustness scores against empirical adversarial distances.
//!
//! A distance file lists, per image, the CLEVER score and the perturbation
//! sizes found by PGD and by a secondary attack. The smaller attack distance
//! is the minimum adversarial distance; wherever it falls below the CLEVER
//! score, the score overestimated the robustness of that image.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use clever_eval::{Analysis, DistanceImporter, DistanceSchema, Norm, PlotConfig};
//!
//! let schema = DistanceSchema::for_norm(Norm::L2, 1024);
//! let records = DistanceImporter::new(schema).import("adversarial_distances.csv")?;
//!
//! let analysis = Analysis::from_records(Norm::L2, &records);
//! println!("{} of {} CLEVER scores exceed the attack distance",
//!     analysis.exceeding_count(), analysis.points.len());
//!
//! let config = PlotConfig::for_norm(Norm::L2);
//! clever_eval::plot::save_plot("adv_vs_cl_l2_1024.pdf", &analysis, &config)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`norm`]: Norms and column naming
//! - [`import`]: CSV import of distance tables
//! - [`analysis`]: Minimum distance and CLEVER comparison
//! - [`stats`]: Descriptive statistics
//! - [`plot`]: Scatter plots to PDF or SVG
//! - [`report`]: JSON reports and CSV export
//! - [`viewer`]: Opening plots in the desktop viewer

pub mod analysis;
pub mod error;
pub mod import;
pub mod norm;
pub mod plot;
pub mod report;
pub mod stats;
pub mod viewer;

// Re-export commonly used types
pub use analysis::{Analysis, AnalysisSummary, AnalyzedPoint, Attack, CleverComparison};
pub use error::{Error, Result};
pub use import::{CsvFormat, DistanceImporter, DistanceRecord, DistanceSchema};
pub use norm::{DEFAULT_CLEVER_SAMPLES, Norm};
pub use plot::{OutputFormat, PlotConfig};
pub use report::AnalysisReport;
pub use stats::Summary;
