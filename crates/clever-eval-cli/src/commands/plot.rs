//! Plot command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clever_eval::plot::save_plot;
use clever_eval::viewer::open_in_viewer;
use clever_eval::{AnalysisReport, Attack, Norm, PlotConfig};

use super::InputArgs;

/// Options for the plot command.
pub struct PlotArgs {
    pub output: Option<PathBuf>,
    pub norm: Norm,
    pub width: f64,
    pub height: f64,
    pub title: Option<String>,
    pub legend: bool,
    pub show: bool,
    pub report: Option<PathBuf>,
}

pub fn run(input: &InputArgs, args: PlotArgs) -> Result<()> {
    tracing::info!(input = %input.input.display(), norm = %args.norm, "plotting");
    let loaded = super::load(input, args.norm)?;
    let analysis = &loaded.analysis;

    let output = args
        .output
        .unwrap_or_else(|| default_output(args.norm, loaded.samples));

    let mut config = PlotConfig::for_norm(args.norm)
        .with_dimensions(args.width, args.height)
        .with_legend(args.legend);
    if let Some(title) = args.title {
        config = config.with_title(title);
    }

    save_plot(&output, analysis, &config)
        .with_context(|| format!("Failed to write plot to {}", output.display()))?;

    println!(
        "{} images: minimum from PGD {}, from second attack {}; CLEVER > distance for {}",
        analysis.points.len(),
        analysis.count_by_attack(Attack::Pgd),
        analysis.count_by_attack(Attack::Secondary),
        analysis.exceeding_count()
    );
    println!("Saved plot to: {}", output.display());

    if let Some(report_path) = args.report {
        AnalysisReport::new(&input.input, loaded.samples, analysis)
            .write_json(&report_path)
            .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
        println!("Saved report to: {}", report_path.display());
    }

    if args.show {
        open_in_viewer(&output)
            .with_context(|| format!("Failed to open {}", output.display()))?;
    }

    Ok(())
}

fn default_output(norm: Norm, samples: u32) -> PathBuf {
    PathBuf::from(format!("adv_vs_cl_l{}_{}.pdf", norm.column_prefix(), samples))
}
