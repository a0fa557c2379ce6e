//! Summary command.

use anyhow::{Result, bail};
use clever_eval::import::detect_norms;
use clever_eval::{AnalysisSummary, Norm, Summary};
use serde::Serialize;

use super::InputArgs;

/// One norm's summary together with the CLEVER sample count it was read with.
#[derive(Debug, Serialize)]
struct NormSummary<'a> {
    clever_samples: u32,
    #[serde(flatten)]
    summary: &'a AnalysisSummary,
}

pub fn run(input: &InputArgs, norm: Option<Norm>, json: bool) -> Result<()> {
    let norms = match norm {
        Some(norm) => vec![norm],
        None => {
            let headers = input.headers()?;
            let refs: Vec<&str> = headers.iter().map(String::as_str).collect();
            let found = detect_norms(&refs);
            if found.is_empty() {
                bail!(clever_eval::Error::NoDistanceColumns(input.input.clone()));
            }
            tracing::debug!(?found, "detected norms");
            found
        }
    };

    let mut summaries = Vec::with_capacity(norms.len());
    for norm in norms {
        let loaded = super::load(input, norm)?;
        summaries.push((loaded.samples, loaded.analysis.summary()));
    }

    if json {
        println!("{}", summaries_json(&summaries)?);
        return Ok(());
    }

    for (i, (samples, summary)) in summaries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_summary(*samples, summary);
    }
    Ok(())
}

fn summaries_json(summaries: &[(u32, AnalysisSummary)]) -> serde_json::Result<String> {
    let values: Vec<NormSummary<'_>> = summaries
        .iter()
        .map(|(clever_samples, summary)| NormSummary {
            clever_samples: *clever_samples,
            summary,
        })
        .collect();
    serde_json::to_string_pretty(&values)
}

fn print_summary(samples: u32, summary: &AnalysisSummary) {
    println!(
        "{} norm ({} CLEVER samples): {} images",
        summary.norm, samples, summary.total
    );
    println!("{:-<60}", "");
    println!("Minimum from PGD:           {}", summary.pgd_minimum);
    println!("Minimum from second attack: {}", summary.secondary_minimum);
    println!(
        "CLEVER > distance:          {} ({:.1}%)",
        summary.clever_exceeds,
        summary.exceeds_fraction * 100.0
    );
    println!("CLEVER <= distance:         {}", summary.clever_bounded);

    print_distribution("Minimum adversarial distance", summary.min_distance.as_ref());
    print_distribution("CLEVER score", summary.clever.as_ref());
    print_distribution("Distance - CLEVER", summary.gap.as_ref());
}

fn print_distribution(name: &str, summary: Option<&Summary>) {
    let Some(s) = summary else {
        return;
    };
    println!("{}:", name);
    println!("  Mean: {:.4}, Median: {:.4}, StdDev: {:.4}", s.mean, s.median, s.std_dev);
    println!("  Min: {:.4}, Max: {:.4}", s.min, s.max);
    println!("  P5: {:.4}, P25: {:.4}, P75: {:.4}, P95: {:.4}", s.p5, s.p25, s.p75, s.p95);
}
