//! Export command.

use std::path::Path;

use anyhow::{Context, Result, bail};
use clever_eval::report::write_points_csv;
use clever_eval::{AnalysisReport, Norm};

use super::InputArgs;

pub fn run(input: &InputArgs, output: &Path, norm: Norm) -> Result<()> {
    let loaded = super::load(input, norm)?;

    let ext = output
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some("json") => AnalysisReport::new(&input.input, loaded.samples, &loaded.analysis)
            .write_json(output)
            .with_context(|| format!("Failed to write {}", output.display()))?,
        Some("csv") => write_points_csv(output, &loaded.analysis, input.format()?)
            .with_context(|| format!("Failed to write {}", output.display()))?,
        _ => bail!("Unsupported export format: {} (use .json or .csv)", output.display()),
    }

    println!(
        "Exported {} images to: {}",
        loaded.analysis.points.len(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_in(dir: &Path) -> InputArgs {
        let path = dir.join("d.csv");
        std::fs::write(
            &path,
            "2-norm-Clever-1024-samples;2-norm-PGD-dist;2-norm-sec-att-dist\n0,5;0,4;0,6\n",
        )
        .unwrap();
        InputArgs {
            input: path,
            samples: Some(1024),
            delimiter: ';',
            decimal: ',',
        }
    }

    #[test]
    fn test_export_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_in(dir.path());

        let csv = dir.path().join("points.csv");
        run(&input, &csv, Norm::L2).unwrap();
        assert!(std::fs::read_to_string(&csv).unwrap().contains("0;0,5;0,4;0,6;0,4;pgd;true"));

        let json = dir.path().join("report.JSON");
        run(&input, &json, Norm::L2).unwrap();
        assert!(std::fs::read_to_string(&json).unwrap().contains("\"clever_samples\": 1024"));
    }

    #[test]
    fn test_export_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_in(dir.path());
        assert!(run(&input, &dir.path().join("out.txt"), Norm::L2).is_err());
    }
}
