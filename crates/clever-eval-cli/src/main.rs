//! clever-eval CLI - CLEVER score vs. adversarial distance plots

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clever_eval::Norm;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::InputArgs;

/// Compare CLEVER scores against PGD and secondary attack distances.
#[derive(Parser)]
#[command(name = "clever-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scatter plot of minimum adversarial distance and CLEVER score per image
    Plot {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (.pdf or .svg) [default: adv_vs_cl_l<norm>_<samples>.pdf]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Norm of the columns to plot (1, 2 or inf)
        #[arg(long, env = "CLEVER_EVAL_NORM", default_value = "2")]
        norm: Norm,

        /// Figure width in inches
        #[arg(long, default_value_t = 4.69, value_parser = parse_inches)]
        width: f64,

        /// Figure height in inches
        #[arg(long, default_value_t = 2.17, value_parser = parse_inches)]
        height: f64,

        /// Title above the axes
        #[arg(long)]
        title: Option<String>,

        /// Draw a legend for the four marker colors
        #[arg(long)]
        legend: bool,

        /// Open the plot in the system viewer after saving
        #[arg(long)]
        show: bool,

        /// Also write a JSON report
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print counts and distributions
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// Norm to summarize [default: every norm found in the file]
        #[arg(long)]
        norm: Option<Norm>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Export per-image derived values (.json report or .csv table)
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Norm of the columns to export (1, 2 or inf)
        #[arg(long, env = "CLEVER_EVAL_NORM", default_value = "2")]
        norm: Norm,
    },
}

/// Figure dimension: a finite number of inches greater than zero.
fn parse_inches(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("expected a positive size in inches, got {s}"))
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Plot {
            input,
            output,
            norm,
            width,
            height,
            title,
            legend,
            show,
            report,
        } => commands::plot::run(
            &input,
            commands::plot::PlotArgs {
                output,
                norm,
                width,
                height,
                title,
                legend,
                show,
                report,
            },
        ),
        Commands::Summary { input, norm, json } => commands::summary::run(&input, norm, json),
        Commands::Export { input, output, norm } => commands::export::run(&input, &output, norm),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inches() {
        assert_eq!(parse_inches("4.69"), Ok(4.69));
        assert!(parse_inches("0").is_err());
        assert!(parse_inches("-2").is_err());
        assert!(parse_inches("NaN").is_err());
        assert!(parse_inches("inf").is_err());
        assert!(parse_inches("wide").is_err());
    }

    #[test]
    fn test_plot_rejects_bad_dimensions() {
        let parse = |args: &[&str]| Cli::try_parse_from(args);
        assert!(parse(&["clever-eval", "plot", "-i", "d.csv", "--width", "0"]).is_err());
        assert!(parse(&["clever-eval", "plot", "-i", "d.csv", "--height", "NaN"]).is_err());
        assert!(parse(&["clever-eval", "plot", "-i", "d.csv", "--width=-1"]).is_err());

        let cli = parse(&["clever-eval", "plot", "-i", "d.csv", "--width", "6"]).unwrap();
        let Commands::Plot { width, height, .. } = cli.command else {
            panic!("expected plot command");
        };
        assert_eq!(width, 6.0);
        assert_eq!(height, 2.17);
    }
}
