use clap::{Parser, Subcommand};

/// Floats are handed to SLiM as Eidos literals, which have no spelling for `inf` or `NaN`.
fn finite_float(value: &str) -> Result<f64, String> {
    let parsed: f64 = value.parse().map_err(|error| format!("{}", error))?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(format!("{} is not a finite number", value))
    }
}

#[derive(Parser, Debug, Clone)]
#[clap(
    author,
    version,
    about,
    long_about = None,
    name = "slimcheck",
)]
pub struct Args {
    /// Random seed for burn-in and SLiM.
    #[clap(
        long,
        default_value_t = 973,
        value_parser = clap::value_parser!(u64).range(..=i64::MAX as u64),
    )]
    pub seed: u64,

    /// Number of diploid individuals (also the effective population size).
    #[clap(long, default_value_t = 10000)]
    pub num_individuals: usize,

    /// Number of loci.
    #[clap(long, default_value_t = 1)]
    pub seq_length: usize,

    /// Mutation rate.
    #[clap(long, default_value_t = 1e-2, value_parser = finite_float)]
    pub mu: f64,

    /// Number of generations (ticks) to run in SLiM.
    #[clap(long, default_value_t = 100)]
    pub num_generations: usize,

    /// Prefix prepended to every output path.
    #[clap(long, default_value = "")]
    pub prefix: String,

    /// Path of the tree sequence (burn-in input, SLiM output).
    #[clap(long)]
    pub out_path: String,

    /// Path of the frequency report written by SLiM.
    #[clap(long)]
    pub frequency_path: String,

    /// Path to toolchain settings (yaml).
    #[clap(long)]
    pub settings: Option<String>,

    /// Optional path to export the final genotype matrix (npy).
    #[clap(long)]
    pub genotypes: Option<String>,

    /// Path to log file.
    #[clap(long, default_value = "slimcheck.log")]
    pub log_file: String,

    /// Increase log verbosity.
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable the progress bar.
    #[clap(long)]
    pub disable_progress_bar: bool,

    #[clap(subcommand)]
    pub scenario: Scenario,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Scenario {
    /// Biallelic selection check.
    Biallelic {
        /// Main simulation script.
        #[clap(long)]
        biallelic_path: String,

        /// Mutation id check script, run before the main simulation.
        #[clap(long)]
        id_check_path: Option<String>,
    },

    /// Stabilizing selection on a quantitative trait.
    Stabilizing {
        /// Path to slim script.
        #[clap(long)]
        src_path: String,

        /// Vs of stabilizing selection.
        #[clap(long, default_value_t = 5., value_parser = finite_float)]
        vs: f64,

        /// Effect size setting.
        #[clap(long, default_value = "variable")]
        eff_setting: String,

        /// Variance of effect size.
        #[clap(long, default_value_t = 0.01, value_parser = finite_float)]
        eff_var: f64,

        /// Fixed effect size.
        #[clap(long, default_value_t = 0.1, value_parser = finite_float)]
        eff_const: f64,
    },
}
