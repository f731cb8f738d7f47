use serde::{Deserialize, Serialize};

use crate::args::Args;

/// Genetic parameters shared by the burn-in and the SLiM run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Parameters {
    /// Seed passed to the burn-in toolchain and to SLiM.
    pub seed: u64,

    /// Number of diploid individuals. Used both as sample size and as population size of the
    /// coalescent.
    pub num_individuals: usize,

    /// Number of loci.
    pub seq_length: usize,

    /// Per-locus mutation rate.
    pub mu: f64,

    /// Number of SLiM ticks.
    pub num_generations: usize,
}

/// Resolved input and output locations of a run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Paths {
    /// Tree sequence, written by the burn-in and overwritten by SLiM.
    pub trees: String,

    /// Frequency report written by SLiM.
    pub frequency: String,

    /// Optional genotype matrix export.
    pub genotypes: Option<String>,
}

impl Parameters {
    pub fn from_args(args: &Args) -> Self {
        Self {
            seed: args.seed,
            num_individuals: args.num_individuals,
            seq_length: args.seq_length,
            mu: args.mu,
            num_generations: args.num_generations,
        }
    }
}

impl Paths {
    /// Prefix is prepended verbatim, it is not treated as a directory.
    pub fn from_args(args: &Args) -> Self {
        Self {
            trees: format!("{}{}", args.prefix, args.out_path),
            frequency: format!("{}{}", args.prefix, args.frequency_path),
            genotypes: args.genotypes.clone(),
        }
    }

    /// Location of the raw coalescent output before mutations are overlaid.
    pub fn raw_trees(&self) -> String {
        format!("{}.raw", self.trees)
    }
}
