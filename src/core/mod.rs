pub mod genotype;
pub mod metadata;
pub mod mutation;

pub use genotype::{MISSING_DATA, allele_frequencies, genotype_matrix};
pub use metadata::{
    ModelType, SlimGenome, SlimIndividual, SlimPopulation, TreeSequenceMetadata,
};
pub use mutation::{MutationEntry, MutationList, SlimMutation, rewrite_mutations};

/// Row index of a tskit id, `None` for the null id.
pub(crate) fn row_index<I: Into<i32>>(id: I) -> Option<usize> {
    usize::try_from(id.into()).ok()
}
