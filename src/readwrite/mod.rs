//! Reading and writing tree sequences, frequency reports and genotype matrices.

mod frequency;
mod genotypes;
mod schema;
mod trees;

pub use frequency::FrequencyReport;
pub use genotypes::{write_genotypes, write_genotypes_to_file};
pub use schema::MetadataTable;
pub use trees::{Annotation, GenealogicalRecord};

#[cfg(test)]
pub(crate) use trees::tests::{balanced_diploids, binary_burnin};
