//! SLiM mutation metadata and the rewrite that turns a binary burn-in into SLiM input.
//!
//! SLiM stores the metadata of a tskit mutation as a list of SLiM mutations (several SLiM
//! mutations may be stacked at the same site). Each entry is a packed little-endian record:
//!
//! | field             | type  |
//! |-------------------|-------|
//! | `mutation_type`   | `i32` |
//! | `selection_coeff` | `f32` |
//! | `subpopulation`   | `i32` |
//! | `origin_tick`     | `i32` |
//! | `nucleotide`      | `i8`  |
//!
//! The binary mutation model only knows the alleles `"0"` and `"1"`. SLiM instead encodes the
//! derived state as a comma separated list of SLiM mutation ids, with the empty string meaning
//! "no mutation". The rewrite maps a back mutation (`"0"`) to the empty state and every forward
//! mutation to SLiM mutation id `0` of type `m1`.

use derive_more::{Deref, DerefMut, From, IntoIterator};

use crate::errors::{Result, SlimcheckError};

use super::metadata::roundtrip_error;

/// Size of a single packed SLiM mutation record.
pub const SLIM_MUTATION_SIZE: usize = 17;

/// SLiM's null id for subpopulations.
pub const NULL_SUBPOPULATION: i32 = -1;

/// Nucleotide value of mutations in non-nucleotide models.
pub const NO_NUCLEOTIDE: i8 = -1;

/// Mutation type assigned to every forward mutation of the burn-in.
pub const BURNIN_MUTATION_TYPE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlimMutation {
    pub mutation_type: i32,
    pub selection_coeff: f32,
    pub subpopulation: i32,
    pub origin_tick: i32,
    pub nucleotide: i8,
}

impl SlimMutation {
    /// Neutral mutation of type `0` as handed out to unannotated mutations.
    pub fn neutral(origin_tick: i32) -> Self {
        Self {
            mutation_type: 0,
            selection_coeff: 0.,
            subpopulation: NULL_SUBPOPULATION,
            origin_tick,
            nucleotide: NO_NUCLEOTIDE,
        }
    }

    fn write(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.mutation_type.to_le_bytes());
        buffer.extend_from_slice(&self.selection_coeff.to_le_bytes());
        buffer.extend_from_slice(&self.subpopulation.to_le_bytes());
        buffer.extend_from_slice(&self.origin_tick.to_le_bytes());
        buffer.extend_from_slice(&self.nucleotide.to_le_bytes());
    }

    fn read(chunk: &[u8]) -> Self {
        let word = |offset: usize| -> [u8; 4] {
            [
                chunk[offset],
                chunk[offset + 1],
                chunk[offset + 2],
                chunk[offset + 3],
            ]
        };
        Self {
            mutation_type: i32::from_le_bytes(word(0)),
            selection_coeff: f32::from_le_bytes(word(4)),
            subpopulation: i32::from_le_bytes(word(8)),
            origin_tick: i32::from_le_bytes(word(12)),
            nucleotide: i8::from_le_bytes([chunk[16]]),
        }
    }
}

/// Metadata of one tskit mutation.
#[derive(Debug, Clone, Default, PartialEq, Deref, DerefMut, From, IntoIterator)]
pub struct MutationList(Vec<SlimMutation>);

impl MutationList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.len() * SLIM_MUTATION_SIZE);
        for mutation in self.iter() {
            mutation.write(&mut buffer);
        }
        buffer
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % SLIM_MUTATION_SIZE != 0 {
            return Err(SlimcheckError::MetadataError(format!(
                "mutation metadata of {} bytes is not a multiple of {}",
                bytes.len(),
                SLIM_MUTATION_SIZE
            )));
        }
        Ok(bytes
            .chunks_exact(SLIM_MUTATION_SIZE)
            .map(SlimMutation::read)
            .collect::<Vec<_>>()
            .into())
    }

    /// Default metadata for a mutation whose derived state lists SLiM mutation ids.
    ///
    /// One neutral entry is produced per comma separated id. Mutations with unknown time
    /// originate at `tick`.
    pub fn annotate(derived_state: &str, time: f64, tick: i32) -> Self {
        let origin_tick = if time.is_finite() {
            tick - time.ceil() as i32
        } else {
            tick
        };
        derived_state
            .split(',')
            .filter(|id| !id.is_empty())
            .map(|_| SlimMutation::neutral(origin_tick))
            .collect::<Vec<_>>()
            .into()
    }
}

impl tskit::metadata::MetadataRoundtrip for MutationList {
    fn encode(&self) -> std::result::Result<Vec<u8>, tskit::metadata::MetadataError> {
        Ok(MutationList::encode(self))
    }

    fn decode(md: &[u8]) -> std::result::Result<Self, tskit::metadata::MetadataError>
    where
        Self: Sized,
    {
        MutationList::decode(md).map_err(roundtrip_error)
    }
}

impl tskit::metadata::MutationMetadata for MutationList {}

/// Derived state and metadata of one row of the mutation table.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationEntry {
    pub derived_state: String,
    pub mutation_list: MutationList,
}

impl MutationEntry {
    pub fn new(derived_state: &str, mutation_list: MutationList) -> Self {
        Self {
            derived_state: derived_state.to_string(),
            mutation_list,
        }
    }

    /// Remap a binary model mutation onto SLiM's state encoding.
    pub fn rewrite(mut self, index: usize) -> Result<Self> {
        if self.derived_state == "0" {
            self.derived_state.clear();
            self.mutation_list.clear();
        } else {
            self.derived_state = "0".to_string();
            let first = self
                .mutation_list
                .first_mut()
                .ok_or(SlimcheckError::EmptyMutationList { index })?;
            first.mutation_type = BURNIN_MUTATION_TYPE;
        }
        Ok(self)
    }
}

/// Rewrite all mutations of a burn-in, keeping their order.
pub fn rewrite_mutations(entries: Vec<MutationEntry>) -> Result<Vec<MutationEntry>> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.rewrite(index))
        .collect()
}
