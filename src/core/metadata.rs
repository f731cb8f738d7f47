//! SLiM metadata of the tree sequence and of its individual, node and population tables.
//!
//! SLiM refuses to load a tree sequence unless the top-level metadata names the model type and
//! tick, every individual alive at the hand-over carries its packed record and every node of an
//! individual carries the genome record. Individual and node records are little-endian structs:
//!
//! | individual      | type  |    | node          | type   |
//! |-----------------|-------|----|---------------|--------|
//! | `pedigree_id`   | `i64` |    | `genome_id`   | `i64`  |
//! | `pedigree_p1`   | `i64` |    | `is_null`     | `bool` |
//! | `pedigree_p2`   | `i64` |    | `genome_type` | `u8`   |
//! | `age`           | `i32` |    |               |        |
//! | `subpopulation` | `i32` |    |               |        |
//! | `sex`           | `i32` |    |               |        |
//! | `flags`         | `u32` |    |               |        |
//!
//! Population metadata and top-level metadata are JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{Result, SlimcheckError};

/// Version of the SLiM tree sequence format written here.
pub const FILE_VERSION: &str = "0.8";

/// Time units SLiM expects in the table collection.
pub const TIME_UNITS: &str = "ticks";

/// Individual table flag marking individuals alive at the time of the hand-over.
pub const INDIVIDUAL_ALIVE: u32 = 1 << 16;

pub const HERMAPHRODITE: i32 = -1;
pub const AUTOSOME: u8 = 0;
pub const NO_PARENT: i64 = -1;

pub const SLIM_INDIVIDUAL_SIZE: usize = 40;
pub const SLIM_GENOME_SIZE: usize = 10;

pub const TREE_SEQUENCE_SCHEMA: &str = include_str!("schema/tree_sequence.json");
pub const INDIVIDUAL_SCHEMA: &str = include_str!("schema/individual.json");
pub const NODE_SCHEMA: &str = include_str!("schema/node.json");
pub const POPULATION_SCHEMA: &str = include_str!("schema/population.json");
pub const MUTATION_SCHEMA: &str = include_str!("schema/mutation.json");

pub(crate) fn roundtrip_error(error: SlimcheckError) -> tskit::metadata::MetadataError {
    tskit::metadata::MetadataError::RoundtripError {
        value: error.to_string().into(),
    }
}

/// Copy `N` bytes starting at `offset`.
fn field<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    bytes
        .get(offset..offset + N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            SlimcheckError::MetadataError(format!(
                "metadata of {} bytes has no field at offset {}",
                bytes.len(),
                offset
            ))
        })
}

fn expect_size(bytes: &[u8], size: usize, what: &str) -> Result<()> {
    if bytes.len() == size {
        Ok(())
    } else {
        Err(SlimcheckError::MetadataError(format!(
            "{} metadata of {} bytes, expected {}",
            what,
            bytes.len(),
            size
        )))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelType {
    #[default]
    #[serde(rename = "WF")]
    WrightFisher,
    #[serde(rename = "nonWF")]
    NonWrightFisher,
}

impl ModelType {
    /// Age SLiM assigns to individuals that enter the simulation from a tree sequence.
    pub fn default_age(self) -> i32 {
        match self {
            ModelType::WrightFisher => -1,
            ModelType::NonWrightFisher => 0,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelType::WrightFisher => write!(f, "WF"),
            ModelType::NonWrightFisher => write!(f, "nonWF"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SlimRecord {
    pub model_type: ModelType,
    pub tick: i32,
    pub cycle: i32,
    pub file_version: String,
    pub spatial_dimensionality: String,
    pub spatial_periodicity: String,
    pub separate_sexes: bool,
    pub nucleotide_based: bool,
    pub stage: String,
    pub name: String,
    pub description: String,
}

/// Top-level metadata of a SLiM tree sequence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TreeSequenceMetadata {
    #[serde(rename = "SLiM")]
    pub slim: SlimRecord,
}

impl TreeSequenceMetadata {
    /// Non-spatial hermaphrodite model at the end of `tick`.
    pub fn new(model_type: ModelType, tick: i32) -> Self {
        Self {
            slim: SlimRecord {
                model_type,
                tick,
                cycle: tick,
                file_version: FILE_VERSION.to_string(),
                spatial_dimensionality: String::new(),
                spatial_periodicity: String::new(),
                separate_sexes: false,
                nucleotide_based: false,
                stage: "late".to_string(),
                name: "sim".to_string(),
                description: String::new(),
            },
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlimIndividual {
    pub pedigree_id: i64,
    pub pedigree_p1: i64,
    pub pedigree_p2: i64,
    pub age: i32,
    pub subpopulation: i32,
    pub sex: i32,
    pub flags: u32,
}

impl SlimIndividual {
    /// Parentless hermaphrodite as found in a coalescent burn-in.
    pub fn founder(pedigree_id: i64, age: i32, subpopulation: i32) -> Self {
        Self {
            pedigree_id,
            pedigree_p1: NO_PARENT,
            pedigree_p2: NO_PARENT,
            age,
            subpopulation,
            sex: HERMAPHRODITE,
            flags: 0,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(SLIM_INDIVIDUAL_SIZE);
        buffer.extend_from_slice(&self.pedigree_id.to_le_bytes());
        buffer.extend_from_slice(&self.pedigree_p1.to_le_bytes());
        buffer.extend_from_slice(&self.pedigree_p2.to_le_bytes());
        buffer.extend_from_slice(&self.age.to_le_bytes());
        buffer.extend_from_slice(&self.subpopulation.to_le_bytes());
        buffer.extend_from_slice(&self.sex.to_le_bytes());
        buffer.extend_from_slice(&self.flags.to_le_bytes());
        buffer
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        expect_size(bytes, SLIM_INDIVIDUAL_SIZE, "individual")?;
        Ok(Self {
            pedigree_id: i64::from_le_bytes(field(bytes, 0)?),
            pedigree_p1: i64::from_le_bytes(field(bytes, 8)?),
            pedigree_p2: i64::from_le_bytes(field(bytes, 16)?),
            age: i32::from_le_bytes(field(bytes, 24)?),
            subpopulation: i32::from_le_bytes(field(bytes, 28)?),
            sex: i32::from_le_bytes(field(bytes, 32)?),
            flags: u32::from_le_bytes(field(bytes, 36)?),
        })
    }
}

impl tskit::metadata::MetadataRoundtrip for SlimIndividual {
    fn encode(&self) -> std::result::Result<Vec<u8>, tskit::metadata::MetadataError> {
        Ok(SlimIndividual::encode(self))
    }

    fn decode(md: &[u8]) -> std::result::Result<Self, tskit::metadata::MetadataError>
    where
        Self: Sized,
    {
        SlimIndividual::decode(md).map_err(roundtrip_error)
    }
}

impl tskit::metadata::IndividualMetadata for SlimIndividual {}

/// Node metadata, one genome of a diploid individual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlimGenome {
    pub genome_id: i64,
    pub is_null: bool,
    pub genome_type: u8,
}

impl SlimGenome {
    pub fn autosome(genome_id: i64) -> Self {
        Self {
            genome_id,
            is_null: false,
            genome_type: AUTOSOME,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(SLIM_GENOME_SIZE);
        buffer.extend_from_slice(&self.genome_id.to_le_bytes());
        buffer.push(u8::from(self.is_null));
        buffer.push(self.genome_type);
        buffer
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        expect_size(bytes, SLIM_GENOME_SIZE, "node")?;
        let [is_null, genome_type] = field::<2>(bytes, 8)?;
        Ok(Self {
            genome_id: i64::from_le_bytes(field(bytes, 0)?),
            is_null: is_null != 0,
            genome_type,
        })
    }
}

impl tskit::metadata::MetadataRoundtrip for SlimGenome {
    fn encode(&self) -> std::result::Result<Vec<u8>, tskit::metadata::MetadataError> {
        Ok(SlimGenome::encode(self))
    }

    fn decode(md: &[u8]) -> std::result::Result<Self, tskit::metadata::MetadataError>
    where
        Self: Sized,
    {
        SlimGenome::decode(md).map_err(roundtrip_error)
    }
}

impl tskit::metadata::NodeMetadata for SlimGenome {}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MigrationRecord {
    pub source_subpop: i32,
    pub migration_rate: f64,
}

/// Population metadata of a SLiM subpopulation without spatial bounds.
#[derive(
    Serialize, Deserialize, Debug, Clone, PartialEq, tskit::metadata::tskit_derive::PopulationMetadata,
)]
#[serializer("serde_json")]
pub struct SlimPopulation {
    pub name: String,
    pub description: String,
    pub slim_id: i32,
    pub selfing_fraction: f64,
    pub female_cloning_fraction: f64,
    pub male_cloning_fraction: f64,
    pub sex_ratio: f64,
    pub bounds_x0: f64,
    pub bounds_x1: f64,
    pub bounds_y0: f64,
    pub bounds_y1: f64,
    pub bounds_z0: f64,
    pub bounds_z1: f64,
    pub migration_records: Vec<MigrationRecord>,
}

impl SlimPopulation {
    /// Subpopulation `p<slim_id>`.
    pub fn new(slim_id: i32) -> Self {
        Self {
            name: format!("p{}", slim_id),
            description: String::new(),
            slim_id,
            selfing_fraction: 0.,
            female_cloning_fraction: 0.,
            male_cloning_fraction: 0.,
            sex_ratio: 0.,
            bounds_x0: 0.,
            bounds_x1: 1.,
            bounds_y0: 0.,
            bounds_y1: 1.,
            bounds_z0: 0.,
            bounds_z1: 1.,
            migration_records: Vec::new(),
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
