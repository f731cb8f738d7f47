//! Tree sequence input and output on top of the tskit table collection.

use ndarray::{Array1, Array2};
use std::fmt;

use super::schema::{self, MetadataTable};
use crate::core::metadata::{
    INDIVIDUAL_ALIVE, INDIVIDUAL_SCHEMA, MUTATION_SCHEMA, NODE_SCHEMA, POPULATION_SCHEMA,
    TIME_UNITS, TREE_SEQUENCE_SCHEMA,
};
use crate::core::mutation::NULL_SUBPOPULATION;
use crate::core::{
    ModelType, MutationEntry, MutationList, SlimGenome, SlimIndividual, SlimPopulation,
    TreeSequenceMetadata, allele_frequencies, genotype_matrix, rewrite_mutations, row_index,
};
use crate::errors::{Result, SlimcheckError};

/// A genealogical record as stored in a `.trees` file.
pub struct GenealogicalRecord {
    tables: tskit::TableCollection,
}

/// Number of rows that received SLiM metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Annotation {
    pub individuals: usize,
    pub nodes: usize,
    pub populations: usize,
    pub mutations: usize,
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} individuals, {} nodes, {} populations, {} mutations",
            self.individuals, self.nodes, self.populations, self.mutations
        )
    }
}

fn count(size: tskit::SizeType) -> usize {
    u64::from(size) as usize
}

fn state(bytes: &Option<Vec<u8>>) -> String {
    bytes
        .as_deref()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .unwrap_or_default()
}

impl GenealogicalRecord {
    pub fn from_tables(tables: tskit::TableCollection) -> Self {
        Self { tables }
    }

    pub fn load(path: &str) -> Result<Self> {
        log::debug!("Loading tree sequence from {}", path);
        let tables = tskit::TableCollection::new_from_file(path)?;
        Ok(Self { tables })
    }

    /// Validate the tables as a tree sequence and write them to `path`.
    pub fn dump(self, path: &str) -> Result<()> {
        log::debug!("Writing tree sequence to {}", path);
        let tree_sequence = self
            .tables
            .tree_sequence(tskit::TreeSequenceFlags::BUILD_INDEXES)?;
        tree_sequence.dump(path, tskit::TableOutputOptions::default())?;
        Ok(())
    }

    pub fn num_individuals(&self) -> usize {
        count(self.tables.individuals().num_rows())
    }

    pub fn num_nodes(&self) -> usize {
        count(self.tables.nodes().num_rows())
    }

    pub fn num_edges(&self) -> usize {
        count(self.tables.edges().num_rows())
    }

    pub fn num_populations(&self) -> usize {
        count(self.tables.populations().num_rows())
    }

    pub fn num_sites(&self) -> usize {
        count(self.tables.sites().num_rows())
    }

    pub fn num_mutations(&self) -> usize {
        count(self.tables.mutations().num_rows())
    }

    /// Derived states and decoded SLiM metadata of all mutations in table order.
    pub fn mutation_entries(&self) -> Result<Vec<MutationEntry>> {
        self.tables
            .mutations()
            .iter()
            .map(|row| {
                let mutation_list = match row.metadata.as_deref() {
                    Some(bytes) => MutationList::decode(bytes)?,
                    None => MutationList::new(),
                };
                Ok(MutationEntry {
                    derived_state: state(&row.derived_state),
                    mutation_list,
                })
            })
            .collect()
    }

    /// Turn the record into one SLiM can load at `tick`.
    ///
    /// Writes the top-level metadata and time units, marks every individual alive with a
    /// founder record, gives each of its nodes a genome record, describes every population as
    /// a SLiM subpopulation, annotates unannotated mutations and installs the SLiM metadata
    /// schemas.
    pub fn annotate_tables(&mut self, model_type: ModelType, tick: i32) -> Result<Annotation> {
        let metadata = TreeSequenceMetadata::new(model_type, tick).encode()?;
        schema::set_metadata(&mut self.tables, &metadata)?;
        schema::set_time_units(&mut self.tables, TIME_UNITS)?;

        let (individuals, nodes) = self.annotate_individuals(model_type)?;
        let populations = self.annotate_populations()?;
        let mutations = self.annotate_mutations(tick)?;

        for (table, text) in [
            (MetadataTable::TreeSequence, TREE_SEQUENCE_SCHEMA),
            (MetadataTable::Individuals, INDIVIDUAL_SCHEMA),
            (MetadataTable::Nodes, NODE_SCHEMA),
            (MetadataTable::Populations, POPULATION_SCHEMA),
            (MetadataTable::Mutations, MUTATION_SCHEMA),
        ] {
            schema::set_metadata_schema(&mut self.tables, table, text)?;
        }

        let annotation = Annotation {
            individuals,
            nodes,
            populations,
            mutations,
        };
        log::debug!("Annotated {} as {} model at tick {}", annotation, model_type, tick);
        Ok(annotation)
    }

    /// Founder records for all individuals, genome records for the nodes that belong to one.
    ///
    /// Genome ids are `2 * individual` and `2 * individual + 1` in node order.
    fn annotate_individuals(&mut self, model_type: ModelType) -> Result<(usize, usize)> {
        let num_individuals = self.num_individuals();
        let mut subpopulations = vec![NULL_SUBPOPULATION; num_individuals];
        let mut genomes = vec![0_i64; num_individuals];

        let mut nodes = tskit::NodeTable::default();
        let mut annotated_nodes = 0;
        for row in self.tables.nodes().iter() {
            match row_index(row.individual) {
                Some(individual) => {
                    let genome = genomes.get_mut(individual).ok_or_else(|| {
                        SlimcheckError::MetadataError(format!(
                            "node refers to missing individual {}",
                            individual
                        ))
                    })?;
                    if *genome == 2 {
                        return Err(SlimcheckError::MetadataError(format!(
                            "individual {} has more than two nodes",
                            individual
                        )));
                    }
                    let metadata = SlimGenome::autosome(2 * individual as i64 + *genome);
                    *genome += 1;
                    subpopulations[individual] = i32::from(row.population);
                    nodes.add_row_with_metadata(
                        row.flags,
                        row.time,
                        row.population,
                        row.individual,
                        &metadata,
                    )?;
                    annotated_nodes += 1;
                }
                None => {
                    nodes.add_row(row.flags, row.time, row.population, row.individual)?;
                }
            }
        }

        let mut individuals = tskit::IndividualTable::default();
        for (index, (row, subpopulation)) in self
            .tables
            .individuals()
            .iter()
            .zip(subpopulations)
            .enumerate()
        {
            let metadata =
                SlimIndividual::founder(index as i64, model_type.default_age(), subpopulation);
            individuals.add_row_with_metadata(
                tskit::IndividualFlags::from(row.flags.bits() | INDIVIDUAL_ALIVE),
                row.location.as_deref(),
                row.parents.as_deref(),
                &metadata,
            )?;
        }

        self.tables.set_nodes(&nodes)?;
        self.tables.set_individuals(&individuals)?;
        Ok((num_individuals, annotated_nodes))
    }

    /// Population `i` becomes SLiM subpopulation `p<i>`.
    fn annotate_populations(&mut self) -> Result<usize> {
        let mut populations = tskit::PopulationTable::default();
        for slim_id in 0..self.num_populations() {
            populations.add_row_with_metadata(&SlimPopulation::new(slim_id as i32))?;
        }
        self.tables.set_populations(&populations)?;
        Ok(self.num_populations())
    }

    /// Give default SLiM metadata to every mutation that carries none.
    ///
    /// Returns the number of annotated mutations.
    pub fn annotate_mutations(&mut self, tick: i32) -> Result<usize> {
        let mut annotated = 0;
        let entries: Vec<MutationEntry> = self
            .tables
            .mutations()
            .iter()
            .map(|row| {
                let derived_state = state(&row.derived_state);
                let mutation_list = match row.metadata.as_deref() {
                    Some(bytes) if !bytes.is_empty() => MutationList::decode(bytes)?,
                    _ => {
                        annotated += 1;
                        MutationList::annotate(&derived_state, f64::from(row.time), tick)
                    }
                };
                Ok(MutationEntry {
                    derived_state,
                    mutation_list,
                })
            })
            .collect::<Result<_>>()?;
        self.replace_mutations(&entries)?;
        log::debug!("Annotated {} mutations for tick {}", annotated, tick);
        Ok(annotated)
    }

    /// Apply the SLiM state rewrite to the whole mutation table.
    pub fn rewrite_mutations(&mut self) -> Result<()> {
        let entries = rewrite_mutations(self.mutation_entries()?)?;
        self.replace_mutations(&entries)
    }

    /// Replace derived states and metadata, keeping site, node, parent and time of every row.
    ///
    /// The metadata schema of the mutation table is kept.
    pub fn replace_mutations(&mut self, entries: &[MutationEntry]) -> Result<()> {
        if entries.len() != self.num_mutations() {
            return Err(SlimcheckError::MetadataError(format!(
                "{} replacement entries for {} mutations",
                entries.len(),
                self.num_mutations()
            )));
        }
        let mut mutations = tskit::MutationTable::default();
        for (row, entry) in self.tables.mutations().iter().zip(entries) {
            mutations.add_row_with_metadata(
                row.site,
                row.node,
                row.parent,
                row.time,
                Some(entry.derived_state.as_bytes()),
                &entry.mutation_list,
            )?;
        }
        let mutation_schema = self.metadata_schema(MetadataTable::Mutations);
        self.tables.set_mutations(&mutations)?;
        schema::set_metadata_schema(&mut self.tables, MetadataTable::Mutations, &mutation_schema)
    }

    /// Decoded top-level SLiM metadata, `None` when the record carries none.
    pub fn tree_sequence_metadata(&self) -> Result<Option<TreeSequenceMetadata>> {
        let bytes = schema::metadata(&self.tables);
        if bytes.is_empty() {
            return Ok(None);
        }
        TreeSequenceMetadata::decode(&bytes).map(Some)
    }

    pub fn time_units(&self) -> String {
        schema::time_units(&self.tables)
    }

    pub fn metadata_schema(&self, table: MetadataTable) -> String {
        schema::metadata_schema(&self.tables, table)
    }

    /// Flags and SLiM record of every individual.
    pub fn individuals(&self) -> Result<Vec<(u32, Option<SlimIndividual>)>> {
        self.tables
            .individuals()
            .iter()
            .map(|row| {
                let metadata = match row.metadata.as_deref() {
                    Some(bytes) if !bytes.is_empty() => Some(SlimIndividual::decode(bytes)?),
                    _ => None,
                };
                Ok((row.flags.bits(), metadata))
            })
            .collect()
    }

    /// SLiM genome record of every node, `None` for nodes outside individuals.
    pub fn genomes(&self) -> Result<Vec<Option<SlimGenome>>> {
        self.tables
            .nodes()
            .iter()
            .map(|row| match row.metadata.as_deref() {
                Some(bytes) if !bytes.is_empty() => SlimGenome::decode(bytes).map(Some),
                _ => Ok(None),
            })
            .collect()
    }

    pub fn populations(&self) -> Result<Vec<Option<SlimPopulation>>> {
        self.tables
            .populations()
            .iter()
            .map(|row| match row.metadata.as_deref() {
                Some(bytes) if !bytes.is_empty() => SlimPopulation::decode(bytes).map(Some),
                _ => Ok(None),
            })
            .collect()
    }

    /// Indexed copy of the tables as a tree sequence.
    pub fn tree_sequence(&self) -> Result<tskit::TreeSequence> {
        let tables = self.tables.deepcopy()?;
        Ok(tables.tree_sequence(tskit::TreeSequenceFlags::BUILD_INDEXES)?)
    }

    pub fn genotype_matrix(&self) -> Result<Array2<f64>> {
        genotype_matrix(&self.tree_sequence()?)
    }

    /// Mean genotype per site over all samples.
    pub fn allele_frequencies(&self) -> Result<Array1<f64>> {
        allele_frequencies(&self.genotype_matrix()?)
    }
}

impl fmt::Display for GenealogicalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TreeSequence(sequence_length={},individuals={},nodes={},edges={},sites={},mutations={})",
            f64::from(self.tables.sequence_length()),
            self.num_individuals(),
            self.num_nodes(),
            self.num_edges(),
            self.num_sites(),
            self.num_mutations()
        )
    }
}
