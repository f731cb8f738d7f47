//! Genotypes and allele frequencies recomputed from the trees of a tree sequence.
//!
//! Allele indices follow tskit: the ancestral state is allele 0 and derived states are numbered
//! in order of their first appearance among the mutations of the site. Samples isolated in the
//! local tree are missing data unless a mutation sits directly on them.

use ndarray::{Array1, Array2, ArrayViewMut1, Axis};
use tskit::prelude::StreamingIterator;

use super::row_index;
use crate::errors::{Result, SlimcheckError};

/// Genotype of a sample that is isolated at a site.
pub const MISSING_DATA: f64 = -1.;

struct SiteAlleles {
    position: f64,
    ancestral_state: Vec<u8>,
    /// Node and derived state of every mutation, in table order.
    mutations: Vec<(tskit::NodeId, Vec<u8>)>,
}

fn site_alleles(tree_sequence: &tskit::TreeSequence) -> Result<Vec<SiteAlleles>> {
    let mut sites: Vec<SiteAlleles> = tree_sequence
        .sites()
        .iter()
        .map(|row| SiteAlleles {
            position: f64::from(row.position),
            ancestral_state: row.ancestral_state.unwrap_or_default(),
            mutations: Vec::new(),
        })
        .collect();
    for (index, row) in tree_sequence.mutations().iter().enumerate() {
        let site = row_index(row.site)
            .and_then(|site| sites.get_mut(site))
            .ok_or_else(|| {
                SlimcheckError::MetadataError(format!("mutation {} has no site", index))
            })?;
        site.mutations
            .push((row.node, row.derived_state.unwrap_or_default()));
    }
    Ok(sites)
}

/// Allele indices of every sample at every site, shape `(sites, samples)`.
///
/// Walks the trees once and decodes the sites of each tree from its sample lists.
pub fn genotype_matrix(tree_sequence: &tskit::TreeSequence) -> Result<Array2<f64>> {
    let sites = site_alleles(tree_sequence)?;
    let samples = tree_sequence.sample_nodes();

    let num_nodes = u64::from(tree_sequence.nodes().num_rows()) as usize;
    let mut columns = vec![None; num_nodes];
    for (column, &sample) in samples.iter().enumerate() {
        if let Some(node) = row_index(sample) {
            columns[node] = Some(column);
        }
    }

    let mut matrix = Array2::<f64>::zeros((sites.len(), samples.len()));
    let mut next_site = 0;
    let mut trees = tree_sequence.tree_iterator(tskit::TreeFlags::SAMPLE_LISTS)?;
    while let Some(tree) = trees.next() {
        let right = f64::from(tree.interval().1);
        while let Some(site) = sites.get(next_site).filter(|site| site.position < right) {
            decode_site(tree, samples, &columns, site, matrix.row_mut(next_site))?;
            next_site += 1;
        }
    }
    Ok(matrix)
}

fn decode_site(
    tree: &tskit::Tree,
    samples: &[tskit::NodeId],
    columns: &[Option<usize>],
    site: &SiteAlleles,
    mut genotypes: ArrayViewMut1<f64>,
) -> Result<()> {
    for (column, &sample) in samples.iter().enumerate() {
        if tree.parent(sample).is_none() && tree.left_child(sample).is_none() {
            genotypes[column] = MISSING_DATA;
        }
    }

    let mut alleles: Vec<&[u8]> = vec![site.ancestral_state.as_slice()];
    // parents precede children in the mutation table, so later mutations overwrite
    for (node, derived_state) in &site.mutations {
        let allele = match alleles
            .iter()
            .position(|allele| *allele == derived_state.as_slice())
        {
            Some(allele) => allele,
            None => {
                alleles.push(derived_state.as_slice());
                alleles.len() - 1
            }
        };
        for sample in tree.samples(*node)? {
            if let Some(column) = row_index(sample).and_then(|node| columns[node]) {
                genotypes[column] = allele as f64;
            }
        }
    }
    Ok(())
}

/// Mean allele index per site, which is the derived allele frequency for biallelic sites.
pub fn allele_frequencies(genotypes: &Array2<f64>) -> Result<Array1<f64>> {
    genotypes
        .mean_axis(Axis(1))
        .ok_or_else(|| SlimcheckError::NoData("tree sequence without samples".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_node(tables: &mut tskit::TableCollection, sample: bool, time: f64) -> tskit::NodeId {
        let flags = if sample {
            tskit::NodeFlags::new_sample()
        } else {
            tskit::NodeFlags::default()
        };
        tables
            .add_node(
                flags,
                time,
                tskit::PopulationId::NULL,
                tskit::IndividualId::NULL,
            )
            .unwrap()
    }

    ///       6
    ///     /   \
    ///    4     5
    ///   / \   / \
    ///  0   1 2   3
    fn balanced_tables() -> tskit::TableCollection {
        let mut tables = tskit::TableCollection::new(1.0).unwrap();
        for _ in 0..4 {
            add_node(&mut tables, true, 0.);
        }
        add_node(&mut tables, false, 1.);
        add_node(&mut tables, false, 1.);
        add_node(&mut tables, false, 2.);
        for (parent, child) in [(4, 0), (4, 1), (5, 2), (5, 3), (6, 4), (6, 5)] {
            tables.add_edge(0., 1., parent, child).unwrap();
        }
        tables
    }

    fn tree_sequence(mut tables: tskit::TableCollection) -> tskit::TreeSequence {
        tables
            .full_sort(tskit::TableSortOptions::default())
            .unwrap();
        tables.build_index().unwrap();
        tables
            .tree_sequence(tskit::TreeSequenceFlags::default())
            .unwrap()
    }

    fn matrix(tables: tskit::TableCollection) -> Array2<f64> {
        genotype_matrix(&tree_sequence(tables)).unwrap()
    }

    #[test]
    fn single_site_frequency() {
        let mut tables = balanced_tables();
        let site = tables.add_site(0., Some(b"0".as_slice())).unwrap();
        tables
            .add_mutation(site, 4, tskit::MutationId::NULL, 1.5, Some(b"1".as_slice()))
            .unwrap();

        let genotypes = matrix(tables);
        assert_eq!(genotypes.shape(), &[1, 4]);
        assert_eq!(genotypes.row(0).to_vec(), vec![1., 1., 0., 0.]);
        assert_eq!(allele_frequencies(&genotypes).unwrap().to_vec(), vec![0.5]);
    }

    #[test]
    fn back_mutation_restores_ancestral_allele() {
        let mut tables = balanced_tables();
        let site = tables.add_site(0., Some(b"0".as_slice())).unwrap();
        let forward = tables
            .add_mutation(site, 6, tskit::MutationId::NULL, 2.5, Some(b"1".as_slice()))
            .unwrap();
        tables
            .add_mutation(site, 5, forward, 1.5, Some(b"0".as_slice()))
            .unwrap();

        assert_eq!(matrix(tables).row(0).to_vec(), vec![1., 1., 0., 0.]);
    }

    #[test]
    fn new_alleles_are_numbered_by_appearance() {
        let mut tables = balanced_tables();
        let site = tables.add_site(0., Some(b"".as_slice())).unwrap();
        tables
            .add_mutation(site, 4, tskit::MutationId::NULL, 1.5, Some(b"0".as_slice()))
            .unwrap();
        tables
            .add_mutation(site, 3, tskit::MutationId::NULL, 0.5, Some(b"7".as_slice()))
            .unwrap();

        assert_eq!(matrix(tables).row(0).to_vec(), vec![1., 1., 0., 2.]);
    }

    #[test]
    fn sites_use_their_local_tree() {
        // left half: (0,1),(2,3); right half: (0,2),(1,3)
        let mut tables = tskit::TableCollection::new(1.0).unwrap();
        for _ in 0..4 {
            add_node(&mut tables, true, 0.);
        }
        add_node(&mut tables, false, 1.);
        add_node(&mut tables, false, 1.);
        add_node(&mut tables, false, 2.);
        for (parent, child) in [(4, 0), (4, 1), (5, 2), (5, 3)] {
            tables.add_edge(0., 0.5, parent, child).unwrap();
        }
        for (parent, child) in [(4, 0), (4, 2), (5, 1), (5, 3)] {
            tables.add_edge(0.5, 1., parent, child).unwrap();
        }
        tables.add_edge(0., 1., 6, 4).unwrap();
        tables.add_edge(0., 1., 6, 5).unwrap();
        for position in [0.25, 0.75] {
            let site = tables.add_site(position, Some(b"0".as_slice())).unwrap();
            tables
                .add_mutation(site, 4, tskit::MutationId::NULL, 1.5, Some(b"1".as_slice()))
                .unwrap();
        }

        let genotypes = matrix(tables);
        assert_eq!(genotypes.row(0).to_vec(), vec![1., 1., 0., 0.]);
        assert_eq!(genotypes.row(1).to_vec(), vec![1., 0., 1., 0.]);
    }

    #[test]
    fn isolated_sample_is_missing() {
        let mut tables = balanced_tables();
        let isolated = add_node(&mut tables, true, 0.);
        let site = tables.add_site(0., Some(b"0".as_slice())).unwrap();
        tables
            .add_mutation(site, 4, tskit::MutationId::NULL, 1.5, Some(b"1".as_slice()))
            .unwrap();
        let second = tables.add_site(0.5, Some(b"0".as_slice())).unwrap();
        tables
            .add_mutation(second, isolated, tskit::MutationId::NULL, 0.5, Some(b"1".as_slice()))
            .unwrap();

        let genotypes = matrix(tables);
        assert_eq!(genotypes.row(0).to_vec(), vec![1., 1., 0., 0., MISSING_DATA]);
        // a mutation on the isolated sample itself is observed
        assert_eq!(genotypes.row(1).to_vec(), vec![0., 0., 0., 0., 1.]);
    }

    #[test]
    fn site_without_mutations_is_ancestral() {
        let mut tables = balanced_tables();
        tables.add_site(0., Some(b"0".as_slice())).unwrap();
        let genotypes = matrix(tables);
        assert_eq!(allele_frequencies(&genotypes).unwrap().to_vec(), vec![0.]);
    }

    #[test]
    fn no_sites_no_frequencies() {
        let genotypes = matrix(balanced_tables());
        assert_eq!(genotypes.shape(), &[0, 4]);
        assert!(allele_frequencies(&genotypes).unwrap().is_empty());
    }

    #[test]
    fn no_samples_is_no_data() {
        let genotypes = Array2::<f64>::zeros((1, 0));
        assert!(matches!(
            allele_frequencies(&genotypes),
            Err(SlimcheckError::NoData(_))
        ));
    }
}
