//! Top-level metadata, time units and metadata schemas of a table collection.
//!
//! The tskit crate has no safe setters for these columns, so they go through the C API. The C
//! library copies every buffer handed to it.

use std::os::raw::c_char;

use tskit::bindings;

use crate::errors::Result;

/// Owner of a metadata schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataTable {
    TreeSequence,
    Individuals,
    Nodes,
    Populations,
    Mutations,
}

fn check(code: i32) -> Result<()> {
    if code < 0 {
        Err(tskit::TskitError::ErrorCode { code }.into())
    } else {
        Ok(())
    }
}

fn copy(data: *const c_char, length: bindings::tsk_size_t) -> Vec<u8> {
    if data.is_null() || length == 0 {
        return Vec::new();
    }
    // SAFETY: tskit keeps `length` valid bytes behind a non-null column pointer.
    unsafe { std::slice::from_raw_parts(data.cast::<u8>(), length as usize) }.to_vec()
}

pub fn set_metadata(tables: &mut tskit::TableCollection, metadata: &[u8]) -> Result<()> {
    // SAFETY: the pointer refers to the initialised collection owned by `tables`.
    let code = unsafe {
        bindings::tsk_table_collection_set_metadata(
            tables.as_mut_ptr(),
            metadata.as_ptr().cast(),
            metadata.len() as bindings::tsk_size_t,
        )
    };
    check(code)
}

pub fn set_time_units(tables: &mut tskit::TableCollection, time_units: &str) -> Result<()> {
    // SAFETY: as in `set_metadata`.
    let code = unsafe {
        bindings::tsk_table_collection_set_time_units(
            tables.as_mut_ptr(),
            time_units.as_ptr().cast(),
            time_units.len() as bindings::tsk_size_t,
        )
    };
    check(code)
}

pub fn set_metadata_schema(
    tables: &mut tskit::TableCollection,
    table: MetadataTable,
    schema: &str,
) -> Result<()> {
    let text = schema.as_ptr().cast::<c_char>();
    let length = schema.len() as bindings::tsk_size_t;
    let collection = tables.as_mut_ptr();
    // SAFETY: `collection` is the initialised collection owned by `tables`, its tables live inline.
    let code = unsafe {
        match table {
            MetadataTable::TreeSequence => {
                bindings::tsk_table_collection_set_metadata_schema(collection, text, length)
            }
            MetadataTable::Individuals => bindings::tsk_individual_table_set_metadata_schema(
                &mut (*collection).individuals,
                text,
                length,
            ),
            MetadataTable::Nodes => bindings::tsk_node_table_set_metadata_schema(
                &mut (*collection).nodes,
                text,
                length,
            ),
            MetadataTable::Populations => bindings::tsk_population_table_set_metadata_schema(
                &mut (*collection).populations,
                text,
                length,
            ),
            MetadataTable::Mutations => bindings::tsk_mutation_table_set_metadata_schema(
                &mut (*collection).mutations,
                text,
                length,
            ),
        }
    };
    check(code)
}

pub fn metadata(tables: &tskit::TableCollection) -> Vec<u8> {
    // SAFETY: read-only access to the collection owned by `tables`.
    let collection = unsafe { &*tables.as_ptr() };
    copy(collection.metadata, collection.metadata_length)
}

pub fn time_units(tables: &tskit::TableCollection) -> String {
    // SAFETY: as in `metadata`.
    let collection = unsafe { &*tables.as_ptr() };
    String::from_utf8_lossy(&copy(collection.time_units, collection.time_units_length))
        .into_owned()
}

pub fn metadata_schema(tables: &tskit::TableCollection, table: MetadataTable) -> String {
    // SAFETY: as in `metadata`.
    let collection = unsafe { &*tables.as_ptr() };
    let (data, length) = match table {
        MetadataTable::TreeSequence => (
            collection.metadata_schema,
            collection.metadata_schema_length,
        ),
        MetadataTable::Individuals => (
            collection.individuals.metadata_schema,
            collection.individuals.metadata_schema_length,
        ),
        MetadataTable::Nodes => (
            collection.nodes.metadata_schema,
            collection.nodes.metadata_schema_length,
        ),
        MetadataTable::Populations => (
            collection.populations.metadata_schema,
            collection.populations.metadata_schema_length,
        ),
        MetadataTable::Mutations => (
            collection.mutations.metadata_schema,
            collection.mutations.metadata_schema_length,
        ),
    };
    String::from_utf8_lossy(&copy(data, length)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemas_and_metadata_are_stored() {
        let mut tables = tskit::TableCollection::new(1.0).unwrap();
        assert!(metadata(&tables).is_empty());
        assert_eq!(metadata_schema(&tables, MetadataTable::Mutations), "");

        set_metadata(&mut tables, b"{\"SLiM\": {}}").unwrap();
        set_time_units(&mut tables, "ticks").unwrap();
        set_metadata_schema(&mut tables, MetadataTable::Mutations, "{\"codec\": \"struct\"}")
            .unwrap();

        assert_eq!(metadata(&tables), b"{\"SLiM\": {}}".to_vec());
        assert_eq!(time_units(&tables), "ticks");
        assert_eq!(
            metadata_schema(&tables, MetadataTable::Mutations),
            "{\"codec\": \"struct\"}"
        );
        assert_eq!(metadata_schema(&tables, MetadataTable::Nodes), "");
    }
}
