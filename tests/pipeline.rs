use serial_test::serial;
use std::path::PathBuf;

use slimcheck::config::{Parameters, Paths, Settings, SlimSettings};
use slimcheck::core::ModelType;
use slimcheck::errors::SlimcheckError;
use slimcheck::readwrite::{FrequencyReport, GenealogicalRecord};
use slimcheck::toolchain::{BurnIn, SlimRun};
use slimcheck::verify::verify_frequencies;

fn temp_path(name: &str) -> String {
    let path: PathBuf = std::env::temp_dir().join(name);
    path.to_str().unwrap().to_string()
}

fn parameters(seed: u64) -> Parameters {
    Parameters {
        seed,
        num_individuals: 50,
        seq_length: 1,
        mu: 1e-2,
        num_generations: 10,
    }
}

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

/// Two samples carry a derived allele out of six.
fn burnin_tables() -> tskit::TableCollection {
    let mut tables = tskit::TableCollection::new(1.0).unwrap();
    let samples: Vec<tskit::NodeId> = (0..6).map(|_| add_node(&mut tables, true, 0.)).collect();
    let inner = add_node(&mut tables, false, 1.);
    let root = add_node(&mut tables, false, 3.);
    tables.add_edge(0., 1., inner, samples[0]).unwrap();
    tables.add_edge(0., 1., inner, samples[1]).unwrap();
    tables.add_edge(0., 1., root, inner).unwrap();
    for &sample in &samples[2..] {
        tables.add_edge(0., 1., root, sample).unwrap();
    }
    let site = tables.add_site(0.5, Some(b"0".as_slice())).unwrap();
    let forward = tables
        .add_mutation(site, inner, tskit::MutationId::NULL, 2., Some(b"1".as_slice()))
        .unwrap();
    tables
        .add_mutation(site, samples[0], forward, 0.5, Some(b"0".as_slice()))
        .unwrap();
    tables
        .add_mutation(site, samples[4], tskit::MutationId::NULL, 0.5, Some(b"1".as_slice()))
        .unwrap();
    tables
        .full_sort(tskit::TableSortOptions::default())
        .unwrap();
    tables.build_index().unwrap();
    tables
}

#[test]
#[serial]
fn hand_off_and_verify() {
    let trees = temp_path("slimcheck_hand_off.trees");
    let report = temp_path("slimcheck_hand_off.csv");

    let burnin = GenealogicalRecord::from_tables(burnin_tables());
    let frequencies = burnin.allele_frequencies().unwrap();
    assert_eq!(frequencies.to_vec(), vec![2. / 6.]);

    let mut record = GenealogicalRecord::from_tables(burnin_tables());
    let annotation = record
        .annotate_tables(ModelType::WrightFisher, 1)
        .unwrap();
    assert_eq!(annotation.mutations, 3);
    record.rewrite_mutations().unwrap();
    record.dump(&trees).unwrap();

    let loaded = GenealogicalRecord::load(&trees).unwrap();
    assert!(loaded.tree_sequence_metadata().unwrap().is_some());
    let states: Vec<String> = loaded
        .mutation_entries()
        .unwrap()
        .into_iter()
        .map(|entry| entry.derived_state)
        .collect();
    assert_eq!(states.len(), 3);
    assert_eq!(states.iter().filter(|state| state.is_empty()).count(), 1);
    assert_eq!(states.iter().filter(|state| *state == "0").count(), 2);

    std::fs::write(&report, format!(",freq_mean\n0,{}\n", 2. / 6.)).unwrap();
    let reported = FrequencyReport::read(&report, "freq_mean").unwrap();
    let result = verify_frequencies(frequencies.iter().copied(), reported.values, 0.).unwrap();
    assert_eq!(result.recomputed, result.reported);

    std::fs::remove_file(&trees).unwrap();
    std::fs::remove_file(&report).unwrap();
}

#[test]
#[serial]
fn empty_report_is_no_data() {
    let report = temp_path("slimcheck_empty_report.csv");
    std::fs::write(&report, ",freq_mean\n").unwrap();
    let reported = FrequencyReport::read(&report, "freq_mean").unwrap();
    let result = verify_frequencies([0.5], reported.values, 0.);
    assert!(matches!(result, Err(SlimcheckError::NoData(_))));
    std::fs::remove_file(&report).unwrap();
}

/// Stand-in for SLiM that writes a fixed report to the `freqFile` definition.
#[cfg(unix)]
#[test]
#[serial]
fn definitions_reach_the_simulator() {
    let report = temp_path("slimcheck_fake_slim.csv");
    let paths = Paths {
        trees: temp_path("slimcheck_fake_slim.trees"),
        frequency: report.clone(),
        genotypes: None,
    };
    let script = r#"
for arg in "$@"; do
  case "$arg" in
    freqFile=*) out=$(printf '%s' "${arg#freqFile=}" | tr -d "'") ;;
  esac
done
printf ',freq_mean\n0,0.125\n' > "$out"
"#;
    let settings = SlimSettings {
        launcher: vec!["sh".into(), "-c".into(), script.into(), "fake-slim".into()],
        executable: "slim".into(),
    };

    SlimRun::biallelic(&parameters(1), &paths, "biallelic.slim")
        .run(&settings)
        .unwrap();

    let reported = FrequencyReport::read(&report, "freq_mean").unwrap();
    assert_eq!(reported.values, vec![0.125]);
    std::fs::remove_file(&report).unwrap();
}

#[cfg(unix)]
#[test]
fn failing_simulator_is_an_error() {
    let paths = Paths {
        trees: "unused.trees".into(),
        frequency: "unused.csv".into(),
        genotypes: None,
    };
    let settings = SlimSettings {
        launcher: vec!["sh".into(), "-c".into(), "exit 3".into()],
        executable: "slim".into(),
    };
    let result = SlimRun::biallelic(&parameters(1), &paths, "biallelic.slim").run(&settings);
    assert!(matches!(result, Err(SlimcheckError::ProcessFailed { .. })));
}

/// Needs `msp` on the path.
#[test]
#[ignore]
#[serial]
fn burnin_is_deterministic() {
    let settings = Settings::default();
    let genealogies: Vec<_> = ["a", "b"]
        .iter()
        .map(|run| {
            let paths = Paths {
                trees: temp_path(&format!("slimcheck_determinism_{run}.trees")),
                frequency: temp_path("unused.csv"),
                genotypes: None,
            };
            let record = BurnIn::new(&settings.burnin, &parameters(973), &paths)
                .run()
                .unwrap();
            let result = (
                record.num_mutations(),
                record.mutation_entries().unwrap(),
                record.genotype_matrix().unwrap(),
            );
            std::fs::remove_file(&paths.trees).unwrap();
            std::fs::remove_file(paths.raw_trees()).unwrap();
            result
        })
        .collect();
    assert_eq!(genealogies[0], genealogies[1]);
}
