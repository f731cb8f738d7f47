//! Neutral burn-in produced by the configured coalescent toolchain.

use crate::config::{CommandSpec, Parameters, Paths};
use crate::errors::{Result, SlimcheckError};
use crate::readwrite::GenealogicalRecord;

use super::run_command;

/// Values substituted for `{name}` in burn-in command arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholders {
    values: Vec<(&'static str, String)>,
}

impl Placeholders {
    pub fn new(parameters: &Parameters, paths: &Paths) -> Self {
        Self {
            values: vec![
                ("seed", parameters.seed.to_string()),
                ("num_individuals", parameters.num_individuals.to_string()),
                ("seq_length", parameters.seq_length.to_string()),
                ("mu", parameters.mu.to_string()),
                ("raw_path", paths.raw_trees()),
                ("out_path", paths.trees.clone()),
            ],
        }
    }

    pub fn render(&self, arg: &str) -> String {
        self.values
            .iter()
            .fold(arg.to_string(), |arg, (name, value)| {
                arg.replace(&format!("{{{name}}}"), value)
            })
    }
}

/// Neutral burn-in with a binary mutation model.
pub struct BurnIn<'a> {
    steps: &'a [CommandSpec],
    placeholders: Placeholders,
    output: String,
}

impl<'a> BurnIn<'a> {
    pub fn new(steps: &'a [CommandSpec], parameters: &Parameters, paths: &Paths) -> Self {
        Self {
            steps,
            placeholders: Placeholders::new(parameters, paths),
            output: paths.trees.clone(),
        }
    }

    /// Rendered program and arguments of every step.
    pub fn commands(&self) -> Vec<(String, Vec<String>)> {
        self.steps
            .iter()
            .map(|step| {
                (
                    self.placeholders.render(&step.program),
                    step.args
                        .iter()
                        .map(|arg| self.placeholders.render(arg))
                        .collect(),
                )
            })
            .collect()
    }

    /// Run all steps and load the resulting record.
    ///
    /// A burn-in needs at least two mutations to be handed over.
    pub fn run(&self) -> Result<GenealogicalRecord> {
        for (program, args) in self.commands() {
            run_command(&program, &args)?;
        }
        let record = GenealogicalRecord::load(&self.output)?;
        check_mutations(&record)?;
        log::info!("Burn-in: {}", record);
        Ok(record)
    }
}

pub fn check_mutations(record: &GenealogicalRecord) -> Result<()> {
    let found = record.num_mutations();
    if found > 1 {
        Ok(())
    } else {
        log::error!("No mutations in tree sequence.");
        Err(SlimcheckError::TooFewMutations { found })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readwrite::binary_burnin;

    fn parameters() -> Parameters {
        Parameters {
            seed: 42,
            num_individuals: 100,
            seq_length: 1,
            mu: 1e-2,
            num_generations: 10,
        }
    }

    fn paths() -> Paths {
        Paths {
            trees: "run_burnin.trees".to_string(),
            frequency: "run_freq.csv".to_string(),
            genotypes: None,
        }
    }

    #[test]
    fn render_placeholders() {
        let placeholders = Placeholders::new(&parameters(), &paths());
        assert_eq!(placeholders.render("{seed}"), "42");
        assert_eq!(placeholders.render("--mu={mu}"), "--mu=0.01");
        assert_eq!(placeholders.render("{raw_path}"), "run_burnin.trees.raw");
        assert_eq!(placeholders.render("{unknown}"), "{unknown}");
    }

    #[test]
    fn default_commands() {
        let steps = crate::config::Settings::default().burnin;
        let burnin = BurnIn::new(&steps, &parameters(), &paths());
        let commands = burnin.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].0, "msp");
        assert_eq!(
            commands[0].1,
            vec![
                "ancestry",
                "--random-seed",
                "42",
                "--sequence-length",
                "1",
                "--population-size",
                "100",
                "100",
                "run_burnin.trees.raw"
            ]
        );
        assert_eq!(commands[1].1.last().unwrap(), "run_burnin.trees");
    }

    #[test]
    fn too_few_mutations() {
        let mut tables = binary_burnin();
        tables
            .set_mutations(&tskit::MutationTable::default())
            .unwrap();
        let record = GenealogicalRecord::from_tables(tables);
        assert!(matches!(
            check_mutations(&record),
            Err(SlimcheckError::TooFewMutations { found: 0 })
        ));
        let record = GenealogicalRecord::from_tables(binary_burnin());
        assert!(check_mutations(&record).is_ok());
    }
}
