//! SLiM invocation with `-d name=value` definitions.

use std::fmt;

use crate::args::Scenario;
use crate::config::{Parameters, Paths, SlimSettings};
use crate::errors::Result;

use super::run_command;

/// Literal of SLiM's scripting language Eidos.
#[derive(Debug, Clone, PartialEq)]
pub enum EidosValue {
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for EidosValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EidosValue::Integer(value) => write!(f, "{}", value),
            // debug formatting keeps the decimal point, so `5.0` stays a float in Eidos
            EidosValue::Float(value) => write!(f, "{:?}", value),
            EidosValue::String(value) => write!(f, "'{}'", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: &'static str,
    pub value: EidosValue,
}

impl Definition {
    fn integer(name: &'static str, value: usize) -> Self {
        Self {
            name,
            value: EidosValue::Integer(value as i64),
        }
    }

    fn float(name: &'static str, value: f64) -> Self {
        Self {
            name,
            value: EidosValue::Float(value),
        }
    }

    fn string(name: &'static str, value: &str) -> Self {
        Self {
            name,
            value: EidosValue::String(value.to_string()),
        }
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// One call of SLiM on a script.
#[derive(Debug, Clone, PartialEq)]
pub struct SlimRun {
    pub definitions: Vec<Definition>,
    pub script: String,
}

impl SlimRun {
    /// Check that the burn-in mutations carry the expected mutation type.
    pub fn id_check(parameters: &Parameters, paths: &Paths, script: &str) -> Self {
        Self {
            definitions: vec![
                Definition::integer("sequenceLength", parameters.seq_length),
                Definition::integer("numIndividuals", parameters.num_individuals),
                Definition::string("inTreeSequence", &paths.trees),
            ],
            script: script.to_string(),
        }
    }

    pub fn biallelic(parameters: &Parameters, paths: &Paths, script: &str) -> Self {
        Self {
            definitions: vec![
                Definition::integer("sequenceLength", parameters.seq_length),
                Definition::integer("numIndividuals", parameters.num_individuals),
                Definition::float("mu", parameters.mu),
                Definition::integer("numTicks", parameters.num_generations),
                Definition::string("inTreeSequence", &paths.trees),
                Definition::string("outTreeSequence", &paths.trees),
                Definition::string("freqFile", &paths.frequency),
            ],
            script: script.to_string(),
        }
    }

    pub fn stabilizing(
        parameters: &Parameters,
        paths: &Paths,
        script: &str,
        vs: f64,
        eff_setting: &str,
        eff_var: f64,
        eff_const: f64,
    ) -> Self {
        let mut run = Self::biallelic(parameters, paths, script);
        run.definitions.extend([
            Definition::float("Vs", vs),
            Definition::string("effectSizes_setting", eff_setting),
            Definition::float("effectVar", eff_var),
            Definition::float("alpha", eff_const),
            // seeds above i64::MAX are rejected at intake
            Definition {
                name: "SEED",
                value: EidosValue::Integer(parameters.seed as i64),
            },
        ]);
        run
    }

    /// All SLiM runs of a scenario in execution order.
    pub fn for_scenario(scenario: &Scenario, parameters: &Parameters, paths: &Paths) -> Vec<Self> {
        match scenario {
            Scenario::Biallelic {
                biallelic_path,
                id_check_path,
            } => id_check_path
                .iter()
                .map(|script| Self::id_check(parameters, paths, script))
                .chain([Self::biallelic(parameters, paths, biallelic_path)])
                .collect(),
            Scenario::Stabilizing {
                src_path,
                vs,
                eff_setting,
                eff_var,
                eff_const,
            } => vec![Self::stabilizing(
                parameters,
                paths,
                src_path,
                *vs,
                eff_setting,
                *eff_var,
                *eff_const,
            )],
        }
    }

    /// Program and arguments, `launcher... executable -d name=value... script`.
    pub fn command_line(&self, settings: &SlimSettings) -> (String, Vec<String>) {
        let mut words: Vec<String> = settings.launcher.clone();
        words.push(settings.executable.clone());
        for definition in &self.definitions {
            words.push("-d".to_string());
            words.push(definition.to_string());
        }
        words.push(self.script.clone());
        let program = words.remove(0);
        (program, words)
    }

    /// Run SLiM and block until it exits.
    pub fn run(&self, settings: &SlimSettings) -> Result<()> {
        let (program, args) = self.command_line(settings);
        run_command(&program, &args)
    }
}
