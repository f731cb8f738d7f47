//! Settings module.

use serde::{Deserialize, Serialize};
use std::fs;

use crate::core::ModelType;

/// Toolchain settings: how external programs are called and how results are compared.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    /// Commands that produce the neutral burn-in, run in order.
    #[serde(default = "default_burnin")]
    pub burnin: Vec<CommandSpec>,

    /// How to launch SLiM.
    #[serde(default)]
    pub slim: SlimSettings,

    /// Absolute tolerance when comparing frequencies, zero demands exact equality.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Name of the column holding the mean frequency in the SLiM report.
    #[serde(default = "default_frequency_column")]
    pub frequency_column: String,

    /// SLiM tick at which the burn-in is handed over.
    #[serde(default = "default_tick")]
    pub tick: i32,

    /// Model type written to the SLiM metadata of the burn-in.
    #[serde(default)]
    pub model_type: ModelType,
}

/// A single external command. Arguments may contain placeholders such as `{seed}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SlimSettings {
    /// Wrapper prepended to the SLiM call, e.g. `[mamba, run, -n, env]`.
    #[serde(default)]
    pub launcher: Vec<String>,
    #[serde(default = "default_slim_executable")]
    pub executable: String,
}

fn default_burnin() -> Vec<CommandSpec> {
    vec![
        CommandSpec::new(
            "msp",
            &[
                "ancestry",
                "--random-seed",
                "{seed}",
                "--sequence-length",
                "{seq_length}",
                "--population-size",
                "{num_individuals}",
                "{num_individuals}",
                "{raw_path}",
            ],
        ),
        CommandSpec::new(
            "msp",
            &[
                "mutations",
                "--random-seed",
                "{seed}",
                "--model",
                "binary",
                "{mu}",
                "{raw_path}",
                "{out_path}",
            ],
        ),
    ]
}

fn default_tolerance() -> f64 {
    1e-9
}

fn default_frequency_column() -> String {
    "freq_mean".to_string()
}

fn default_tick() -> i32 {
    1
}

fn default_slim_executable() -> String {
    "slim".to_string()
}

impl CommandSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }
}

impl Default for SlimSettings {
    fn default() -> Self {
        Self {
            launcher: Vec::new(),
            executable: default_slim_executable(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            burnin: default_burnin(),
            slim: SlimSettings::default(),
            tolerance: default_tolerance(),
            frequency_column: default_frequency_column(),
            tick: default_tick(),
            model_type: ModelType::default(),
        }
    }
}

#[derive(Debug)]
pub enum SettingsError {
    IoError(std::io::Error),
    YamlError(serde_yaml::Error),
}

impl std::error::Error for SettingsError {}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::IoError(error) => write!(formatter, "IO error: {}", error),
            SettingsError::YamlError(error) => write!(formatter, "YAML error: {}", error),
        }
    }
}

impl std::fmt::Display for Settings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = vec![];
        self.write(&mut output).map_err(|_| std::fmt::Error)?;
        write!(
            formatter,
            "{}",
            String::from_utf8(output).map_err(|_| std::fmt::Error)?
        )
    }
}

impl Settings {
    pub fn write(&self, writer: &mut dyn std::io::Write) -> Result<(), SettingsError> {
        serde_yaml::to_writer(writer, self).map_err(SettingsError::YamlError)
    }

    pub fn read(reader: &mut dyn std::io::Read) -> Result<Settings, SettingsError> {
        serde_yaml::from_reader(reader).map_err(SettingsError::YamlError)
    }

    pub fn write_to_file(&self, filename: &str) -> Result<(), SettingsError> {
        let file = fs::File::create(filename).map_err(SettingsError::IoError)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write(&mut writer)
    }

    pub fn read_from_file(filename: &str) -> Result<Settings, SettingsError> {
        let file = fs::File::open(filename).map_err(SettingsError::IoError)?;
        let mut reader = std::io::BufReader::new(file);
        Self::read(&mut reader)
    }
}
