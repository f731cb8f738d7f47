use std::io::Read;

use crate::errors::{Result, SlimcheckError};

/// Frequency column of the report SLiM writes at the end of a run.
///
/// The first column of the report is a row index and is never matched against `column`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyReport {
    pub column: String,
    pub values: Vec<f64>,
}

impl FrequencyReport {
    pub fn read(path: &str, column: &str) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, column, path)
    }

    /// Read from any csv source, `origin` names the source in errors.
    pub fn from_reader(reader: impl Read, column: &str, origin: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let position = reader
            .headers()?
            .iter()
            .skip(1)
            .position(|header| header == column)
            .map(|position| position + 1)
            .ok_or_else(|| SlimcheckError::MissingColumn {
                path: origin.to_string(),
                column: column.to_string(),
            })?;

        let mut values = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let field = record.get(position).unwrap_or_default();
            let value = field.parse::<f64>().map_err(|_| {
                SlimcheckError::ParseError(format!(
                    "invalid {} '{}' in row {} of {}",
                    column, field, line, origin
                ))
            })?;
            values.push(value);
        }

        log::debug!("Read {} value(s) of {} from {}", values.len(), column, origin);
        Ok(Self {
            column: column.to_string(),
            values,
        })
    }
}
