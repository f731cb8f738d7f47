//! Configuration data structures for simulation setups.

mod parameters;
mod settings;

pub use parameters::{Parameters, Paths};
pub use settings::{CommandSpec, Settings, SettingsError, SlimSettings};
