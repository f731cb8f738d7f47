//! Blocking calls into the external simulation toolchain.

pub mod burnin;
pub mod slim;

pub use burnin::{BurnIn, Placeholders};
pub use slim::{Definition, EidosValue, SlimRun};

use itertools::Itertools;
use std::process::Command;

use crate::errors::{Result, SlimcheckError};

/// Run `program` with `args` until it exits. Output is passed through to the terminal.
pub fn run_command(program: &str, args: &[String]) -> Result<()> {
    log::info!("Running: {} {}", program, args.iter().join(" "));
    let status = Command::new(program).args(args).status().map_err(|error| {
        log::error!("Unable to start {}: {}", program, error);
        SlimcheckError::IoError(error)
    })?;
    if !status.success() {
        return Err(SlimcheckError::ProcessFailed {
            program: program.to_string(),
            status: status.to_string(),
        });
    }
    log::debug!("{} finished with {}", program, status);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn successful_command() {
        assert!(run_command("true", &[]).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_reported() {
        match run_command("false", &[]) {
            Err(SlimcheckError::ProcessFailed { program, .. }) => assert_eq!(program, "false"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn missing_program() {
        let result = run_command("slimcheck-no-such-program", &["-d".to_string()]);
        assert!(matches!(result, Err(SlimcheckError::IoError(_))));
    }
}
