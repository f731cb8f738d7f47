use clap::Parser;
use slimcheck::args::Args;
use slimcheck::runner::Runner;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let runner = Runner::new(args)?;
    runner.start().map_err(|error| {
        log::error!("{}", error);
        error
    })?;
    Ok(())
}
