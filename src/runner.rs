use anyhow::Result;

use indicatif::{ProgressBar, ProgressStyle};

use crate::args::{Args, Scenario};
use crate::config::{Parameters, Paths, Settings};
use crate::core::allele_frequencies;
use crate::readwrite::{FrequencyReport, GenealogicalRecord, write_genotypes_to_file};
use crate::toolchain::{BurnIn, SlimRun};
use crate::verify::{FrequencyMatch, single_frequency, verify_frequencies};

const STAGES: [&str; 4] = ["burn-in", "annotate", "slim", "verify"];

pub struct Runner {
    args: Args,
    settings: Settings,
    parameters: Parameters,
    paths: Paths,
}

impl Runner {
    pub fn new(args: Args) -> Result<Runner> {
        Self::setup_logger(&args);
        Self::configure(args)
    }

    /// Resolve settings, parameters and paths without installing a logger.
    pub fn configure(args: Args) -> Result<Runner> {
        let settings = Self::load_settings(args.settings.as_deref())?;
        let parameters = Parameters::from_args(&args);
        let paths = Paths::from_args(&args);
        log::info!("Parameters: {:?}", parameters);
        log::info!("Paths: {:?}", paths);

        Ok(Self {
            args,
            settings,
            parameters,
            paths,
        })
    }

    /// Run burn-in, hand-off, SLiM and verification in order.
    pub fn start(&self) -> Result<FrequencyMatch> {
        let bar = self.create_progress_bar();
        let advance = |stage: usize| {
            if let Some(bar) = bar.as_ref() {
                bar.set_position(stage as u64);
                if let Some(name) = STAGES.get(stage) {
                    bar.set_message(*name);
                }
            }
        };

        advance(0);
        let record = self.burn_in()?;
        advance(1);
        self.hand_off(record)?;
        advance(2);
        self.simulate()?;
        advance(3);
        let result = self.verify()?;

        if let Some(bar) = bar {
            bar.finish_with_message("Done.");
        }
        println!(
            "{} {} {}",
            result.recomputed,
            result.reported,
            result.recomputed == result.reported
        );
        Ok(result)
    }

    /// Setup logging level and file
    fn setup_logger(args: &Args) {
        let log_level = match args.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        simple_logging::log_to_file(args.log_file.as_str(), log_level).unwrap_or_else(|_| {
            eprintln!("Unable to open log file.");
            std::process::exit(1);
        });
    }

    /// Load settings from file, or use defaults
    fn load_settings(path: Option<&str>) -> Result<Settings> {
        let settings = match path {
            Some(path) => Settings::read_from_file(path)?,
            None => Settings::default(),
        };
        log::info!("Loaded settings\n{}", settings);
        Ok(settings)
    }

    fn create_progress_bar(&self) -> Option<ProgressBar> {
        if self.args.disable_progress_bar {
            return None;
        }
        let bar = ProgressBar::new(STAGES.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40}] {pos:>2}/{len:2} [{elapsed_precise}] {msg}")
                .expect("Unable to create template.")
                .progress_chars("=> "),
        );
        Some(bar)
    }

    fn burn_in(&self) -> Result<GenealogicalRecord> {
        log::info!("Generating burn-in...");
        let record =
            BurnIn::new(&self.settings.burnin, &self.parameters, &self.paths).run()?;

        if let Scenario::Biallelic { .. } = self.args.scenario {
            let frequencies = record.allele_frequencies()?;
            let frequency = single_frequency(frequencies.iter().copied(), "burn-in")?;
            println!("{}", frequency);
        }
        Ok(record)
    }

    /// Annotate and rewrite the burn-in mutations and store the result for SLiM.
    fn hand_off(&self, mut record: GenealogicalRecord) -> Result<()> {
        let annotation = record.annotate_tables(self.settings.model_type, self.settings.tick)?;
        log::info!("Annotated {}", annotation);
        record.rewrite_mutations()?;
        println!("{}", record);
        record.dump(&self.paths.trees)?;
        log::info!("Wrote burn-in to {}", self.paths.trees);
        Ok(())
    }

    fn simulate(&self) -> Result<()> {
        for run in SlimRun::for_scenario(&self.args.scenario, &self.parameters, &self.paths) {
            log::info!("Running SLiM on {}...", run.script);
            run.run(&self.settings.slim)?;
        }
        Ok(())
    }

    fn verify(&self) -> Result<FrequencyMatch> {
        log::info!("Checking frequencies...");
        let record = GenealogicalRecord::load(&self.paths.trees)?;
        let genotypes = record.genotype_matrix()?;
        if let Some(path) = &self.paths.genotypes {
            write_genotypes_to_file(&genotypes, path)?;
        }
        let recomputed = allele_frequencies(&genotypes)?;
        let report = FrequencyReport::read(&self.paths.frequency, &self.settings.frequency_column)?;
        let result = verify_frequencies(
            recomputed.iter().copied(),
            report.values,
            self.settings.tolerance,
        )?;
        Ok(result)
    }
}
