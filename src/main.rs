//! energy-schedules entry point: CLI wiring and config-driven library construction.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use energy_schedules::cli::{self, CliOptions, Command};
use energy_schedules::config::LibraryConfig;
use energy_schedules::error::Result;
use energy_schedules::library::ScheduleLibrary;
use energy_schedules::schedule::Schedule;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn load_config(path: Option<&Path>) -> LibraryConfig {
    let config = match path {
        Some(path) => match LibraryConfig::from_toml_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        None => LibraryConfig::default(),
    };

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

fn read_schedule(input: &Path, library: &ScheduleLibrary) -> Result<(Schedule, bool)> {
    let text = fs::read_to_string(input)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    let abridged = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|t| t.ends_with("Abridged"));
    let schedule = Schedule::from_value(&value, library.type_limits())?;
    info!(schedule = schedule.identifier(), path = %input.display(), "schedule loaded");
    Ok((schedule, abridged))
}

fn validate(input: &Path, library: &ScheduleLibrary) -> Result<String> {
    let (schedule, abridged) = read_schedule(input, library)?;
    let value = schedule.to_value(abridged)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

fn to_idf(input: &Path, folder: &Path, compact: bool, library: &ScheduleLibrary) -> Result<String> {
    let (schedule, _) = read_schedule(input, library)?;
    let mut objects: Vec<String> = Vec::new();
    if let Some(limit) = schedule.as_yearly().schedule_type_limit() {
        objects.push(limit.to_idf());
    }
    match &schedule {
        Schedule::FixedInterval(s) if compact => objects.push(s.to_idf_compact()?),
        Schedule::FixedInterval(s) => objects.push(s.to_idf(folder, false)?),
        Schedule::Ruleset(s) => {
            debug!(schedule = s.identifier(), "writing day schedules of ruleset");
            let limit = s.schedule_type_limit().map(|l| &**l);
            for day in s.day_schedules() {
                objects.push(day.to_idf(limit));
            }
        }
    }
    Ok(objects.join("\n\n"))
}

fn run(opts: &CliOptions, config: &LibraryConfig, library: &ScheduleLibrary) -> Result<String> {
    match &opts.command {
        Command::Validate { input } => validate(input, library),
        Command::ToIdf {
            input,
            folder,
            compact,
        } => {
            let folder: PathBuf = folder.clone().unwrap_or_else(|| config.schedule_directory.clone());
            to_idf(input, &folder, *compact, library)
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(2);
        }
    };

    let config = load_config(opts.config.as_deref());
    let library = match ScheduleLibrary::from_config(&config) {
        Ok(lib) => lib,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    match run(&opts, &config, &library) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
