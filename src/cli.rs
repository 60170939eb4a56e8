use std::env;
use std::path::PathBuf;

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Parse a schedule dictionary and print it back out.
    Validate { input: PathBuf },
    /// Translate a schedule dictionary into IDF text.
    ToIdf {
        input: PathBuf,
        folder: Option<PathBuf>,
        compact: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub command: Command,
    pub config: Option<PathBuf>,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.is_empty() {
        return Err("no arguments given".to_string());
    }
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut subcommand: Option<String> = None;
    let mut input: Option<PathBuf> = None;
    let mut config = None;
    let mut folder = None;
    let mut compact = false;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--folder" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --folder (expected a directory)")?;
                if folder.replace(PathBuf::from(path)).is_some() {
                    return Err("--folder provided more than once".to_string());
                }
            }
            "--compact" => {
                if compact {
                    return Err("--compact provided more than once".to_string());
                }
                compact = true;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if other.starts_with('-') => return Err(format!("unknown argument: {other}")),
            positional => {
                if subcommand.is_none() {
                    subcommand = Some(positional.to_string());
                } else if input.replace(PathBuf::from(positional)).is_some() {
                    return Err(format!("unexpected extra argument: {positional}"));
                }
            }
        }
        i += 1;
    }

    let subcommand = subcommand.ok_or_else(|| "missing command (validate or to-idf)".to_string())?;
    let input = input.ok_or_else(|| format!("missing input file for `{subcommand}`"))?;
    let command = match subcommand.as_str() {
        "validate" => {
            if folder.is_some() || compact {
                return Err("`validate` does not accept --folder or --compact".to_string());
            }
            Command::Validate { input }
        }
        "to-idf" => {
            if folder.is_some() && compact {
                return Err(
                    "arguments `--folder` and `--compact` are mutually exclusive; compact output writes no CSV"
                        .to_string(),
                );
            }
            Command::ToIdf {
                input,
                folder,
                compact,
            }
        }
        other => return Err(format!("unknown command: {other}")),
    };

    Ok(CliOptions { command, config })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("energy-schedules: check and translate building energy schedules");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  energy-schedules [--config <toml>] validate <schedule.json>");
    eprintln!("  energy-schedules [--config <toml>] to-idf <schedule.json> [--folder <dir> | --compact]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>   Library config with extra type limits (TOML)");
    eprintln!("  --folder <dir>    Directory for Schedule:File CSVs (default from config)");
    eprintln!("  --compact         Emit Schedule:Compact instead of Schedule:File");
    eprintln!("  --help            Show this help message");
    eprintln!();
    eprintln!("Set RUST_LOG=debug for resampling details.");
}
