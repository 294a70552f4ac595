use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use pseudocode::config::Config;
use pseudocode::io::{StdinInput, StdoutOutput};
use pseudocode::runner::{self, RunOptions};

const USAGE: &str = "usage: pseudocode [--check] [--config FILE] [-v] [FILE]";

struct Args {
    check_only: bool,
    config_path: Option<PathBuf>,
    verbosity: u8,
    input_path: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        check_only: false,
        config_path: None,
        verbosity: 0,
        input_path: None,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--check" => parsed.check_only = true,
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("Missing config path after {arg}"))?;
                parsed.config_path = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            flag if flag.starts_with("-v") && flag[1..].chars().all(|c| c == 'v') => {
                parsed.verbosity = parsed.verbosity.saturating_add((flag.len() - 1) as u8);
            }
            flag if flag.starts_with('-') && flag != "-" => {
                bail!("Unknown option '{flag}'\n{USAGE}");
            }
            _ => {
                if parsed.input_path.is_some() {
                    bail!("Only one input file is supported");
                }
                parsed.input_path = Some(arg);
            }
        }
    }
    Ok(parsed)
}

fn directive_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "pseudocode=warn",
        1 => "pseudocode=debug",
        _ => "pseudocode=trace",
    }
}

fn read_source(input_path: Option<&str>) -> Result<String> {
    match input_path {
        Some(path) if path != "-" => {
            fs::read_to_string(path).with_context(|| format!("Reading {path}"))
        }
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Reading stdin")?;
            Ok(buffer)
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = parse_args()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(args.verbosity))),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let source = read_source(args.input_path.as_deref())?;

    if args.check_only {
        let compiled = runner::compile(&source);
        for error in &compiled.errors {
            println!("{error}");
        }
        return Ok(if compiled.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let mut input = StdinInput::new(config.echo_prompts);
    let mut output = StdoutOutput;
    let options = RunOptions {
        config,
        cancellation: None,
    };
    let report = runner::run_with_options(&source, &mut input, &mut output, &options);
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
