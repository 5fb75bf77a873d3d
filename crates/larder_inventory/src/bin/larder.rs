//! Larder CLI entry point.
//!
//! Runs the inventory rules over the sample catalogue and prints every
//! notification as it is emitted, or logs it with `--log-notifications`.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use larder_engine::{EngineConfig, HaltReason, LogSink, Notification, RunOutcome};
use larder_inventory::{export, sample_engine};
use tracing_subscriber::EnvFilter;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    show_help: bool,
    show_version: bool,
    strict: bool,
    log_notifications: bool,
    max_iterations: Option<usize>,
    dump_facts: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--strict" => config.strict = true,
            "--log-notifications" => config.log_notifications = true,
            "--max-iterations" => {
                i += 1;
                if i >= args.len() {
                    return Err("--max-iterations requires a value".into());
                }
                config.max_iterations = Some(
                    args[i]
                        .parse()
                        .map_err(|_| format!("invalid --max-iterations value: {}", args[i]))?,
                );
            }
            "--dump-facts" => {
                i += 1;
                if i >= args.len() {
                    return Err("--dump-facts requires a path".into());
                }
                config.dump_facts = Some(PathBuf::from(&args[i]));
            }
            arg => return Err(format!("unknown option: {arg}").into()),
        }
        i += 1;
    }

    Ok(config)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Vec<String>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }

    if config.show_version {
        println!("larder {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    init_tracing();

    let mut engine_config = if config.strict {
        EngineConfig::strict()
    } else {
        EngineConfig::new()
    };
    if let Some(max) = config.max_iterations {
        engine_config = engine_config.with_max_iterations(max);
    }

    let mut engine = sample_engine(engine_config)?;
    let result = if config.log_notifications {
        engine.run(&mut LogSink)
    } else {
        let mut print = |n: &Notification| println!("{n}");
        engine.run(&mut print)
    };

    if let Some(path) = &config.dump_facts {
        export::save_to_file(&result.facts.snapshot(), path)?;
        eprintln!("Wrote {} facts to {}", result.facts.len(), path.display());
    }

    println!();
    println!("\x1b[1;36m=== Outcome ===\x1b[0m");
    println!("Firings: {}", result.iterations);
    println!("Facts remaining: {}", result.facts.len());

    match result.outcome {
        RunOutcome::Converged => {
            println!("Converged");
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Halted(HaltReason::NonTermination { limit }) => {
            println!("Halted: no convergence within {limit} iterations");
            Ok(ExitCode::from(2))
        }
        RunOutcome::Halted(HaltReason::Cancelled) => {
            println!("Halted: cancelled");
            Ok(ExitCode::from(2))
        }
        RunOutcome::Halted(HaltReason::ActionFailed { rule, error }) => {
            println!("Halted: rule {rule} failed: {error}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_help() {
    println!(
        "\x1b[1mLarder\x1b[0m - Inventory expert system

\x1b[1mUSAGE:\x1b[0m
    larder [OPTIONS]

Runs the inventory rules over the sample catalogue and prints each
notification, then the run outcome.

\x1b[1mOPTIONS:\x1b[0m
    -h, --help             Print help information
    -V, --version          Print version information
    --strict               Reject duplicate fact content
    --log-notifications    Emit notifications as log events (target larder::notify)
    --max-iterations N     Halt after N firings
    --dump-facts PATH      Write the final fact set as MessagePack

\x1b[1mENVIRONMENT:\x1b[0m
    RUST_LOG               Log filter (default: info)"
    );
}
