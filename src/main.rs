use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use circuit_core::{
    build, format_trace, parse_circuit, sort_connections, EvalMode, PropagationEngine,
};

/// Evaluate a declarative arithmetic circuit from a description file.
///
/// For each value in the VALUES section one tick runs; the result is printed
/// when the circuit is fully computable and nothing is printed otherwise.
#[derive(Parser)]
#[command(name = "circuit", version)]
struct Cli {
    /// Circuit description file; stdin when omitted
    file: Option<PathBuf>,

    /// Reorder connections producer-before-consumer before building,
    /// for descriptions that do not list them in dependency order
    #[arg(long)]
    sort_connections: bool,

    /// Evaluate max/min/mul with proper fold identities instead of the
    /// legacy zero-seeded accumulators
    #[arg(long)]
    corrected: bool,

    /// Emit one JSON object per tick instead of plain result values
    #[arg(long)]
    json: bool,

    /// Dump the circuit tree and slot state to stderr after the run
    #[arg(long)]
    trace: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let text = match read_input(cli.file.as_deref()) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("error reading input: {err}");
            process::exit(1);
        }
    };

    if let Err(err) = run(&cli, &text) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn read_input(path: Option<&std::path::Path>) -> std::io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn run(cli: &Cli, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let desc = parse_circuit(text)?;

    let connections = if cli.sort_connections {
        sort_connections(&desc.connections)?
    } else {
        desc.connections.clone()
    };

    let mode = if cli.corrected { EvalMode::Corrected } else { EvalMode::Legacy };
    let mut engine = PropagationEngine::with_mode(build(&desc.units, &connections)?, mode);

    for (tick, assignment) in desc.values.iter().enumerate() {
        let result = engine.tick(&assignment.target, assignment.value);
        if cli.json {
            println!(
                "{}",
                serde_json::json!({
                    "tick": tick,
                    "port": assignment.target.port,
                    "value": assignment.value,
                    "result": result,
                })
            );
        } else if let Some(value) = result {
            println!("{value}");
        }
    }

    if cli.trace {
        eprint!("{}", format_trace(engine.graph()));
    }
    Ok(())
}
