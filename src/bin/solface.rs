use std::{
    env,
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};

use solface::{generate_interface, resolve_abi_to_json, solidity_codegen::VERSION, InterfaceOptions};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Solidity,
    Json,
}

#[derive(Debug)]
struct CliOptions {
    interface: InterfaceOptions,
    format: OutputFormat,
    pretty: bool,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    version: bool,
}

fn main() -> ExitCode {
    init_tracing();

    match run(env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(args: Vec<String>) -> Result<(), String> {
    let options = parse_options(&args)?;

    if options.version {
        println!("v{VERSION}");
        return Ok(());
    }

    let input = read_input(options.input.as_ref())?;

    let output = match options.format {
        OutputFormat::Solidity => {
            if options.interface.name.is_empty() {
                return Err("--name is required for solidity output".to_string());
            }
            let generated =
                generate_interface(&input, &options.interface).map_err(|e| e.to_string())?;
            for warning in &generated.warnings {
                eprintln!("warning: {warning}");
            }
            generated.source
        }
        OutputFormat::Json => {
            let mut json = resolve_abi_to_json(&input, options.pretty).map_err(|e| e.to_string())?;
            json.push('\n');
            json
        }
    };

    match options.output {
        Some(path) => std::fs::write(&path, output)
            .map_err(|e| format!("failed to write '{}': {e}", path.display())),
        None => {
            print!("{output}");
            Ok(())
        }
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String, String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read ABI '{}': {e}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("failed to read ABI from stdin: {e}"))?;
            Ok(buffer)
        }
    }
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        interface: InterfaceOptions::default(),
        format: OutputFormat::Solidity,
        pretty: false,
        input: None,
        output: None,
        version: false,
    };
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--name" | "-name" => {
                options.interface.name = option_value(args, &mut i)?;
            }
            "--license" | "-license" => {
                options.interface.license = Some(option_value(args, &mut i)?);
            }
            "--pragma" | "-pragma" => {
                options.interface.pragma = Some(option_value(args, &mut i)?);
            }
            "--annotations" | "-annotations" => {
                options.interface.include_annotations = true;
                i += 1;
            }
            "--format" => {
                let value = option_value(args, &mut i)?;
                options.format = match value.as_str() {
                    "solidity" | "sol" => OutputFormat::Solidity,
                    "json" => OutputFormat::Json,
                    other => {
                        return Err(format!(
                            "unsupported format '{other}'; expected solidity|sol|json"
                        ))
                    }
                };
            }
            "--json" => {
                options.format = OutputFormat::Json;
                i += 1;
            }
            "--pretty" => {
                options.pretty = true;
                i += 1;
            }
            "--output" | "-o" => {
                options.output = Some(PathBuf::from(option_value(args, &mut i)?));
            }
            "--version" | "-version" => {
                options.version = true;
                i += 1;
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(format!("unknown option '{other}'"));
            }
            path => {
                if options.input.is_some() {
                    return Err("expected at most one ABI file".to_string());
                }
                if path != "-" {
                    options.input = Some(PathBuf::from(path));
                }
                i += 1;
            }
        }
    }

    Ok(options)
}

fn option_value(args: &[String], i: &mut usize) -> Result<String, String> {
    let flag = &args[*i];
    let value = args
        .get(*i + 1)
        .ok_or_else(|| format!("missing value for {flag}"))?;
    *i += 2;
    Ok(value.clone())
}

fn print_usage() {
    eprintln!("usage:");
    eprintln!(
        "  solface --name <interface name> [--annotations] [--license <SPDX>] \
         [--pragma <constraint>] [<abi.json> | stdin]"
    );
    eprintln!("  solface --format json [--pretty] [<abi.json> | stdin]");
    eprintln!("  solface --version");
    eprintln!();
    eprintln!("options:");
    eprintln!("  --annotations          add interface ID and function selector comments");
    eprintln!("  --license <SPDX>       emit an SPDX-License-Identifier header");
    eprintln!("  --pragma <constraint>  emit a `pragma solidity <constraint>;` line");
    eprintln!(
        "  --format solidity|json output the interface (default) or the resolved ABI as JSON"
    );
    eprintln!("  --output <file>        write output to a file instead of stdout");
    eprintln!();
    eprintln!("solface version v{VERSION}");
    eprintln!("set RUST_LOG=debug to trace struct generation.");
}
