//! quadvm - CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use quadvm::frontend::Node;
use quadvm::middle::{dump, lower, Optimizer};
use quadvm::pipeline::compile;
use quadvm::util::config::{load_config, Config};
use quadvm::util::logger::{self, LogLevel};
use quadvm::vm::VMStatus;
use quadvm::{NAME, VERSION};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Quadruple IR generator, optimizer and virtual machine
#[derive(Parser, Debug)]
#[command(name = "quadvm")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./quadvm.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the quadruples lowered from an AST file
    Ir {
        /// AST JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the optimized quadruples and the code reduction
    Optimize {
        /// AST JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Compile and run an AST file, printing the program output
    Run {
        /// AST JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Stop after executing this many quadruples
        #[arg(long, value_name = "N")]
        max_steps: Option<u64>,

        /// Execute the unoptimized quadruples
        #[arg(long)]
        no_optimize: bool,
    },

    /// Run every phase and print the full report as JSON
    Compile {
        /// AST JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn read_ast(path: &Path) -> Result<Node> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Node::from_json(&text).with_context(|| format!("Invalid AST in {}", path.display()))
}

fn main() -> ExitCode {
    let args = Args::parse();
    match dispatch(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(args: Args) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut config: Config =
        load_config(args.config.as_deref(), &cwd).context("Failed to load configuration")?;

    if args.verbose {
        logger::init_with_level(LogLevel::Debug);
        eprintln!("{} version: {}", NAME, VERSION);
    } else {
        logger::init_with_level(config.log.level);
    }

    match args.command {
        Commands::Ir { file } => {
            let ast = read_ast(&file)?;
            let quads = lower(&ast)?;
            print!("{}", dump(&quads));
        }
        Commands::Optimize { file } => {
            let ast = read_ast(&file)?;
            let quads = lower(&ast)?;
            let result = Optimizer::new(config.optimizer).optimize(&quads);
            print!("{}", dump(&result.sequence));
            println!(
                "{} -> {} quadruples ({}% reduction)",
                quads.len(),
                result.sequence.len(),
                result.reduction_percent
            );
        }
        Commands::Run {
            file,
            max_steps,
            no_optimize,
        } => {
            if max_steps.is_some() {
                config.vm.max_steps = max_steps;
            }
            if no_optimize {
                config.pipeline.optimize = false;
            }
            let ast = read_ast(&file)?;
            let report = compile(&ast, &config)
                .with_context(|| format!("Failed to run: {}", file.display()))?;
            print!("{}", report.execution.output);
            if let VMStatus::Halted(reason) = report.execution.status {
                eprintln!("{} {}", "halted:".yellow().bold(), reason);
                return Ok(ExitCode::from(2));
            }
        }
        Commands::Compile { file } => {
            let ast = read_ast(&file)?;
            let report = compile(&ast, &config)
                .with_context(|| format!("Failed to compile: {}", file.display()))?;
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
    }

    Ok(ExitCode::SUCCESS)
}
