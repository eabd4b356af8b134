//! Jack Compiler CLI
//!
//! Command-line interface for compiling `.jack` source files to Nand2Tetris
//! VM code.

use clap::Parser as ClapParser;
use std::path::PathBuf;
use std::process;

use jackc::CompilerConfig;

#[derive(ClapParser)]
#[command(name = "jackc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Jack compiler - compile .jack programs to Nand2Tetris VM code", long_about = None)]
struct Cli {
    /// Input .jack file, or a directory of .jack files
    path: PathBuf,

    /// Also write the diagnostic XML parse-tree view alongside the VM output
    #[arg(long)]
    emit_xml: bool,

    /// Log per-file start/finish
    #[arg(short, long)]
    verbose: bool,

    /// Path to a TOML configuration file (see jackc.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "jackc=debug" } else { "jackc=info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .without_time()
        .init();

    let mut config = match &cli.config {
        Some(path) => match CompilerConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
        None => CompilerConfig::default(),
    };
    config.emit_xml = config.emit_xml || cli.emit_xml;

    let reports = match jackc::compile_path(&cli.path, &config) {
        Ok(reports) => reports,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let mut failures = 0;
    for report in &reports {
        match &report.result {
            Ok(()) => println!("Compiled {}", report.input.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                failures += 1;
            }
        }
    }

    if reports.is_empty() {
        println!("No .jack files found at {}", cli.path.display());
    } else {
        println!("{} file(s), {} failed", reports.len(), failures);
    }

    if failures > 0 {
        process::exit(1);
    }
}
