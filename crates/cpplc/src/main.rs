//! Command-line driver for the cppl compiler.
//!
//! Reads an AST produced by the parser (a JSON array of items), lowers
//! every item to IR and prints the module.
//!
//! ```bash
//! cpplc program.json -o program.ll
//! cpplc program.json --source program.cppl
//! RUST_LOG=trace cpplc program.json --abort-on-error
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[derive(Parser)]
#[command(name = "cpplc", about = "cppl compiler", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// JSON-serialized AST to compile
    input: PathBuf,

    /// Source file the AST was parsed from, for showing error locations
    #[arg(long, value_name = "FILE")]
    source: Option<PathBuf>,

    /// Configuration file (defaults to ./cppl.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the IR to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Stop at the first item that fails to build
    #[arg(long = "abort-on-error")]
    abort_on_error: bool,

    /// Log scheduler activity (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let options = cpplc::CompileOptions {
        input: cli.input,
        source: cli.source,
        config_path: cli.config,
        output: cli.output,
        abort_on_error: cli.abort_on_error,
    };
    cpplc::compile(options)
}
