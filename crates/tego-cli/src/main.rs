//! Tego compiler command-line driver
//!
//! Compiles annotated ATerm programs to JVM class files and offers a few
//! inspection commands for the intermediate stages.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tegoc")]
#[command(about = "Tego strategy compiler", long_about = None)]
#[command(version)]
struct Cli {
    /// Log compiler progress (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile ATerm programs to class files
    Compile {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory
        #[arg(short, long, default_value = "classes")]
        out_dir: PathBuf,
        /// Compiler configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Class-file major version
        #[arg(long)]
        class_version: Option<u16>,
        /// Skip the structural check of emitted classes
        #[arg(long)]
        no_verify: bool,
    },

    /// Print the normalized IR of every definition
    Parse {
        /// Input file
        input: PathBuf,
    },

    /// Parse a JVM type signature or descriptor
    Signature {
        /// The signature text
        text: String,
        /// Parse as an erased descriptor
        #[arg(long)]
        descriptor: bool,
    },

    /// Print the contents of a class file
    Disasm {
        /// Class file
        file: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compile {
            inputs,
            out_dir,
            config,
            class_version,
            no_verify,
        } => commands::compile::execute(commands::compile::CompileOptions {
            inputs,
            out_dir,
            config,
            class_version,
            verify: !no_verify,
        }),
        Commands::Parse { input } => commands::parse::execute(&input),
        Commands::Signature { text, descriptor } => commands::signature::execute(&text, descriptor),
        Commands::Disasm { file } => commands::disasm::execute(&file),
    }
}
