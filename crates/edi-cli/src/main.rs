//! # edi-cli
//!
//! Command-line driver for writing outgoing EDI messages.
//!
//! Reads a message tree (JSON), resolves the grammar for the requested
//! editype and message type from a grammar directory, and writes the
//! serialized document to the output file.

use anyhow::Context;
use clap::{Parser, Subcommand};
use edi_ir::Node;
use edi_schema::{GrammarLoader, Syntax};
use edi_serializer::{Outmessage, WriteRequest};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edi")]
#[command(about = "EDI outbound serialization CLI")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize a message tree into an EDI document
    Write {
        /// Message tree file (JSON)
        input: PathBuf,

        /// Output file path
        output: PathBuf,

        /// Editype (e.g., edifact, x12, tradacoms, csv, fixed)
        #[arg(short, long)]
        editype: String,

        /// Message type (e.g., ORDERSD96AUN)
        #[arg(short, long)]
        messagetype: String,

        /// Grammar directory
        #[arg(short, long)]
        grammars: PathBuf,

        /// Receiving partner, for partner specific syntax
        #[arg(short, long)]
        partner: Option<String>,

        /// Syntax overrides file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Write {
            input,
            output,
            editype,
            messagetype,
            grammars,
            partner,
            config,
        } => {
            tracing::info!("Writing {} -> {}", input.display(), output.display());

            let tree = read_tree(&input)?;
            let overrides = match config {
                Some(path) => read_overrides(&path)?,
                None => Syntax::default(),
            };

            let mut request = WriteRequest::new(editype, messagetype)
                .with_overrides(overrides)
                .with_destination(&output);
            if let Some(partner) = partner {
                request = request.with_partner(partner);
            }

            let loader = GrammarLoader::new(vec![grammars]);
            let summary = Outmessage::new(&loader, request)?
                .write_to_path(&tree)
                .with_context(|| format!("failed to write {}", output.display()))?;

            eprintln!("messages written: {}", summary.messages);
            Ok(())
        }
    }
}

fn read_tree(path: &Path) -> anyhow::Result<Node> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read message tree {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid message tree {}", path.display()))
}

fn read_overrides(path: &Path) -> anyhow::Result<Syntax> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}
