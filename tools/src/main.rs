use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bitdelta_tools::{
    collect_message_entries, decode_message_json, describe_schema, format_pretty,
    inspect_message, sort_by_size, Record, SchemaFile,
};
use clap::{Parser, Subcommand, ValueEnum};
use codec::Schema;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bitdelta-tools",
    version,
    about = "bitdelta message inspection and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the entity header and size of a message file or directory.
    Inspect {
        /// Message file, or a directory of message files.
        path: PathBuf,
        /// Glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected messages.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected messages (after sorting).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Decode a message into JSON.
    Decode {
        /// Message file.
        message_file: PathBuf,
        /// Schema JSON describing the entity.
        #[arg(long)]
        schema: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Print the wire order and fingerprint of a schema.
    Describe {
        /// Schema JSON describing the entity.
        #[arg(long)]
        schema: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Inspect {
            path,
            glob,
            sort,
            limit,
        } => {
            if path.is_dir() {
                let mut entries = collect_message_entries(&path, glob.as_deref())?;
                if let Some(InspectSort::Size) = sort {
                    sort_by_size(&mut entries);
                }
                if let Some(limit) = limit.or(sort.map(|InspectSort::Size| 10)) {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = read_message(&entry.path)?;
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    println!("{}", inspect_message(&bytes)?);
                }
            } else {
                let bytes = read_message(&path)?;
                println!("{}", inspect_message(&bytes)?);
            }
        }
        Command::Decode {
            message_file,
            schema,
            format,
        } => {
            let schema = load_schema(&schema)?;
            let bytes = read_message(&message_file)?;
            let decoded = decode_message_json(&bytes, &schema)?;
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&decoded).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => print!("{}", format_pretty(&decoded)),
            }
        }
        Command::Describe { schema } => {
            let schema = load_schema(&schema)?;
            print!("{}", describe_schema(&schema));
        }
    }
    Ok(())
}

fn read_message(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read message {}", path.display()))
}

fn load_schema(path: &Path) -> Result<Schema<Record>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read schema {}", path.display()))?;
    let file = SchemaFile::parse(&contents).context("parse schema json")?;
    let schema = file.build().context("build schema")?;
    debug!(path = %path.display(), items = schema.len(), "schema loaded");
    Ok(schema)
}
