//! Wirebuf command line
//!
//! Encodes fields into a binary message and decodes messages by layout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wirebuf::layout::{self, Field};
use wirebuf::WirebufConfig;

#[derive(Parser)]
#[command(name = "wirebuf")]
#[command(version)]
#[command(about = "Encode and decode length-prefixed binary messages", long_about = None)]
struct Cli {
    /// Config file (defaults to wirebuf.toml in the current directory or a parent)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode fields (u8:7 u32:1000 str:abc hex:00ff) into a message
    Encode {
        /// Fields in message order
        #[arg(required = true)]
        fields: Vec<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output as hex instead of binary
        #[arg(long)]
        hex: bool,
    },

    /// Decode a message using a layout such as u8,u32,str
    Decode {
        /// Input file (use - for stdin)
        #[arg(default_value = "-")]
        input: String,

        /// Comma-separated field kinds
        #[arg(short, long)]
        layout: String,

        /// Input is hex text instead of binary
        #[arg(long)]
        hex: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Encode {
            fields,
            output,
            hex,
        } => cmd_encode(&config, &fields, output, hex),
        Commands::Decode { input, layout, hex } => cmd_decode(&config, &input, &layout, hex),
    }
}

fn load_config(path: Option<&Path>) -> Result<WirebufConfig> {
    match path {
        Some(path) => WirebufConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => WirebufConfig::load_from_cwd().context("Failed to load wirebuf.toml"),
    }
}

fn cmd_encode(
    config: &WirebufConfig,
    tokens: &[String],
    output: Option<PathBuf>,
    as_hex: bool,
) -> Result<()> {
    let fields = tokens
        .iter()
        .map(|t| Field::parse(t).with_context(|| format!("Invalid field '{}'", t)))
        .collect::<Result<Vec<_>>>()?;

    let bytes = layout::encode(&fields, config).context("Encoding failed")?;
    let out = if as_hex {
        let mut text = hex::encode(&bytes).into_bytes();
        text.push(b'\n');
        text
    } else {
        bytes
    };

    match output {
        Some(path) => {
            fs::write(&path, &out)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {} fields to {}", fields.len(), path.display());
        }
        None => io::stdout().write_all(&out)?,
    }
    Ok(())
}

fn cmd_decode(
    config: &WirebufConfig,
    input: &str,
    layout_spec: &str,
    from_hex: bool,
) -> Result<()> {
    let kinds = layout::parse_kinds(layout_spec).context("Invalid layout")?;

    let raw = if input == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(input).with_context(|| format!("Failed to read {}", input))?
    };

    let bytes = if from_hex {
        let text = String::from_utf8(raw).context("Hex input is not text")?;
        hex::decode(text.trim()).context("Invalid hex input")?
    } else {
        raw
    };

    let decoded = layout::decode(bytes, &kinds, config).context("Decoding failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for field in &decoded.fields {
        writeln!(out, "{}", field)?;
    }
    Ok(())
}
