//! Inspect MXP structured content in its binary and textual forms.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mxp_content::codec::{BinaryCodec, CodecConfig, TextCodec};
use mxp_content::model::{AgentIdentifier, FrameValue};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Encode and decode MXP structured content")]
struct Cli {
    /// Maximum nesting depth accepted when decoding.
    #[arg(long, default_value_t = 64)]
    max_depth: usize,

    /// Write repeated strings literally instead of as back-references.
    #[arg(long)]
    no_string_table: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Encode an agent identifier in both forms.
    Aid {
        /// Globally unique agent name.
        name: String,
        /// Transport address, repeatable.
        #[arg(long = "address")]
        addresses: Vec<String>,
    },
    /// Parse textual content and print its binary form as hex.
    Encode {
        /// Textual content, for example `(ping :n 1)`.
        text: String,
    },
    /// Decode hex-encoded binary content and print it as text.
    Decode {
        /// Binary content as hex digits.
        hex: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = CodecConfig::new(cli.max_depth).with_string_table(!cli.no_string_table);
    let binary = BinaryCodec::new(config);
    let text = TextCodec::new(config);

    match cli.command {
        Command::Aid { name, addresses } => {
            let aid = addresses
                .into_iter()
                .fold(AgentIdentifier::new(name)?, AgentIdentifier::with_address);
            let frame = FrameValue::from(aid);
            let bytes = binary.encode_frame(&frame)?;
            info!(bytes = bytes.len(), "encoded agent identifier");
            println!("text: {}", text.encode(&frame)?);
            println!("hex:  {}", to_hex(&bytes));
        }
        Command::Encode { text: input } => {
            let frame = text.decode(&input).context("parsing textual content")?;
            let bytes = binary.encode_frame(&frame)?;
            info!(chars = input.len(), bytes = bytes.len(), "re-encoded content");
            println!("{}", to_hex(&bytes));
        }
        Command::Decode { hex } => {
            let bytes = from_hex(&hex)?;
            let frame = binary
                .decode_frame(&bytes)
                .context("decoding binary content")?;
            println!("{}", text.encode(&frame)?);
        }
    }

    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn from_hex(hex: &str) -> Result<Vec<u8>> {
    let hex: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if hex.len() % 2 != 0 {
        bail!("hex input has an odd number of digits");
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .with_context(|| format!("invalid hex digits at offset {i}"))
        })
        .collect()
}
