//! Operand model CLI
//!
//! Minimal command-line interface over the substrate: decode base-85 offset
//! literals and run files through the keyed stream codec.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use opvm_core::config::OpvmConfig;
use opvm_core::encoding::base85;
use opvm_core::stream::apply_keystream;
use opvm_core::OpvmResult;

#[derive(Parser)]
#[command(name = "opvm", version, about = "Operand model tooling for the protected-code VM")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a base-85 literal and print the bytes as hex
    Decode {
        literal: String,
        /// Print big-endian 32-bit words instead of bytes
        #[arg(long)]
        words: bool,
    },
    /// Pass a file through the keyed codec (encrypts or decrypts)
    Transcode {
        input: PathBuf,
        output: PathBuf,
        /// Key byte; defaults to the configured stream key
        #[arg(short, long)]
        key: Option<u8>,
        /// Absolute stream position of the first input byte
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match OpvmConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => OpvmConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Decode { literal, words } => cmd_decode(&literal, words),
        Commands::Transcode {
            input,
            output,
            key,
            offset,
        } => cmd_transcode(&input, &output, key.unwrap_or(config.stream_key), offset),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn cmd_decode(literal: &str, words: bool) -> OpvmResult<()> {
    if words {
        for word in base85::decode_words(literal)? {
            println!("0x{:08X}", word);
        }
    } else {
        println!("{}", hex::encode(base85::decode(literal)?));
    }
    Ok(())
}

fn cmd_transcode(input: &Path, output: &Path, key: u8, offset: u64) -> OpvmResult<()> {
    let mut data = fs::read(input)?;
    debug!(bytes = data.len(), offset, "transcoding");

    // The first input byte sits at stream position `offset`.
    apply_keystream(key, offset, &mut data);
    fs::write(output, &data)?;

    info!(path = %output.display(), bytes = data.len(), "wrote transcoded output");
    Ok(())
}
