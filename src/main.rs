mod modules;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use abicodec::{config, Decoder};

use crate::modules::toolkit::{self, ToolResult};

#[derive(Debug, Parser)]
#[command(
    name = "abicodec",
    version,
    about = "Encode, decode and inspect contract ABI data"
)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute a function selector or event topic
    Selector {
        /// Declaration, e.g. 'transfer(address,uint256)' or 'event Transfer(address,address,uint256)'
        declaration: String,
    },

    /// Encode calldata for a function, or a single value with --type
    Encode {
        /// Function declaration, or a type signature when --type is set
        signature: String,

        /// Arguments in declaration order (arrays as [a,b], tuples as (a,b))
        args: Vec<String>,

        /// Treat the signature as a type and encode exactly one value
        #[arg(long = "type")]
        as_type: bool,
    },

    /// Decode calldata, or raw data with --type
    Decode {
        /// Hex payload
        data: String,

        /// Function declaration to decode with instead of the configured ones
        #[arg(long, conflicts_with = "type_signature")]
        signature: Option<String>,

        /// Type signature to decode raw data as
        #[arg(long = "type")]
        type_signature: Option<String>,
    },

    /// Normalize a type signature and show its head layout
    Format {
        signature: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match args.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load();
    debug!(?config, "loaded config");

    let result = run(args.command, &config).map_err(|e| anyhow!(e))?;
    print!("{}", result);
    Ok(())
}

fn run(command: Command, config: &config::Config) -> Result<ToolResult, String> {
    match command {
        Command::Selector { declaration } => toolkit::selector::selector(&declaration),
        Command::Encode {
            signature,
            args,
            as_type,
        } => {
            if as_type {
                let [value] = args.as_slice() else {
                    return Err(format!("--type expects exactly one value, got {}", args.len()));
                };
                toolkit::encode::encode_value(&signature, value)
            } else {
                toolkit::encode::encode(&signature, &args)
            }
        }
        Command::Decode {
            data,
            signature,
            type_signature,
        } => {
            let decoder = Decoder::new(config.decode_limits());
            match type_signature {
                Some(ty) => toolkit::decode::decode_value(&ty, &data, &decoder),
                None => {
                    let known = config.known_abi();
                    toolkit::decode::decode(&data, signature.as_deref(), &known, &decoder)
                }
            }
        }
        Command::Format { signature } => toolkit::format::format(&signature),
    }
}
