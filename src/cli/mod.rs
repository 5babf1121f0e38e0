pub mod decode;
pub mod encode;
pub mod layout;


use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use decode::{handle_decode, DecodeCommand};
use encode::{handle_encode, EncodeCommand};
use layout::{handle_layout, LayoutCommand};

use crate::config::DecoderConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a decoder config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Decode input reports from hex strings or a capture log
    Decode(DecodeCommand),
    /// Build an input report from field values
    Encode(EncodeCommand),
    /// Show the byte layout of the input report
    Layout(LayoutCommand),
}

pub fn main_cli(args: Args) -> Result<(), Box<dyn Error>> {
    let config = DecoderConfig::load(args.config.as_deref())?;
    log::debug!("Using config: {config:?}");

    match args.cmd {
        Commands::Decode(cmd) => handle_decode(&config, cmd)?,
        Commands::Encode(cmd) => handle_encode(cmd)?,
        Commands::Layout(cmd) => handle_layout(&config, cmd)?,
    }

    Ok(())
}
