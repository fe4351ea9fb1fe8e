#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod telemetry;

use std::io::{self, BufWriter, Write};

use clap::Parser;
use config::{CliArgs, Command, Config};

// Using mimalloc for better performance under multi-threaded generation,
// especially in musl environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    telemetry::init_tracing()?;

    let config = Config::try_from(&args)?;
    if cfg!(debug_assertions) {
        tracing::debug!("Running with full config: {:#?}", config);
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.command {
        Command::Generate {
            count,
            threads,
            verify,
            format,
        } => commands::generate(&config, count, threads, verify, format, &mut out)?,
        Command::Decode { ids, format } => commands::decode(&config, &ids, format, &mut out)?,
        Command::Layout => commands::layout(&config, &mut out)?,
    }

    out.flush()?;
    Ok(())
}
