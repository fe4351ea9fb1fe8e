use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use core::time::Duration;
use flakeid::{BitLayout, DEFAULT_EPOCH, GeneratorConfig};

/// Command line configuration for the `flakeid` binary.
///
/// Identity, layout and epoch are global options so that `decode` and
/// `layout` interpret identifiers exactly as `generate` produced them. Each
/// one falls back to an environment variable (also read from `.env`).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakeid",
    version,
    about = "Generate and inspect time-ordered 64-bit identifiers"
)]
pub struct CliArgs {
    /// Data center part of this producer's namespace.
    ///
    /// Environment variable: `FLAKEID_DATA_CENTER_ID`
    #[arg(long, env = "FLAKEID_DATA_CENTER_ID", default_value_t = 0, global = true)]
    pub data_center_id: u64,

    /// Machine part of this producer's namespace. Must be unique within the
    /// data center.
    ///
    /// Environment variable: `FLAKEID_MACHINE_ID`
    #[arg(long, env = "FLAKEID_MACHINE_ID", default_value_t = 0, global = true)]
    pub machine_id: u64,

    /// Epoch in milliseconds since 1970-01-01 UTC. Every producer sharing an
    /// identifier space must use the same value.
    ///
    /// Environment variable: `FLAKEID_EPOCH_MS`
    #[arg(
        long,
        env = "FLAKEID_EPOCH_MS",
        default_value_t = DEFAULT_EPOCH.as_millis() as u64,
        global = true
    )]
    pub epoch_ms: u64,

    /// Width of the timestamp field.
    ///
    /// Environment variable: `FLAKEID_TIMESTAMP_BITS`
    #[arg(long, env = "FLAKEID_TIMESTAMP_BITS", default_value_t = BitLayout::DEFAULT.timestamp_bits(), global = true)]
    pub timestamp_bits: u8,

    /// Width of the data center field.
    ///
    /// Environment variable: `FLAKEID_DATA_CENTER_BITS`
    #[arg(long, env = "FLAKEID_DATA_CENTER_BITS", default_value_t = BitLayout::DEFAULT.data_center_bits(), global = true)]
    pub data_center_bits: u8,

    /// Width of the machine field.
    ///
    /// Environment variable: `FLAKEID_MACHINE_BITS`
    #[arg(long, env = "FLAKEID_MACHINE_BITS", default_value_t = BitLayout::DEFAULT.machine_bits(), global = true)]
    pub machine_bits: u8,

    /// Width of the sequence field.
    ///
    /// Environment variable: `FLAKEID_SEQUENCE_BITS`
    #[arg(long, env = "FLAKEID_SEQUENCE_BITS", default_value_t = BitLayout::DEFAULT.sequence_bits(), global = true)]
    pub sequence_bits: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate identifiers and print one per line.
    Generate {
        /// Number of identifiers to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Number of threads sharing the generator.
        #[arg(short, long, default_value_t = 1)]
        threads: usize,

        /// Check that all generated identifiers are distinct and fail if not.
        #[arg(long, default_value_t = false)]
        verify: bool,

        #[arg(long, value_enum, default_value_t = Format::Plain)]
        format: Format,
    },
    /// Split identifiers into their fields.
    Decode {
        #[arg(required = true)]
        ids: Vec<u64>,

        #[arg(long, value_enum, default_value_t = Format::Plain)]
        format: Format,
    },
    /// Print the configured bit layout as JSON.
    Layout,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Plain,
    Json,
}

/// Validated configuration derived from [`CliArgs`].
#[derive(Debug, Clone)]
pub struct Config {
    pub data_center_id: u64,
    pub machine_id: u64,
    pub generator: GeneratorConfig,
}

impl TryFrom<&CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: &CliArgs) -> Result<Self, Self::Error> {
        let layout = BitLayout::new(
            args.timestamp_bits,
            args.data_center_bits,
            args.machine_bits,
            args.sequence_bits,
        )
        .context("invalid FLAKEID_*_BITS configuration")?;

        if args.data_center_id > layout.max_data_center_id() {
            bail!(
                "FLAKEID_DATA_CENTER_ID ({}) exceeds the data center field (max = {})",
                args.data_center_id,
                layout.max_data_center_id()
            );
        }

        if args.machine_id > layout.max_machine_id() {
            bail!(
                "FLAKEID_MACHINE_ID ({}) exceeds the machine field (max = {})",
                args.machine_id,
                layout.max_machine_id()
            );
        }

        if let Command::Generate { threads: 0, .. } = args.command {
            bail!("--threads must be greater than 0");
        }

        Ok(Self {
            data_center_id: args.data_center_id,
            machine_id: args.machine_id,
            generator: GeneratorConfig::default()
                .with_layout(layout)
                .with_epoch(Duration::from_millis(args.epoch_ms)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn defaults_match_library_defaults() {
        let args = parse(&["flakeid", "layout"]);
        let config = Config::try_from(&args).unwrap();
        assert_eq!(config.generator, GeneratorConfig::default());
        assert_eq!(config.data_center_id, 0);
        assert_eq!(config.machine_id, 0);
    }

    #[test]
    fn global_options_after_subcommand() {
        let args = parse(&[
            "flakeid",
            "generate",
            "-n",
            "10",
            "--data-center-id",
            "31",
            "--machine-id",
            "31",
        ]);
        let config = Config::try_from(&args).unwrap();
        assert_eq!((config.data_center_id, config.machine_id), (31, 31));
        assert!(matches!(args.command, Command::Generate { count: 10, .. }));
    }

    #[test]
    fn rejects_identity_outside_layout() {
        let args = parse(&["flakeid", "layout", "--data-center-id", "32"]);
        let err = Config::try_from(&args).unwrap_err();
        assert!(err.to_string().contains("FLAKEID_DATA_CENTER_ID (32)"));

        let args = parse(&[
            "flakeid",
            "layout",
            "--machine-bits",
            "8",
            "--data-center-bits",
            "2",
            "--machine-id",
            "200",
        ]);
        assert_eq!(Config::try_from(&args).unwrap().machine_id, 200);
    }

    #[test]
    fn rejects_oversized_layout() {
        let args = parse(&["flakeid", "layout", "--timestamp-bits", "50"]);
        assert!(Config::try_from(&args).is_err());
    }

    #[test]
    fn rejects_zero_threads() {
        let args = parse(&["flakeid", "generate", "--threads", "0"]);
        assert!(Config::try_from(&args).is_err());
    }
}
