use std::collections::HashSet;
use std::io::Write;
use std::thread::scope;
use std::time::Instant;

use anyhow::{Context, anyhow, bail};
use flakeid::{FlakeId, FlakeParts, IdGenerator, SystemClock};
use serde::Serialize;
use serde_json::json;

use crate::config::{Config, Format};

/// One decoded identifier, as printed by `--format json`.
#[derive(Serialize)]
struct DecodedId {
    id: FlakeId,
    #[serde(flatten)]
    parts: FlakeParts,
    unix_ms: u64,
}

/// Generates `count` identifiers from one generator shared by `threads`
/// threads and writes them in ascending order.
pub fn generate(
    config: &Config,
    count: usize,
    threads: usize,
    verify: bool,
    format: Format,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let generator = IdGenerator::with_config(
        config.data_center_id,
        config.machine_id,
        config.generator,
        SystemClock,
    )?;

    let start = Instant::now();
    let mut ids = generate_shared(&generator, count, threads)?;
    let elapsed = start.elapsed();
    tracing::info!(count, threads, ?elapsed, "generated ids");

    ids.sort_unstable();

    if verify {
        let unique = ids.iter().collect::<HashSet<_>>().len();
        tracing::info!(count, unique, "verified ids");
        if unique != count {
            bail!("expected {count} unique ids, found {unique}");
        }
    }

    for id in ids {
        write_id(config, id, format, out)?;
    }
    Ok(())
}

fn generate_shared(
    generator: &IdGenerator,
    count: usize,
    threads: usize,
) -> anyhow::Result<Vec<FlakeId>> {
    if threads <= 1 {
        return (0..count)
            .map(|_| generator.next_id().context("failed to generate id"))
            .collect();
    }

    let per_thread = count / threads;
    let remainder = count % threads;

    scope(|s| -> anyhow::Result<Vec<FlakeId>> {
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let n = per_thread + usize::from(i < remainder);
                s.spawn(move || {
                    (0..n)
                        .map(|_| generator.next_id())
                        .collect::<Result<Vec<_>, _>>()
                })
            })
            .collect();

        let mut ids = Vec::with_capacity(count);
        for handle in handles {
            let chunk = match handle.join() {
                Ok(chunk) => chunk.context("failed to generate id")?,
                Err(_) => bail!("generator thread panicked"),
            };
            ids.extend(chunk);
        }
        Ok(ids)
    })
}

/// Writes the fields of each identifier under the configured layout.
pub fn decode(
    config: &Config,
    ids: &[u64],
    format: Format,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for &raw in ids {
        if raw > i64::MAX as u64 {
            tracing::warn!(raw, "reserved top bit is set, id was not produced by this layout");
        }
        write_id(config, FlakeId::from_raw(raw), format, out)?;
    }
    Ok(())
}

/// Writes widths, shifts and maxima of the configured layout.
pub fn layout(config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    let layout = config.generator.layout;
    let value = json!({
        "epoch_ms": config.generator.epoch_millis(),
        "total_bits": layout.total_bits(),
        "timestamp": {
            "bits": layout.timestamp_bits(),
            "shift": layout.timestamp_shift(),
            "max": layout.max_timestamp(),
        },
        "data_center_id": {
            "bits": layout.data_center_bits(),
            "shift": layout.data_center_shift(),
            "max": layout.max_data_center_id(),
        },
        "machine_id": {
            "bits": layout.machine_bits(),
            "shift": layout.machine_shift(),
            "max": layout.max_machine_id(),
        },
        "sequence": {
            "bits": layout.sequence_bits(),
            "shift": 0,
            "max": layout.max_sequence(),
        },
    });
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)?;
    Ok(())
}

fn write_id(
    config: &Config,
    id: FlakeId,
    format: Format,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let parts = config.generator.layout.decompose(id);
    let unix_ms = parts.unix_millis(config.generator.epoch).ok_or_else(|| {
        anyhow!(
            "id {id}: epoch {} ms + timestamp {} ms overflows u64",
            config.generator.epoch_millis(),
            parts.timestamp
        )
    })?;
    match format {
        Format::Plain => writeln!(
            out,
            "{id} timestamp={} unix_ms={unix_ms} data_center_id={} machine_id={} sequence={}",
            parts.timestamp, parts.data_center_id, parts.machine_id, parts.sequence
        )?,
        Format::Json => {
            serde_json::to_writer(&mut *out, &DecodedId { id, parts, unix_ms })?;
            writeln!(out)?;
        }
    }
    Ok(())
}
