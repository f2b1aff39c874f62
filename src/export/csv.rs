//! CSV writer
//!
//! One header line, then one `time,weight,rate` row per sample. Values use
//! Rust's shortest round-trip float formatting (`0.0`, `1.2`), so the file
//! reads back to exactly the captured numbers.

use crate::error::{ResultExt, Result};
use crate::types::{Sample, COLUMN_HEADERS};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header line of the CSV file
pub fn header_line() -> String {
    COLUMN_HEADERS.join(",")
}

/// Write `samples` to a writer as CSV
pub fn write_samples<W: Write>(writer: &mut W, samples: &[Sample]) -> std::io::Result<()> {
    writeln!(writer, "{}", header_line())?;
    for sample in samples {
        writeln!(
            writer,
            "{:?},{:?},{:?}",
            sample.time_s, sample.weight_kg, sample.rate_kg_per_s
        )?;
    }
    writer.flush()
}

/// Create (or truncate) `path` and write `samples` to it
pub fn write_csv(path: &Path, samples: &[Sample]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_samples(&mut writer, samples).with_context(|| format!("Writing {}", path.display()))?;
    tracing::debug!("Wrote {} rows to {:?}", samples.len(), path);
    Ok(())
}
