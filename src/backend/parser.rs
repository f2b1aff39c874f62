//! Sample parser for the load cell line protocol
//!
//! The device streams one measurement per line:
//!
//! ```text
//! <time_seconds>,<weight_kg>,<rate_kg_per_s>\n
//! ```
//!
//! A line either parses into a complete [`Sample`] or is rejected with a
//! [`MalformedSample`]; there are no partial samples.

use crate::types::Sample;
use thiserror::Error;

/// Field delimiter of the serial protocol
pub const FIELD_DELIMITER: char = ',';

/// Number of fields in a well-formed line
pub const FIELD_COUNT: usize = 3;

const FIELD_NAMES: [&str; FIELD_COUNT] = ["time", "weight", "rate"];

/// Why a line could not be turned into a sample
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedSample {
    /// The line had nothing but whitespace
    #[error("empty line")]
    Empty,

    /// The line did not split into exactly three fields
    #[error("expected 3 fields, found {found}")]
    FieldCount { found: usize },

    /// One of the fields was not a number
    #[error("invalid {field} value {text:?}")]
    InvalidNumber { field: &'static str, text: String },

    /// A field spelled infinity or NaN
    #[error("non-finite {field} value {text:?}")]
    NonFinite { field: &'static str, text: String },
}

/// Parse one line of device output into a sample.
pub fn parse_sample(line: &str) -> Result<Sample, MalformedSample> {
    let line = line.trim();
    if line.is_empty() {
        return Err(MalformedSample::Empty);
    }

    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() != FIELD_COUNT {
        return Err(MalformedSample::FieldCount {
            found: fields.len(),
        });
    }

    let mut values = [0.0f64; FIELD_COUNT];
    for (i, field) in fields.iter().enumerate() {
        let text = field.trim();
        let value = text
            .parse::<f64>()
            .map_err(|_| MalformedSample::InvalidNumber {
                field: FIELD_NAMES[i],
                text: text.to_string(),
            })?;
        if !value.is_finite() {
            return Err(MalformedSample::NonFinite {
                field: FIELD_NAMES[i],
                text: text.to_string(),
            });
        }
        values[i] = value;
    }

    Ok(Sample::new(values[0], values[1], values[2]))
}
