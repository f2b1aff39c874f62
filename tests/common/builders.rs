//! Test data builders

use loadcell_logger::types::{ReportMetadata, Sample};

/// Builder for report metadata
pub struct MetadataBuilder {
    metadata: ReportMetadata,
}

impl MetadataBuilder {
    pub fn new() -> Self {
        Self {
            metadata: ReportMetadata {
                day: "Lunes".to_string(),
                scheduled_start: "09:00".to_string(),
                pc_time: "09:01:12".to_string(),
                test_number: "1".to_string(),
                responsible: "Operador".to_string(),
            },
        }
    }

    pub fn test_number(mut self, number: &str) -> Self {
        self.metadata.test_number = number.to_string();
        self
    }

    pub fn responsible(mut self, name: &str) -> Self {
        self.metadata.responsible = name.to_string();
        self
    }

    pub fn build(self) -> ReportMetadata {
        self.metadata
    }
}

/// `n` samples of a linear ramp, 0.5 s apart
pub fn ramp(n: usize) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.5;
            Sample::new(t, 1.0 + t * 0.2, 0.4)
        })
        .collect()
}

/// Device output for `samples`, one line each
pub fn device_lines(samples: &[Sample]) -> String {
    samples
        .iter()
        .map(|s| format!("{},{},{}\n", s.time_s, s.weight_kg, s.rate_kg_per_s))
        .collect()
}
