use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Most rejection messages kept per ingest; the count stays exact.
const MAX_REJECTION_SAMPLES: usize = 20;

/// One staff member allocated to one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub timestamp: NaiveDateTime,
    pub staff_id: String,
    pub role: String,
    pub employment: String,
    /// Staff contributed to the timestamp's slot.
    pub slot_count: u32,
}

impl AllocationRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        staff_id: impl Into<String>,
        role: impl Into<String>,
        employment: impl Into<String>,
        slot_count: u32,
    ) -> Self {
        Self {
            timestamp,
            staff_id: staff_id.into(),
            role: role.into(),
            employment: employment.into(),
            slot_count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestStats {
    pub rows_read: usize,
    pub rows_rejected: usize,
    pub rejection_samples: Vec<String>,
}

impl IngestStats {
    pub fn accept(&mut self) {
        self.rows_read += 1;
    }

    pub fn reject(&mut self, line: usize, reason: impl Into<String>) {
        self.rows_read += 1;
        self.rows_rejected += 1;
        if self.rejection_samples.len() < MAX_REJECTION_SAMPLES {
            self.rejection_samples
                .push(format!("row {line}: {}", reason.into()));
        }
    }

    /// Share of rows that were accepted; 1.0 when nothing was read.
    pub fn completeness(&self) -> f64 {
        if self.rows_read == 0 {
            return 1.0;
        }
        (self.rows_read - self.rows_rejected) as f64 / self.rows_read as f64
    }
}

/// Allocation records as delivered by a source, plus ingest statistics.
#[derive(Debug, Clone, Default)]
pub struct AllocationTable {
    pub records: Vec<AllocationRecord>,
    pub stats: IngestStats,
}

impl AllocationTable {
    pub fn new(records: Vec<AllocationRecord>) -> Self {
        let stats = IngestStats {
            rows_read: records.len(),
            ..IngestStats::default()
        };
        Self { records, stats }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
