use super::{AllocationSource, NeedSource};
use crate::error::Result;
use crate::models::{AllocationRecord, AllocationTable, NeedGrid};

pub struct MemoryAllocationSource {
    name: String,
    table: AllocationTable,
}

impl MemoryAllocationSource {
    pub fn new(name: impl Into<String>, records: Vec<AllocationRecord>) -> Self {
        Self {
            name: name.into(),
            table: AllocationTable::new(records),
        }
    }

    /// Wraps a table that already carries ingest statistics.
    pub fn from_table(name: impl Into<String>, table: AllocationTable) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }
}

impl AllocationSource for MemoryAllocationSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<AllocationTable> {
        Ok(self.table.clone())
    }
}

pub struct MemoryNeedSource {
    grid: NeedGrid,
}

impl MemoryNeedSource {
    pub fn new(grid: NeedGrid) -> Self {
        Self { grid }
    }
}

impl NeedSource for MemoryNeedSource {
    fn role_token(&self) -> &str {
        &self.grid.role
    }

    fn read(&self) -> Result<NeedGrid> {
        Ok(self.grid.clone())
    }
}
