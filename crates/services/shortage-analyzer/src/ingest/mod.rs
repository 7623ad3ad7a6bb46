//! Data sources for allocation records and need grids.
//!
//! The engine only sees the [`AllocationSource`] and [`NeedSource`] traits;
//! CSV files and in-memory tables are the supplied adapters.

pub mod csv_files;
pub mod memory;

pub use csv_files::{
    discover_need_files, parse_allocation_csv, parse_need_csv, parse_timestamp, role_token_from_path,
    CsvAllocationSource, CsvNeedSource,
};
pub use memory::{MemoryAllocationSource, MemoryNeedSource};

use crate::error::Result;
use crate::models::{AllocationTable, NeedGrid};

pub trait AllocationSource: Send + Sync {
    /// Human-readable origin, used in logs and errors.
    fn name(&self) -> &str;
    fn read(&self) -> Result<AllocationTable>;
}

pub trait NeedSource: Send + Sync {
    /// Role name embedded in the source name.
    fn role_token(&self) -> &str;
    fn read(&self) -> Result<NeedGrid>;
}
