use super::{AllocationSource, NeedSource};
use crate::error::{AnalyzerErrorExt, InsightError, Result};
use crate::models::{AllocationRecord, AllocationTable, IngestStats, NeedGrid};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// One allocation row as written in the CSV. Fields stay textual so a bad
/// value rejects only its row.
#[derive(Debug, Clone, Deserialize)]
struct AllocationRow {
    #[serde(alias = "ds")]
    timestamp: String,

    #[serde(alias = "staff", default)]
    staff_id: Option<String>,

    role: String,

    #[serde(default)]
    employment: Option<String>,

    #[serde(alias = "parsed_slots_count", default)]
    slot_count: Option<String>,
}

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ts);
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_local())
        .map_err(|_| InsightError::parse_error(format!("invalid timestamp '{s}'")))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .ok_or_else(|| InsightError::parse_error(format!("invalid date '{s}'")))
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| InsightError::parse_error(format!("invalid time of day '{s}'")))
}

fn parse_slot_count(raw: Option<&str>) -> std::result::Result<u32, String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(1);
    };
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("slot_count '{raw}' is not a number"))?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(format!("slot_count '{raw}' is not a non-negative integer"));
    }
    Ok(value as u32)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses allocation CSV. Malformed rows are counted and skipped; a missing
/// required column fails the whole input.
pub fn parse_allocation_csv<R: Read>(reader: R, default_employment: &str) -> Result<AllocationTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let has = |names: &[&str]| headers.iter().any(|h| names.contains(&h));
    if !has(&["timestamp", "ds"]) {
        return Err(InsightError::invalid_input(
            "allocation.timestamp",
            "missing 'timestamp' (or 'ds') column",
        ));
    }
    if !has(&["role"]) {
        return Err(InsightError::invalid_input("allocation.role", "missing 'role' column"));
    }

    let mut stats = IngestStats::default();
    let mut records = Vec::new();

    for (idx, row) in reader.deserialize::<AllocationRow>().enumerate() {
        let line = idx + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                stats.reject(line, e.to_string());
                continue;
            }
        };

        let timestamp = match parse_timestamp(&row.timestamp) {
            Ok(ts) => ts,
            Err(e) => {
                stats.reject(line, e.to_string());
                continue;
            }
        };
        let role = row.role.trim();
        if role.is_empty() {
            stats.reject(line, "empty role");
            continue;
        }
        let Some(staff_id) = non_empty(row.staff_id) else {
            stats.reject(line, "missing staff_id");
            continue;
        };
        let slot_count = match parse_slot_count(row.slot_count.as_deref()) {
            Ok(n) => n,
            Err(reason) => {
                stats.reject(line, reason);
                continue;
            }
        };
        let employment =
            non_empty(row.employment).unwrap_or_else(|| default_employment.to_string());

        stats.accept();
        records.push(AllocationRecord::new(
            timestamp, staff_id, role, employment, slot_count,
        ));
    }

    if stats.rows_rejected > 0 {
        warn!(
            rows_read = stats.rows_read,
            rows_rejected = stats.rows_rejected,
            "Rejected malformed allocation rows"
        );
    }

    Ok(AllocationTable { records, stats })
}

/// Parses a need grid: header `time,<date>,<date>,...`, one row per slot.
/// Empty cells count as zero.
pub fn parse_need_csv<R: Read>(role: &str, reader: R) -> Result<NeedGrid> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.len() < 2 {
        return Err(InsightError::invalid_input(
            format!("need[{role}]"),
            "expected a time column followed by at least one date column",
        ));
    }
    let dates = headers
        .iter()
        .skip(1)
        .map(parse_date)
        .collect::<Result<Vec<_>>>()?;
    let mut seen_dates = BTreeSet::new();
    for date in &dates {
        if !seen_dates.insert(*date) {
            return Err(InsightError::invalid_input(
                format!("need[{role}]"),
                format!("date column {date} appears more than once"),
            ));
        }
    }

    let mut times = Vec::new();
    let mut values = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = idx + 2;
        let time = parse_time(record.get(0).unwrap_or_default())?;

        let mut row = Vec::with_capacity(dates.len());
        for col in 1..=dates.len() {
            let cell = record.get(col).unwrap_or_default();
            let value = if cell.is_empty() {
                0.0
            } else {
                cell.parse::<f64>().map_err(|_| {
                    InsightError::invalid_input(
                        format!("need[{role}]"),
                        format!("row {line}: '{cell}' is not a number"),
                    )
                })?
            };
            if !value.is_finite() || value < 0.0 {
                return Err(InsightError::invalid_input(
                    format!("need[{role}]"),
                    format!("row {line}: need must be non-negative, got {value}"),
                ));
            }
            row.push(value);
        }
        times.push(time);
        values.push(row);
    }

    if times.is_empty() {
        return Err(InsightError::invalid_input(
            format!("need[{role}]"),
            "need grid has no time rows",
        ));
    }

    Ok(NeedGrid::new(role, times, dates, values))
}

/// Role token of a need file: the file stem with `prefix` stripped.
pub fn role_token_from_path(path: &Path, prefix: &str) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let token = stem.strip_prefix(prefix).unwrap_or(stem).trim();
    (!token.is_empty()).then(|| token.to_string())
}

pub struct CsvAllocationSource {
    path: PathBuf,
    name: String,
    default_employment: String,
}

impl CsvAllocationSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            path,
            default_employment: "unknown".to_string(),
        }
    }

    pub fn with_default_employment(mut self, employment: impl Into<String>) -> Self {
        self.default_employment = employment.into();
        self
    }
}

impl AllocationSource for CsvAllocationSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<AllocationTable> {
        let file = File::open(&self.path)?;
        let table = parse_allocation_csv(file, &self.default_employment)?;
        info!(
            source = %self.name,
            records = table.len(),
            rejected = table.stats.rows_rejected,
            "Loaded allocation CSV"
        );
        Ok(table)
    }
}

pub struct CsvNeedSource {
    path: PathBuf,
    role: String,
}

impl CsvNeedSource {
    pub fn new(path: impl Into<PathBuf>, role: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            role: role.into(),
        }
    }

    /// Derives the role token from the file name.
    pub fn from_path(path: impl Into<PathBuf>, prefix: &str) -> Result<Self> {
        let path = path.into();
        let role = role_token_from_path(&path, prefix).ok_or_else(|| {
            InsightError::invalid_input(
                "need file",
                format!("cannot derive a role from '{}'", path.display()),
            )
        })?;
        Ok(Self { path, role })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NeedSource for CsvNeedSource {
    fn role_token(&self) -> &str {
        &self.role
    }

    fn read(&self) -> Result<NeedGrid> {
        let file = File::open(&self.path)?;
        let grid = parse_need_csv(&self.role, file)?;
        debug!(role = %self.role, rows = grid.row_count(), dates = grid.dates.len(), "Loaded need grid");
        Ok(grid)
    }
}

/// Need files in `dir` whose stem starts with `prefix` and whose extension
/// is `extension`, sorted by path.
pub fn discover_need_files(dir: &Path, prefix: &str, extension: &str) -> Result<Vec<CsvNeedSource>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        })
        .filter(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.starts_with(prefix))
        })
        .collect();
    paths.sort();

    let sources = paths
        .into_iter()
        .map(|p| CsvNeedSource::from_path(p, prefix))
        .collect::<Result<Vec<_>>>()?;
    info!(dir = %dir.display(), count = sources.len(), "Discovered need files");
    Ok(sources)
}
