use super::{infer_time_grid, NormalizedActual, NormalizedNeed, RoleNeed};
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerErrorExt, InsightError, Result};
use crate::ingest::{AllocationSource, NeedSource};
use crate::models::{DataQuality, TimeGrid};
use tracing::{info, instrument, warn};

/// Immutable snapshot handed to the later stages.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub grid: TimeGrid,
    pub actual: NormalizedActual,
    pub need: NormalizedNeed,
    pub quality: DataQuality,
    pub warnings: Vec<String>,
}

pub struct DataLoader<'a> {
    config: &'a AnalyzerConfig,
}

impl<'a> DataLoader<'a> {
    pub fn new(config: &'a AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Reads every source and converts the data to daily rates on one grid.
    #[instrument(skip_all, fields(source = allocation.name(), need_sources = needs.len()))]
    pub fn load(
        &self,
        allocation: &dyn AllocationSource,
        needs: &[Box<dyn NeedSource>],
    ) -> Result<LoadedData> {
        let table = allocation.read()?;
        if table.is_empty() {
            return Err(InsightError::empty_dataset(format!(
                "allocation source {} has no usable rows ({} read, {} rejected)",
                allocation.name(),
                table.stats.rows_read,
                table.stats.rows_rejected
            )));
        }

        let grid = infer_time_grid(
            table.records.iter().map(|r| r.timestamp.time()),
            self.config.grid.slot_minutes,
        )?;
        let actual = NormalizedActual::from_records(grid.clone(), &table.records);

        let mut warnings = Vec::new();
        let mut need = NormalizedNeed::default();
        for source in needs {
            let role = source.role_token().to_string();
            let mut raw = source.read()?;
            raw.role = role.clone();
            let role_need = RoleNeed::from_grid(&raw, &grid, &role)?;
            if need.roles.contains_key(&role) {
                let msg = format!("duplicate need grid for role '{role}' ignored");
                warn!(role = %role, "Duplicate need grid ignored");
                warnings.push(msg);
                continue;
            }
            need.roles.insert(role, role_need);
        }

        if need.is_empty() {
            warn!("No need grids found; all allocation is treated as surplus");
            warnings.push("no need grids found; all actual allocation treated as surplus".to_string());
        }

        let quality = DataQuality::new(
            table.stats.rows_read,
            table.stats.rows_rejected,
            actual.period_days(),
            actual.calendar_days(),
            need.roles.len(),
        );
        if table.stats.rows_rejected > 0 {
            warnings.push(format!(
                "{} of {} allocation rows rejected",
                table.stats.rows_rejected, table.stats.rows_read
            ));
        }

        info!(
            slot_minutes = grid.slot_minutes,
            period_days = actual.period_days(),
            roles = actual.roles.len(),
            need_roles = need.roles.len(),
            quality = quality.score,
            "Loaded analysis data"
        );

        Ok(LoadedData {
            grid,
            actual,
            need,
            quality,
            warnings,
        })
    }
}
