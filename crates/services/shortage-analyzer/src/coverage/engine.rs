use crate::config::{BaselineWindow, CoverageConfig};
use crate::models::{AnalysisRole, CoverageCell, CoverageMatrix, CoverageMode, Severity};
use crate::normalize::{NormalizedActual, NormalizedNeed};
use crate::service::RoleWorkerPool;
use std::cmp::Ordering;
use tracing::{info, warn};

const EPSILON: f64 = 1e-9;

/// `actual / target`, `+inf` when only the target is zero, `1.0` when both are.
pub fn coverage_ratio(actual: f64, target: f64) -> f64 {
    if target > EPSILON {
        (actual / target).max(0.0)
    } else if actual > EPSILON {
        f64::INFINITY
    } else {
        1.0
    }
}

pub fn classify_severity(ratio: f64, config: &CoverageConfig) -> Severity {
    if ratio < config.critical_ratio {
        Severity::Critical
    } else if ratio < config.shortage_ratio {
        Severity::Moderate
    } else {
        Severity::None
    }
}

pub struct CoverageEngine<'a> {
    config: &'a CoverageConfig,
}

impl<'a> CoverageEngine<'a> {
    pub fn new(config: &'a CoverageConfig) -> Self {
        Self { config }
    }

    /// Builds the per-(role, slot) matrix. Returns warnings alongside.
    pub fn compute(
        &self,
        actual: &NormalizedActual,
        need: &NormalizedNeed,
        roles: &[AnalysisRole],
        pool: &RoleWorkerPool,
    ) -> (CoverageMatrix, Vec<String>) {
        let mut warnings = Vec::new();
        let window = self.effective_window(actual, &mut warnings);

        let per_role = pool.map(roles, |role| self.role_cells(role, actual, need, window));
        let cells: Vec<CoverageCell> = per_role.into_iter().flatten().collect();

        let mut shortage_spots: Vec<CoverageCell> = cells
            .iter()
            .filter(|c| c.severity != Severity::None)
            .cloned()
            .collect();
        shortage_spots.sort_by(|a, b| {
            a.ratio
                .partial_cmp(&b.ratio)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.role.cmp(&b.role))
                .then_with(|| a.slot.cmp(&b.slot))
        });

        info!(
            roles = roles.len(),
            cells = cells.len(),
            shortage_spots = shortage_spots.len(),
            "Computed coverage matrix"
        );

        (
            CoverageMatrix {
                slot_minutes: actual.grid.slot_minutes,
                cells,
                shortage_spots,
            },
            warnings,
        )
    }

    fn effective_window(
        &self,
        actual: &NormalizedActual,
        warnings: &mut Vec<String>,
    ) -> BaselineWindow {
        let window = self.config.baseline_window;
        if actual.dates.iter().any(|d| window.contains(*d)) {
            return window;
        }
        warn!(?window, "Baseline window has no observed dates, using all days");
        warnings.push(format!(
            "baseline window {window:?} contains no observed dates; all days used instead"
        ));
        BaselineWindow::AllDays
    }

    fn role_cells(
        &self,
        role: &AnalysisRole,
        actual: &NormalizedActual,
        need: &NormalizedNeed,
        window: BaselineWindow,
    ) -> Vec<CoverageCell> {
        let slots = actual.grid.slots_per_day();
        let actual_profile = match &role.actual_role {
            Some(name) => actual.slot_profile(name),
            None => vec![0.0; slots],
        };
        let need_profile = role
            .need_role
            .as_deref()
            .and_then(|n| need.role(n))
            .map(|n| n.slot_profile.clone());

        let mode = match (&role.actual_role, &need_profile) {
            (None, _) => CoverageMode::NeedBased,
            (Some(_), None) => CoverageMode::BaselineRelative,
            (Some(_), Some(_)) => self.config.mode,
        };

        let target_profile = match (mode, &role.actual_role, &need_profile) {
            (CoverageMode::BaselineRelative, Some(name), _) => {
                actual.slot_profile_over(name, |d| window.contains(d))
            }
            (_, _, Some(profile)) => profile.clone(),
            _ => vec![0.0; slots],
        };

        (0..slots)
            .map(|slot| {
                let a = actual_profile[slot];
                let target = target_profile[slot];
                let ratio = coverage_ratio(a, target);
                CoverageCell {
                    role: role.name.clone(),
                    slot,
                    time: actual.grid.slots[slot],
                    actual: a,
                    target,
                    need: need_profile.as_ref().map(|p| p[slot]),
                    ratio,
                    severity: classify_severity(ratio, self.config),
                    mode,
                }
            })
            .collect()
    }
}
