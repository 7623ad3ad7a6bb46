use super::masking::detect_masking;
use crate::config::ShortageConfig;
use crate::models::{
    AnalysisRole, CoverageCell, CoverageMatrix, RankedRole, ShortageRecord, ShortageScope,
    ShortageSummary,
};
use crate::normalize::{NormalizedActual, RoleActual};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::info;

/// Employment label for roles without any allocation records.
pub const UNASSIGNED_EMPLOYMENT: &str = "unassigned";

/// Daily need/actual hours of one role from its coverage cells.
///
/// Cells hold daily averages, so `Σ (need - actual) × slot_hours` is already
/// a daily rate. A cell without need counts as need 0.
pub fn compute_role_shortage<'c>(
    role: &str,
    cells: impl IntoIterator<Item = &'c CoverageCell>,
    slot_hours: f64,
    staff_count: usize,
    tolerance: f64,
) -> ShortageRecord {
    let (need, actual) = cells.into_iter().fold((0.0, 0.0), |(n, a), c| {
        (n + c.need.unwrap_or(0.0), a + c.actual)
    });
    ShortageRecord::new(
        ShortageScope::Role,
        need * slot_hours,
        actual * slot_hours,
        staff_count,
        tolerance,
    )
    .with_role(role)
}

/// Splits a role record across employment types by their share of the
/// role's allocated slots. The parts sum to the role record.
pub fn compute_employment_shortage(
    role_record: &ShortageRecord,
    role_actual: Option<&RoleActual>,
    tolerance: f64,
) -> Vec<ShortageRecord> {
    let role = role_record.role_name();
    let shares = role_actual
        .map(|r| r.employment_shares())
        .unwrap_or_default();

    if shares.is_empty() {
        return vec![ShortageRecord::new(
            ShortageScope::Employment,
            role_record.need_daily_hours,
            role_record.actual_daily_hours,
            0,
            tolerance,
        )
        .with_role(role)
        .with_employment(UNASSIGNED_EMPLOYMENT)];
    }

    shares
        .iter()
        .map(|(employment, share)| {
            let staff = role_actual
                .and_then(|r| r.employment.get(employment))
                .map(|e| e.staff.len())
                .unwrap_or(0);
            ShortageRecord::new(
                ShortageScope::Employment,
                role_record.need_daily_hours * share,
                role_record.actual_daily_hours * share,
                staff,
                tolerance,
            )
            .with_role(role)
            .with_employment(employment.clone())
        })
        .collect()
}

pub fn compute_organization_shortage(
    roles: &[ShortageRecord],
    total_staff: usize,
    tolerance: f64,
) -> ShortageRecord {
    let need = roles.iter().map(|r| r.need_daily_hours).sum();
    let actual = roles.iter().map(|r| r.actual_daily_hours).sum();
    ShortageRecord::new(ShortageScope::Organization, need, actual, total_staff, tolerance)
}

/// Roles by signed shortage, largest first; ties by name.
pub fn rank_roles(roles: &[ShortageRecord]) -> Vec<RankedRole> {
    let mut sorted: Vec<&ShortageRecord> = roles.iter().collect();
    sorted.sort_by(|a, b| {
        b.shortage_daily_hours
            .partial_cmp(&a.shortage_daily_hours)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.role_name().cmp(b.role_name()))
    });
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, r)| RankedRole {
            rank: i + 1,
            role: r.role_name().to_string(),
            shortage_daily_hours: r.shortage_daily_hours,
            status: r.status,
        })
        .collect()
}

pub struct ShortageAggregator<'a> {
    config: &'a ShortageConfig,
}

impl<'a> ShortageAggregator<'a> {
    pub fn new(config: &'a ShortageConfig) -> Self {
        Self { config }
    }

    pub fn aggregate(
        &self,
        matrix: &CoverageMatrix,
        roles: &[AnalysisRole],
        actual: &NormalizedActual,
    ) -> ShortageSummary {
        let tolerance = self.config.balance_tolerance_hours;
        let slot_hours = actual.grid.slot_hours();

        let mut cells_by_role: BTreeMap<&str, Vec<&CoverageCell>> = BTreeMap::new();
        for cell in &matrix.cells {
            cells_by_role.entry(cell.role.as_str()).or_default().push(cell);
        }

        let mut role_records = Vec::with_capacity(roles.len());
        let mut employment_records = Vec::new();
        for role in roles {
            let role_actual = role.actual_role.as_deref().and_then(|n| actual.role(n));
            let staff = role_actual.map(|r| r.staff.len()).unwrap_or(0);
            let cells = cells_by_role
                .get(role.name.as_str())
                .map(|c| c.iter().copied())
                .into_iter()
                .flatten();
            let record = compute_role_shortage(&role.name, cells, slot_hours, staff, tolerance);
            employment_records.extend(compute_employment_shortage(&record, role_actual, tolerance));
            role_records.push(record);
        }

        let organization = compute_organization_shortage(&role_records, actual.total_staff, tolerance);
        let masking = detect_masking(&role_records, &organization, self.config);
        let ranking = rank_roles(&role_records);

        info!(
            roles = role_records.len(),
            organization_shortage = organization.shortage_daily_hours,
            hidden_by_aggregation = masking.hidden_by_aggregation,
            "Aggregated shortages"
        );

        ShortageSummary {
            roles: role_records,
            employment: employment_records,
            organization,
            ranking,
            masking,
        }
    }
}
