use crate::config::ShortageConfig;
use crate::models::{MaskingAssessment, ShortageRecord, ShortageStatus};
use tracing::warn;

/// Checks whether a near-balanced organization total hides large role
/// imbalances or unstaffed roles.
pub fn detect_masking(
    roles: &[ShortageRecord],
    organization: &ShortageRecord,
    config: &ShortageConfig,
) -> MaskingAssessment {
    let org = organization.shortage_daily_hours;

    let mut max_imbalance = 0.0_f64;
    let mut most_imbalanced = None;
    for record in roles {
        let imbalance = record.shortage_daily_hours.abs();
        if imbalance > max_imbalance {
            max_imbalance = imbalance;
            most_imbalanced = record.role.clone();
        }
    }

    let unstaffed_roles: Vec<String> = roles
        .iter()
        .filter(|r| r.is_unstaffed())
        .map(|r| r.role_name().to_string())
        .collect();

    let hidden = org.abs() < config.masking_org_threshold_hours
        && (max_imbalance > config.masking_role_threshold_hours || !unstaffed_roles.is_empty());

    let explanation = hidden.then(|| {
        let mut parts = Vec::new();
        if max_imbalance > config.masking_role_threshold_hours {
            parts.push(format!(
                "role '{}' is off by {:.1} h/day",
                most_imbalanced.as_deref().unwrap_or_default(),
                max_imbalance
            ));
        }
        if !unstaffed_roles.is_empty() {
            parts.push(format!(
                "{} role(s) have need but no staff: {}",
                unstaffed_roles.len(),
                unstaffed_roles.join(", ")
            ));
        }
        format!(
            "organization balance of {org:.1} h/day masks role-level problems: {}",
            parts.join("; ")
        )
    });

    if hidden {
        warn!(
            organization_shortage = org,
            max_role_imbalance = max_imbalance,
            unstaffed = unstaffed_roles.len(),
            "Organization-level balance hides role imbalances"
        );
    }

    MaskingAssessment {
        hidden_by_aggregation: hidden,
        organization_shortage_hours: org,
        max_role_imbalance_hours: max_imbalance,
        most_imbalanced_role: most_imbalanced,
        unstaffed_roles,
        shortage_role_count: roles
            .iter()
            .filter(|r| r.status == ShortageStatus::Shortage)
            .count(),
        surplus_role_count: roles
            .iter()
            .filter(|r| r.status == ShortageStatus::Surplus)
            .count(),
        explanation,
    }
}
