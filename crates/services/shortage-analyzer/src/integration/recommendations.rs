use crate::config::IntegrationConfig;
use crate::models::{
    Priority, Recommendation, RoleTrend, ShortageSummary, SkippedRole, TrendDirection,
};

pub struct RecommendationSet {
    pub recommendations: Vec<Recommendation>,
    pub immediate_staffing_roles: Vec<String>,
}

fn recommend(
    priority: Priority,
    category: &str,
    role: Option<&str>,
    message: String,
    action: &str,
) -> Recommendation {
    Recommendation {
        priority,
        category: category.to_string(),
        role: role.map(str::to_string),
        message,
        action: action.to_string(),
    }
}

/// Category and action for a skipped forecast, by skip reason.
fn skip_advice(reason: &str) -> (&'static str, &'static str) {
    match reason {
        "InsufficientDataError" => (
            "insufficient_history",
            "Collect more allocation history before relying on forecasts",
        ),
        "TimeoutError" => (
            "forecast_timeout",
            "Raise runtime.task_timeout_secs or reduce the model size",
        ),
        _ => (
            "forecast_failure",
            "Check the logged training error for this role",
        ),
    }
}

/// Applies the recommendation rules, most urgent first.
pub fn build_recommendations(
    summary: &ShortageSummary,
    trends: &[RoleTrend],
    skipped: &[SkippedRole],
    config: &IntegrationConfig,
) -> RecommendationSet {
    let mut recommendations = Vec::new();
    let mut immediate = Vec::new();

    for record in &summary.roles {
        let role = record.role_name();
        let shortage = record.shortage_daily_hours;
        let trend = trends
            .iter()
            .find(|t| t.role == role)
            .map(|t| t.direction);

        if record.is_unstaffed() {
            immediate.push(role.to_string());
            recommendations.push(recommend(
                Priority::Critical,
                "immediate_staffing",
                Some(role),
                format!(
                    "'{role}' needs {:.1} h/day but has no staff assigned",
                    record.need_daily_hours
                ),
                "Assign staff to this role immediately",
            ));
        }

        if shortage > config.urgent_shortage_hours {
            recommendations.push(recommend(
                Priority::High,
                "urgent_staffing_review",
                Some(role),
                format!("'{role}' is short {shortage:.1} h/day"),
                "Review staffing for this role urgently",
            ));
        }

        if shortage > config.moderate_shortage_hours && trend == Some(TrendDirection::Increasing) {
            recommendations.push(recommend(
                Priority::Medium,
                "rising_demand",
                Some(role),
                format!("'{role}' is short {shortage:.1} h/day and demand is forecast to rise"),
                "Plan for rising demand",
            ));
        }

        if -shortage > config.surplus_hours {
            recommendations.push(recommend(
                Priority::Low,
                "reallocation",
                Some(role),
                format!("'{role}' has a surplus of {:.1} h/day", -shortage),
                "Consider reallocating staff to roles in shortage",
            ));
        }
    }

    if summary.masking.hidden_by_aggregation {
        let detail = summary
            .masking
            .explanation
            .clone()
            .unwrap_or_else(|| "organization balance hides role imbalances".to_string());
        recommendations.push(recommend(
            Priority::Info,
            "aggregation_masking",
            None,
            detail,
            "Do not rely on organization-level balance; act on role-level results",
        ));
    }

    for skip in skipped {
        let (category, action) = skip_advice(&skip.reason);
        recommendations.push(recommend(
            Priority::Info,
            category,
            Some(&skip.role),
            format!("no forecast for '{}': {}", skip.role, skip.reason),
            action,
        ));
    }

    recommendations.sort_by_key(|r| r.priority);

    RecommendationSet {
        recommendations,
        immediate_staffing_roles: immediate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShortageConfig;
    use crate::models::{ShortageRecord, ShortageScope};
    use crate::shortage::{compute_organization_shortage, detect_masking, rank_roles};

    fn summary(roles: Vec<ShortageRecord>) -> ShortageSummary {
        let organization = compute_organization_shortage(&roles, 4, 0.1);
        let masking = detect_masking(&roles, &organization, &ShortageConfig::default());
        ShortageSummary {
            ranking: rank_roles(&roles),
            employment: Vec::new(),
            roles,
            organization,
            masking,
        }
    }

    fn record(role: &str, need: f64, actual: f64, staff: usize) -> ShortageRecord {
        ShortageRecord::new(ShortageScope::Role, need, actual, staff, 0.1).with_role(role)
    }

    fn trend(role: &str, direction: TrendDirection) -> RoleTrend {
        RoleTrend {
            role: role.to_string(),
            direction,
            forecast_daily_demand: 0.0,
            comparison_basis: 0.0,
            basis_is_shortage: true,
        }
    }

    #[test]
    fn test_priority_rules() {
        let s = summary(vec![
            record("cook", 3.0, 0.0, 0),
            record("nurse", 12.0, 6.0, 2),
            record("care", 6.0, 4.5, 1),
            record("admin", 2.0, 8.0, 1),
        ]);
        let trends = vec![trend("care", TrendDirection::Increasing)];
        let set = build_recommendations(&s, &trends, &[], &IntegrationConfig::default());

        assert_eq!(set.immediate_staffing_roles, vec!["cook".to_string()]);
        let by_role = |role: &str| -> Vec<Priority> {
            set.recommendations
                .iter()
                .filter(|r| r.role.as_deref() == Some(role))
                .map(|r| r.priority)
                .collect()
        };
        assert_eq!(by_role("cook"), vec![Priority::Critical]);
        assert_eq!(by_role("nurse"), vec![Priority::High]);
        assert_eq!(by_role("care"), vec![Priority::Medium]);
        assert_eq!(by_role("admin"), vec![Priority::Low]);

        let priorities: Vec<Priority> = set.recommendations.iter().map(|r| r.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn test_masking_and_skips_are_informational() {
        let s = summary(vec![record("a", 10.0, 4.0, 2), record("b", 4.0, 10.0, 2)]);
        let skipped = vec![SkippedRole {
            role: "b".to_string(),
            stage: "forecast".to_string(),
            reason: "InsufficientDataError".to_string(),
            detail: String::new(),
        }];
        let set = build_recommendations(&s, &[], &skipped, &IntegrationConfig::default());

        let info: Vec<&Recommendation> = set
            .recommendations
            .iter()
            .filter(|r| r.priority == Priority::Info)
            .collect();
        assert_eq!(info.len(), 2);
        assert!(info.iter().any(|r| r.category == "aggregation_masking"));
        assert!(info.iter().any(|r| r.category == "insufficient_history"));
        assert!(set.immediate_staffing_roles.is_empty());
    }

    #[test]
    fn test_unstaffed_role_with_large_shortage_is_also_urgent() {
        let s = summary(vec![record("cook", 5.0, 0.0, 0), record("nurse", 8.0, 8.0, 2)]);
        let set = build_recommendations(&s, &[], &[], &IntegrationConfig::default());

        let cook: Vec<&str> = set
            .recommendations
            .iter()
            .filter(|r| r.role.as_deref() == Some("cook"))
            .map(|r| r.category.as_str())
            .collect();
        assert_eq!(cook, vec!["immediate_staffing", "urgent_staffing_review"]);
        assert_eq!(set.immediate_staffing_roles, vec!["cook".to_string()]);
    }

    #[test]
    fn test_skip_advice_follows_reason() {
        let s = summary(vec![record("nurse", 8.0, 8.0, 2)]);
        let skip = |role: &str, reason: &str| SkippedRole {
            role: role.to_string(),
            stage: "forecast".to_string(),
            reason: reason.to_string(),
            detail: String::new(),
        };
        let skipped = vec![
            skip("a", "InsufficientDataError"),
            skip("b", "TimeoutError"),
            skip("c", "ModelTrainingFailure"),
            skip("d", "InternalError"),
        ];
        let set = build_recommendations(&s, &[], &skipped, &IntegrationConfig::default());

        let category = |role: &str| {
            set.recommendations
                .iter()
                .find(|r| r.role.as_deref() == Some(role))
                .map(|r| r.category.clone())
                .unwrap()
        };
        assert_eq!(category("a"), "insufficient_history");
        assert_eq!(category("b"), "forecast_timeout");
        assert_eq!(category("c"), "forecast_failure");
        assert_eq!(category("d"), "forecast_failure");
        assert!(set
            .recommendations
            .iter()
            .filter(|r| r.category != "insufficient_history")
            .all(|r| !r.action.contains("history")));
    }
}
