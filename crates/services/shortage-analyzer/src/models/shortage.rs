use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShortageScope {
    Role,
    Employment,
    Organization,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShortageStatus {
    Shortage,
    Surplus,
    Balanced,
}

impl ShortageStatus {
    /// Classifies a signed daily shortage (positive = shortage).
    pub fn classify(shortage_daily_hours: f64, tolerance: f64) -> Self {
        if shortage_daily_hours.abs() <= tolerance {
            ShortageStatus::Balanced
        } else if shortage_daily_hours > 0.0 {
            ShortageStatus::Shortage
        } else {
            ShortageStatus::Surplus
        }
    }
}

/// Need versus actual in hours per day for one scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortageRecord {
    pub scope: ShortageScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment: Option<String>,
    pub need_daily_hours: f64,
    pub actual_daily_hours: f64,
    /// `need - actual`; positive means shortage.
    pub shortage_daily_hours: f64,
    pub status: ShortageStatus,
    pub staff_count: usize,
}

impl ShortageRecord {
    pub fn new(
        scope: ShortageScope,
        need_daily_hours: f64,
        actual_daily_hours: f64,
        staff_count: usize,
        tolerance: f64,
    ) -> Self {
        let shortage = need_daily_hours - actual_daily_hours;
        Self {
            scope,
            role: None,
            employment: None,
            need_daily_hours,
            actual_daily_hours,
            shortage_daily_hours: shortage,
            status: ShortageStatus::classify(shortage, tolerance),
            staff_count,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_employment(mut self, employment: impl Into<String>) -> Self {
        self.employment = Some(employment.into());
        self
    }

    pub fn role_name(&self) -> &str {
        self.role.as_deref().unwrap_or_default()
    }

    /// Zero assigned staff while something is needed.
    pub fn is_unstaffed(&self) -> bool {
        self.staff_count == 0 && self.need_daily_hours > f64::EPSILON
    }
}

/// Result of the aggregation-masking check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaskingAssessment {
    pub hidden_by_aggregation: bool,
    pub organization_shortage_hours: f64,
    pub max_role_imbalance_hours: f64,
    pub most_imbalanced_role: Option<String>,
    pub unstaffed_roles: Vec<String>,
    pub shortage_role_count: usize,
    pub surplus_role_count: usize,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedRole {
    pub rank: usize,
    pub role: String,
    pub shortage_daily_hours: f64,
    pub status: ShortageStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortageSummary {
    pub roles: Vec<ShortageRecord>,
    pub employment: Vec<ShortageRecord>,
    pub organization: ShortageRecord,
    pub ranking: Vec<RankedRole>,
    pub masking: MaskingAssessment,
}

impl ShortageSummary {
    pub fn role(&self, name: &str) -> Option<&ShortageRecord> {
        self.roles.iter().find(|r| r.role.as_deref() == Some(name))
    }

    pub fn employment_for<'a>(
        &'a self,
        role: &'a str,
    ) -> impl Iterator<Item = &'a ShortageRecord> + 'a {
        self.employment
            .iter()
            .filter(move |r| r.role.as_deref() == Some(role))
    }
}
