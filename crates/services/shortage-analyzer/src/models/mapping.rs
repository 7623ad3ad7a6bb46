use serde::{Deserialize, Serialize};

/// How an actual role was matched to a need role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchMethod {
    Exact,
    Substring,
    Keyword,
    Unmatched,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleMapping {
    pub actual_role: String,
    pub need_role: Option<String>,
    pub method: MatchMethod,
    pub confidence: f64,
    /// Keyword that produced a KEYWORD match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

impl RoleMapping {
    pub fn matched(
        actual_role: impl Into<String>,
        need_role: impl Into<String>,
        method: MatchMethod,
        confidence: f64,
    ) -> Self {
        Self {
            actual_role: actual_role.into(),
            need_role: Some(need_role.into()),
            method,
            confidence: confidence.clamp(0.0, 1.0),
            keyword: None,
        }
    }

    pub fn unmatched(actual_role: impl Into<String>) -> Self {
        Self {
            actual_role: actual_role.into(),
            need_role: None,
            method: MatchMethod::Unmatched,
            confidence: 0.0,
            keyword: None,
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn is_matched(&self) -> bool {
        self.need_role.is_some()
    }
}

/// Output of role identity resolution.
///
/// `mappings` holds one entry per actual role in sorted order, including
/// UNMATCHED entries. `unmatched_need` lists need roles no actual role maps to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoleResolution {
    pub mappings: Vec<RoleMapping>,
    pub unmatched_actual: Vec<String>,
    pub unmatched_need: Vec<String>,
}

/// A role as seen by the downstream engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRole {
    /// Display name: the actual role name, or the need role name when no
    /// actual role maps to it.
    pub name: String,
    pub actual_role: Option<String>,
    pub need_role: Option<String>,
}

impl RoleResolution {
    pub fn mapping_for(&self, actual_role: &str) -> Option<&RoleMapping> {
        self.mappings.iter().find(|m| m.actual_role == actual_role)
    }

    pub fn matched_count(&self) -> usize {
        self.mappings.iter().filter(|m| m.is_matched()).count()
    }

    /// All roles to analyze, sorted by name.
    pub fn analysis_roles(&self) -> Vec<AnalysisRole> {
        let mut roles: Vec<AnalysisRole> = self
            .mappings
            .iter()
            .map(|m| AnalysisRole {
                name: m.actual_role.clone(),
                actual_role: Some(m.actual_role.clone()),
                need_role: m.need_role.clone(),
            })
            .chain(self.unmatched_need.iter().map(|n| AnalysisRole {
                name: n.clone(),
                actual_role: None,
                need_role: Some(n.clone()),
            }))
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }
}
