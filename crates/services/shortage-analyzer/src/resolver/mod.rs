//! Role identity resolution between the allocation and need datasets.
//!
//! Three greedy passes over lexically sorted names: exact equality,
//! case-insensitive substring containment, then shared domain keyword. A
//! need role is claimed by at most one actual role, so an earlier weaker
//! match can take a need role a later actual role would match better.

use crate::config::ResolverConfig;
use crate::error::{AnalyzerErrorExt, InsightError};
use crate::models::{AnalysisIssue, MatchMethod, RoleMapping, RoleResolution};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

const EXACT_CONFIDENCE: f64 = 1.0;
const SUBSTRING_BASE_CONFIDENCE: f64 = 0.6;
const SUBSTRING_RATIO_WEIGHT: f64 = 0.3;
const KEYWORD_CONFIDENCE: f64 = 0.5;

pub struct RoleResolver {
    keywords: Vec<String>,
}

impl RoleResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self::with_keywords(config.keywords.iter().cloned())
    }

    pub fn with_keywords(keywords: impl IntoIterator<Item = String>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn resolve(
        &self,
        actual_roles: &BTreeSet<String>,
        need_roles: &BTreeSet<String>,
    ) -> RoleResolution {
        let mut matched: BTreeMap<&str, RoleMapping> = BTreeMap::new();
        let mut claimed: BTreeSet<&str> = BTreeSet::new();

        for actual in actual_roles {
            if need_roles.contains(actual) {
                claimed.insert(actual.as_str());
                matched.insert(
                    actual.as_str(),
                    RoleMapping::matched(actual, actual, MatchMethod::Exact, EXACT_CONFIDENCE),
                );
            }
        }

        for actual in actual_roles {
            if matched.contains_key(actual.as_str()) {
                continue;
            }
            let a = normalize(actual);
            if a.is_empty() {
                continue;
            }
            let hit = need_roles
                .iter()
                .filter(|n| !claimed.contains(n.as_str()))
                .find_map(|n| {
                    let b = normalize(n);
                    if b.is_empty() || !(a.contains(&b) || b.contains(&a)) {
                        return None;
                    }
                    Some((n, substring_confidence(&a, &b)))
                });
            if let Some((need, confidence)) = hit {
                claimed.insert(need.as_str());
                matched.insert(
                    actual.as_str(),
                    RoleMapping::matched(actual, need, MatchMethod::Substring, confidence),
                );
            }
        }

        for actual in actual_roles {
            if matched.contains_key(actual.as_str()) {
                continue;
            }
            let a = normalize(actual);
            let hit = self
                .keywords
                .iter()
                .filter(|k| a.contains(k.as_str()))
                .find_map(|k| {
                    need_roles
                        .iter()
                        .filter(|n| !claimed.contains(n.as_str()))
                        .find(|n| normalize(n).contains(k.as_str()))
                        .map(|n| (n, k))
                });
            if let Some((need, keyword)) = hit {
                claimed.insert(need.as_str());
                matched.insert(
                    actual.as_str(),
                    RoleMapping::matched(actual, need, MatchMethod::Keyword, KEYWORD_CONFIDENCE)
                        .with_keyword(keyword.clone()),
                );
            }
        }

        let mut mappings = Vec::with_capacity(actual_roles.len());
        let mut unmatched_actual = Vec::new();
        for actual in actual_roles {
            match matched.remove(actual.as_str()) {
                Some(mapping) => {
                    debug!(
                        actual = %actual,
                        need = mapping.need_role.as_deref().unwrap_or_default(),
                        method = ?mapping.method,
                        confidence = mapping.confidence,
                        "Role matched"
                    );
                    mappings.push(mapping);
                }
                None => {
                    unmatched_actual.push(actual.clone());
                    mappings.push(RoleMapping::unmatched(actual));
                }
            }
        }
        let unmatched_need: Vec<String> = need_roles
            .iter()
            .filter(|n| !claimed.contains(n.as_str()))
            .cloned()
            .collect();

        info!(
            actual_roles = actual_roles.len(),
            need_roles = need_roles.len(),
            unmatched_actual = unmatched_actual.len(),
            unmatched_need = unmatched_need.len(),
            "Resolved role identities"
        );

        RoleResolution {
            mappings,
            unmatched_actual,
            unmatched_need,
        }
    }
}

pub const RESOLUTION_STAGE: &str = "role_resolution";

/// Non-fatal issues for every unresolved role in `resolution`.
pub fn mapping_issues(resolution: &RoleResolution) -> Vec<AnalysisIssue> {
    let actual = resolution.unmatched_actual.iter().map(|r| {
        (r, InsightError::unmatched_role(r, "no need grid matches; treated as 100% surplus"))
    });
    let need = resolution.unmatched_need.iter().map(|r| {
        (r, InsightError::unmatched_role(r, "no allocated role matches; treated as full shortage"))
    });
    actual
        .chain(need)
        .map(|(role, err)| AnalysisIssue {
            role: Some(role.clone()),
            stage: RESOLUTION_STAGE.to_string(),
            category: err.category(),
            detail: err.to_string(),
        })
        .collect()
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn substring_confidence(a: &str, b: &str) -> f64 {
    let (la, lb) = (a.chars().count(), b.chars().count());
    let (shorter, longer) = if la <= lb { (la, lb) } else { (lb, la) };
    let ratio = if longer == 0 {
        0.0
    } else {
        shorter as f64 / longer as f64
    };
    SUBSTRING_BASE_CONFIDENCE + SUBSTRING_RATIO_WEIGHT * ratio
}
