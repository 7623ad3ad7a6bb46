use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Where a cell's target comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageMode {
    /// Target is the role's need grid.
    #[default]
    NeedBased,
    /// Target is the role's own historical mean over a baseline window.
    BaselineRelative,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    None,
    Moderate,
    Critical,
}

/// Coverage of one role in one slot, as daily averages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageCell {
    pub role: String,
    pub slot: usize,
    pub time: NaiveTime,
    /// Mean allocated staff over the allocation period.
    pub actual: f64,
    /// Target staff under `mode`.
    pub target: f64,
    /// Mean required staff from the need grid, when the role has one.
    pub need: Option<f64>,
    /// `actual / target`; `+inf` when only the target is zero.
    #[serde(with = "ratio_serde")]
    pub ratio: f64,
    pub severity: Severity,
    pub mode: CoverageMode,
}

impl CoverageCell {
    /// Staff missing against the target (negative when over target).
    pub fn gap(&self) -> f64 {
        self.target - self.actual
    }
}

/// Full per-(role, slot) matrix plus the shortage spots.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CoverageMatrix {
    pub slot_minutes: u32,
    pub cells: Vec<CoverageCell>,
    /// Cells with severity other than NONE, ratio ascending.
    pub shortage_spots: Vec<CoverageCell>,
}

impl CoverageMatrix {
    pub fn cells_for<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a CoverageCell> + 'a {
        self.cells.iter().filter(move |c| c.role == role)
    }

    pub fn critical_count(&self) -> usize {
        self.shortage_spots
            .iter()
            .filter(|c| c.severity == Severity::Critical)
            .count()
    }
}

/// Ratios are numbers in JSON except `+inf`, written as the string `"inf"`.
pub mod ratio_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub const INFINITY_TOKEN: &str = "inf";

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() && value.is_sign_positive() {
            serializer.serialize_str(INFINITY_TOKEN)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RatioRepr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match RatioRepr::deserialize(deserializer)? {
            RatioRepr::Number(v) => Ok(v),
            RatioRepr::Text(s) if s == INFINITY_TOKEN => Ok(f64::INFINITY),
            RatioRepr::Text(s) => Err(serde::de::Error::custom(format!(
                "invalid coverage ratio '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(ratio: f64) -> CoverageCell {
        CoverageCell {
            role: "nurse".into(),
            slot: 18,
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            actual: 2.0,
            target: 0.0,
            need: Some(0.0),
            ratio,
            severity: Severity::None,
            mode: CoverageMode::NeedBased,
        }
    }

    #[test]
    fn test_infinite_ratio_serializes_as_token() {
        let json = serde_json::to_value(cell(f64::INFINITY)).unwrap();
        assert_eq!(json["ratio"], "inf");

        let back: CoverageCell = serde_json::from_value(json).unwrap();
        assert!(back.ratio.is_infinite());
    }

    #[test]
    fn test_finite_ratio_is_number() {
        let json = serde_json::to_value(cell(0.25)).unwrap();
        assert_eq!(json["ratio"], 0.25);
        assert_eq!(json["severity"], "NONE");
        assert_eq!(json["mode"], "NEED_BASED");
    }

    #[test]
    fn test_gap() {
        assert_eq!(cell(1.0).gap(), -2.0);
    }
}
