//! Audit records and the structured report returned by the analysis service.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Overall or per-risk severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Ordinal used for trend charts: Low=1, Medium=2, High=3.
    pub fn ordinal(self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown risk level: {0}")]
pub struct ParseRiskLevelError(pub String);

impl FromStr for RiskLevel {
    type Err = ParseRiskLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(ParseRiskLevelError(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One risk found in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskItem {
    pub name: String,
    pub why: String,
    /// Passage of the plan the risk was found in.
    pub reference: String,
    pub severity: RiskLevel,
}

/// Mitigation tied to a risk by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub risk_name: String,
    pub action: String,
}

/// Structured analysis payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub risk_level: RiskLevel,
    pub risk_justification: String,
    #[serde(default)]
    pub suggested_project_name: String,
    #[serde(default)]
    pub top_risks: Vec<RiskItem>,
    #[serde(default)]
    pub fix_now_suggestions: Vec<Suggestion>,
}

impl AuditReport {
    /// Suggestions addressing the named risk, in report order.
    pub fn suggestions_for<'a>(&'a self, risk_name: &'a str) -> impl Iterator<Item = &'a Suggestion> {
        self.fix_now_suggestions
            .iter()
            .filter(move |s| s.risk_name == risk_name)
    }
}

/// One completed audit. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: String,
    /// Creation instant, milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub risk_level: RiskLevel,
    pub project_name: String,
    pub report: AuditReport,
    /// Plan text the audit was run on.
    pub plan: String,
}

impl AuditRecord {
    /// Structural checks applied to records read back from storage.
    pub fn validate(&self) -> Result<(), InvalidRecord> {
        if self.id.trim().is_empty() {
            return Err(InvalidRecord::EmptyId);
        }
        if self.project_name.trim().is_empty() {
            return Err(InvalidRecord::EmptyProjectName(self.id.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRecord {
    #[error("record has an empty id")]
    EmptyId,
    #[error("record {0} has an empty project name")]
    EmptyProjectName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> AuditReport {
        AuditReport {
            risk_level: RiskLevel::High,
            risk_justification: "No owner and a four week timeline.".to_string(),
            suggested_project_name: "Cloud Migration".to_string(),
            top_risks: vec![RiskItem {
                name: "Ownership".to_string(),
                why: "Nobody is accountable.".to_string(),
                reference: "No specific owner assigned yet".to_string(),
                severity: RiskLevel::High,
            }],
            fix_now_suggestions: vec![Suggestion {
                risk_name: "Ownership".to_string(),
                action: "Name a single accountable lead.".to_string(),
            }],
        }
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let record = AuditRecord {
            id: "a1".to_string(),
            timestamp: 1_700_000_000_000,
            risk_level: RiskLevel::High,
            project_name: "Proj A".to_string(),
            report: sample_report(),
            plan: "plan".to_string(),
        };
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["riskLevel"], "High");
        assert_eq!(v["projectName"], "Proj A");
        assert_eq!(v["report"]["riskJustification"], "No owner and a four week timeline.");
        assert_eq!(v["report"]["fixNowSuggestions"][0]["riskName"], "Ownership");
    }

    #[test]
    fn risk_level_parses_any_case() {
        assert_eq!("low".parse::<RiskLevel>().unwrap(), RiskLevel::Low);
        assert_eq!(" MEDIUM ".parse::<RiskLevel>().unwrap(), RiskLevel::Medium);
        let lvl: RiskLevel = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(lvl, RiskLevel::High);
        assert!("critical".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn ordinals_follow_severity() {
        assert_eq!(RiskLevel::Low.ordinal(), 1);
        assert_eq!(RiskLevel::Medium.ordinal(), 2);
        assert_eq!(RiskLevel::High.ordinal(), 3);
        assert!(RiskLevel::Low < RiskLevel::High);
    }

    #[test]
    fn report_defaults_optional_lists() {
        let raw = r#"{"riskLevel":"Medium","riskJustification":"Vague scope."}"#;
        let report: AuditReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.risk_level, RiskLevel::Medium);
        assert!(report.top_risks.is_empty());
        assert!(report.suggested_project_name.is_empty());
    }

    #[test]
    fn suggestions_are_matched_by_risk_name() {
        let report = sample_report();
        assert_eq!(report.suggestions_for("Ownership").count(), 1);
        assert_eq!(report.suggestions_for("Timeline").count(), 0);
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let mut record = AuditRecord {
            id: " ".to_string(),
            timestamp: 0,
            risk_level: RiskLevel::Low,
            project_name: "x".to_string(),
            report: sample_report(),
            plan: String::new(),
        };
        assert_eq!(record.validate(), Err(InvalidRecord::EmptyId));
        record.id = "r1".to_string();
        record.project_name = String::new();
        assert_eq!(
            record.validate(),
            Err(InvalidRecord::EmptyProjectName("r1".to_string()))
        );
    }
}
