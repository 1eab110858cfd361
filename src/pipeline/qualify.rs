use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::RULE_VERSION;
use crate::domain::states::is_us_state_code;
use crate::pipeline::normalize::NormalizedRecord;

/// A record that has been through the qualification gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualifiedRecord {
    pub record: NormalizedRecord,
    pub result: QualificationResult,
    pub assessed_at: DateTime<Utc>,
}

/// The gate's verdict for one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualificationResult {
    /// Whether the record is eligible for external postal validation
    pub qualified: bool,
    /// Issues found, in the order the rules ran
    pub issues: Vec<QualificationIssue>,
    /// The rule set version used
    pub rule_version: String,
}

impl QualificationResult {
    /// Human-readable messages for disqualifying issues, in rule order.
    pub fn error_messages(&self) -> Vec<String> {
        self.issues
            .iter()
            .filter(|issue| issue.severity >= IssueSeverity::Error)
            .map(|issue| issue.message.clone())
            .collect()
    }

    /// All warning-level messages.
    pub fn warning_messages(&self) -> Vec<String> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Warning)
            .map(|issue| issue.message.clone())
            .collect()
    }
}

/// Individual issue found during qualification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualificationIssue {
    pub issue_type: IssueType,
    pub severity: IssueSeverity,
    pub message: String,
    /// Canonical field that triggered this issue
    pub field: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueType {
    MissingData,
    InvalidFormat,
    InternationalAddress,
    SuspiciousValue,
}

/// Severity ladder; anything at Error or above disqualifies the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Configuration for the qualification rules.
#[derive(Debug, Clone)]
pub struct QualificationConfig {
    /// Rule version identifier stamped on every result
    pub rule_version: String,
    /// Require first and last name to be present for qualification.
    /// Off by default: a deliverable address with no contact name is
    /// still worth validating.
    pub require_person_name: bool,
}

impl Default for QualificationConfig {
    fn default() -> Self {
        Self {
            rule_version: RULE_VERSION.to_string(),
            require_person_name: false,
        }
    }
}

static US_ZIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}(?:-\d{4})?$").unwrap());

/// Trait for implementing qualification gate logic.
pub trait QualificationGate {
    /// Assess whether a normalized record may be sent for postal validation.
    fn assess(&self, record: &NormalizedRecord) -> anyhow::Result<QualifiedRecord>;
}

/// Default rule-based gate.
pub struct DefaultQualificationGate {
    pub config: QualificationConfig,
}

impl DefaultQualificationGate {
    pub fn new() -> Self {
        Self {
            config: QualificationConfig::default(),
        }
    }

    pub fn with_config(config: QualificationConfig) -> Self {
        Self { config }
    }

    fn assess_street(&self, record: &NormalizedRecord) -> Vec<QualificationIssue> {
        let street = &record.address.street_address;
        if street.is_empty() {
            return vec![QualificationIssue {
                issue_type: IssueType::MissingData,
                severity: IssueSeverity::Error,
                message: "missing street address".to_string(),
                field: Some("street_address".to_string()),
            }];
        }

        // PO Boxes, rural routes and general delivery are deliverable;
        // nothing to flag for them.
        Vec::new()
    }

    fn assess_city(&self, record: &NormalizedRecord) -> Vec<QualificationIssue> {
        if record.address.city.is_empty() {
            return vec![QualificationIssue {
                issue_type: IssueType::MissingData,
                severity: IssueSeverity::Error,
                message: "missing city".to_string(),
                field: Some("city".to_string()),
            }];
        }
        Vec::new()
    }

    fn assess_state_and_zip(&self, record: &NormalizedRecord) -> Vec<QualificationIssue> {
        let mut issues = Vec::new();
        let state = &record.address.state;
        let zip = &record.address.zip_code;

        let state_valid = !state.is_empty() && is_us_state_code(state);
        let zip_shaped = US_ZIP.is_match(zip);
        let zip_all_zeros = zip
            .chars()
            .filter(|c| c.is_ascii_digit())
            .all(|c| c == '0')
            && zip.chars().any(|c| c.is_ascii_digit());

        if state.is_empty() {
            issues.push(QualificationIssue {
                issue_type: IssueType::MissingData,
                severity: IssueSeverity::Error,
                message: "missing state".to_string(),
                field: Some("state".to_string()),
            });
        } else if !state_valid {
            // A non-US region code alongside a non-US postal code reads as
            // a foreign address rather than a typo
            if !zip.is_empty() && !zip_shaped {
                issues.push(QualificationIssue {
                    issue_type: IssueType::InternationalAddress,
                    severity: IssueSeverity::Critical,
                    message: "international address".to_string(),
                    field: Some("state".to_string()),
                });
                return issues;
            }

            issues.push(QualificationIssue {
                issue_type: IssueType::InvalidFormat,
                severity: IssueSeverity::Error,
                message: format!("invalid state code '{}'", state),
                field: Some("state".to_string()),
            });
        }

        if zip.is_empty() {
            issues.push(QualificationIssue {
                issue_type: IssueType::MissingData,
                severity: IssueSeverity::Error,
                message: "missing ZIP code".to_string(),
                field: Some("zip_code".to_string()),
            });
        } else if !zip_shaped {
            issues.push(QualificationIssue {
                issue_type: IssueType::InvalidFormat,
                severity: IssueSeverity::Error,
                message: format!("invalid ZIP code '{}'", zip),
                field: Some("zip_code".to_string()),
            });
        } else if zip_all_zeros {
            issues.push(QualificationIssue {
                issue_type: IssueType::SuspiciousValue,
                severity: IssueSeverity::Error,
                message: format!("invalid ZIP code '{}'", zip),
                field: Some("zip_code".to_string()),
            });
        }

        issues
    }

    fn assess_names(&self, record: &NormalizedRecord) -> Vec<QualificationIssue> {
        let severity = if self.config.require_person_name {
            IssueSeverity::Error
        } else {
            IssueSeverity::Warning
        };

        let mut issues = Vec::new();
        if record.address.first_name.is_empty() {
            issues.push(QualificationIssue {
                issue_type: IssueType::MissingData,
                severity,
                message: "missing first name".to_string(),
                field: Some("first_name".to_string()),
            });
        }
        if record.address.last_name.is_empty() {
            issues.push(QualificationIssue {
                issue_type: IssueType::MissingData,
                severity,
                message: "missing last name".to_string(),
                field: Some("last_name".to_string()),
            });
        }
        issues
    }
}

impl QualificationGate for DefaultQualificationGate {
    fn assess(&self, record: &NormalizedRecord) -> anyhow::Result<QualifiedRecord> {
        let mut issues = Vec::new();

        if record.address.is_address_empty() {
            issues.push(QualificationIssue {
                issue_type: IssueType::MissingData,
                severity: IssueSeverity::Critical,
                message: "no address data".to_string(),
                field: None,
            });
        } else {
            issues.extend(self.assess_street(record));
            issues.extend(self.assess_city(record));
            issues.extend(self.assess_state_and_zip(record));
        }

        issues.extend(self.assess_names(record));

        // Surface normalization notes as informational issues
        for warning in &record.report.warnings {
            issues.push(QualificationIssue {
                issue_type: IssueType::SuspiciousValue,
                severity: IssueSeverity::Info,
                message: warning.clone(),
                field: None,
            });
        }

        let qualified = !issues.iter().any(|issue| issue.severity >= IssueSeverity::Error);

        Ok(QualifiedRecord {
            record: record.clone(),
            result: QualificationResult {
                qualified,
                issues,
                rule_version: self.config.rule_version.clone(),
            },
            assessed_at: Utc::now(),
        })
    }
}

impl Default for DefaultQualificationGate {
    fn default() -> Self {
        Self::new()
    }
}
