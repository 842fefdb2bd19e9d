use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompliancePassed {
    #[schemars(description = "The compliance rule that was checked.")]
    pub rule: String,

    #[schemars(description = "The report generated during the compliance check.")]
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComplianceFailed {
    #[schemars(description = "The compliance rule that was checked.")]
    pub rule: String,

    #[schemars(description = "The issue detected during the compliance check.")]
    pub issue_detected: String,

    #[schemars(description = "The recommended best practice to address the issue.")]
    pub best_practice: String,

    #[schemars(description = "The suggested action to resolve the compliance issue.")]
    pub suggested: String,
}

/// Aggregate result of one analysis call. Constructed exactly once per
/// analysis, immutable afterwards, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComplianceReport {
    #[schemars(description = "List of compliance rules that passed.")]
    pub compliance_passed: Vec<CompliancePassed>,

    #[schemars(description = "List of compliance rules that failed.")]
    pub compliance_failed: Vec<ComplianceFailed>,

    #[schemars(description = "The overall compliance score as a percentage.")]
    pub compliance_score: f64,

    #[schemars(description = "A summary of the compliance check.")]
    pub summary: String,
}

impl ComplianceReport {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ComplianceReport)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    /// The score implied by the pass/fail counts, or `None` for an empty
    /// report. The model's self-reported `compliance_score` is trusted and
    /// not checked against this; callers that want stricter behavior can
    /// compare the two themselves.
    pub fn expected_score(&self) -> Option<f64> {
        let total = self.compliance_passed.len() + self.compliance_failed.len();
        if total == 0 {
            return None;
        }
        Some(self.compliance_passed.len() as f64 / total as f64 * 100.0)
    }

    /// Two-phase conversion from a generic JSON tree: every field is checked
    /// individually and all mismatches are reported together, rather than
    /// stopping at the first one.
    pub fn from_value(value: &Value) -> Result<Self, Vec<String>> {
        let Some(obj) = value.as_object() else {
            return Err(vec!["response root is not a JSON object".to_string()]);
        };

        let mut issues = Vec::new();

        let compliance_passed = match obj.get("compliance_passed") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    let path = format!("compliance_passed[{}]", i);
                    let rule = str_field(item, "rule", &path, &mut issues);
                    let report = str_field(item, "report", &path, &mut issues);
                    Some(CompliancePassed {
                        rule: rule?,
                        report: report?,
                    })
                })
                .collect(),
            Some(_) => {
                issues.push("`compliance_passed` is not an array".to_string());
                Vec::new()
            }
            None => {
                issues.push("missing required field `compliance_passed`".to_string());
                Vec::new()
            }
        };

        let compliance_failed = match obj.get("compliance_failed") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    let path = format!("compliance_failed[{}]", i);
                    let rule = str_field(item, "rule", &path, &mut issues);
                    let issue_detected = str_field(item, "issue_detected", &path, &mut issues);
                    let best_practice = str_field(item, "best_practice", &path, &mut issues);
                    let suggested = str_field(item, "suggested", &path, &mut issues);
                    Some(ComplianceFailed {
                        rule: rule?,
                        issue_detected: issue_detected?,
                        best_practice: best_practice?,
                        suggested: suggested?,
                    })
                })
                .collect(),
            Some(_) => {
                issues.push("`compliance_failed` is not an array".to_string());
                Vec::new()
            }
            None => {
                issues.push("missing required field `compliance_failed`".to_string());
                Vec::new()
            }
        };

        let compliance_score = match obj.get("compliance_score") {
            Some(v) => match v.as_f64() {
                Some(score) => score,
                None => {
                    issues.push("`compliance_score` is not a number".to_string());
                    0.0
                }
            },
            None => {
                issues.push("missing required field `compliance_score`".to_string());
                0.0
            }
        };

        let summary = match obj.get("summary") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                issues.push("`summary` is not a string".to_string());
                String::new()
            }
            None => {
                issues.push("missing required field `summary`".to_string());
                String::new()
            }
        };

        if !issues.is_empty() {
            return Err(issues);
        }

        Ok(ComplianceReport {
            compliance_passed,
            compliance_failed,
            compliance_score,
            summary,
        })
    }
}

fn str_field(item: &Value, field: &str, path: &str, issues: &mut Vec<String>) -> Option<String> {
    match item.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            issues.push(format!("`{}.{}` is not a string", path, field));
            None
        }
        None => {
            issues.push(format!("missing required field `{}.{}`", path, field));
            None
        }
    }
}

/// Renders a report as markdown: failed rules first, numbered from 1, then
/// passed rules continuing the numbering, then the score and summary lines.
/// Pure and total; identical input yields identical output.
pub fn format_compliance_report(report: &ComplianceReport) -> String {
    let mut formatted = Vec::new();

    for (idx, failure) in report.compliance_failed.iter().enumerate() {
        formatted.push(format!(
            "\n##### ❌ Compliance Rule {}: {}.\n\
             - Issue Detected: {}.\n\
             - Best Practice: {}.\n\
             - Suggested Fix: {}.\n",
            idx + 1,
            failure.rule,
            failure.issue_detected,
            failure.best_practice,
            failure.suggested
        ));
    }

    let offset = report.compliance_failed.len();
    for (idx, passed) in report.compliance_passed.iter().enumerate() {
        formatted.push(format!(
            "\n##### ✅ Compliance Rule {}: {}.\n\
             - Report: {}.\n",
            offset + idx + 1,
            passed.rule,
            passed.report
        ));
    }

    formatted.push(format!(
        "##### Compliance Score: {:.1}%",
        report.compliance_score
    ));
    formatted.push(format!("##### Summary: {}", report.summary));

    formatted.join("\n")
}
