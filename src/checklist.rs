use crate::error::{ComplianceError, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// A single row of the compliance checklist dataset.
///
/// The checklist CSV must carry a header row with the columns
/// `name`, `completion_criteria`, `description` and `instructions`.
#[derive(Debug, Clone, Deserialize)]
pub struct ComplianceRule {
    /// Short identifier for the rule (e.g. "Termination Clause").
    pub name: String,
    /// What a compliant contract is expected to contain.
    pub completion_criteria: String,
    /// Longer description of what the check covers.
    pub description: String,
    /// Step-by-step review instructions handed to the model.
    pub instructions: String,
}

/// Reads the compliance checklist from `path`.
///
/// Row order is preserved; the order rules appear in the file is the order
/// they are described to the model. The file is re-read on every call.
pub fn load_checklist(path: &Path) -> Result<Vec<ComplianceRule>> {
    let file = std::fs::File::open(path).map_err(|e| {
        ComplianceError::DataLoad(format!("cannot open {}: {}", path.display(), e))
    })?;
    read_rules(file)
}

/// Deserializes checklist rows from any reader. Missing columns or
/// malformed rows fail the whole load.
pub fn read_rules<R: Read>(reader: R) -> Result<Vec<ComplianceRule>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rules = Vec::new();
    for (idx, row) in csv_reader.deserialize().enumerate() {
        let rule: ComplianceRule = row.map_err(|e| {
            ComplianceError::DataLoad(format!("row {}: {}", idx + 1, e))
        })?;
        rules.push(rule);
    }
    Ok(rules)
}

/// Renders the checklist into the plain-text block embedded in the system
/// prompt: one entry per rule, in input order.
pub fn render_checklist(rules: &[ComplianceRule]) -> String {
    let blocks: Vec<String> = rules
        .iter()
        .map(|rule| {
            format!(
                "* Compliance Rule: {}:\n    \
                 - Expected outcome: {}\n    \
                 - Check description: {}\n    \
                 - How to review:\n        {}\n",
                rule.name, rule.completion_criteria, rule.description, rule.instructions
            )
        })
        .collect();
    blocks.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKLIST_CSV: &str = "\
name,completion_criteria,description,instructions
Termination Clause,Contract specifies termination conditions,Checks termination terms,Look for a termination section
Liability Cap,Liability is capped,Checks limitation of liability,Find the liability clause and read the cap
Governing Law,Governing law is named,Checks jurisdiction,Search for governing law wording
";

    #[test]
    fn test_load_preserves_row_order() {
        let rules = read_rules(CHECKLIST_CSV.as_bytes()).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].name, "Termination Clause");
        assert_eq!(rules[1].name, "Liability Cap");
        assert_eq!(rules[2].name, "Governing Law");
        assert_eq!(
            rules[0].completion_criteria,
            "Contract specifies termination conditions"
        );
    }

    #[test]
    fn test_render_one_block_per_rule() {
        let rules = read_rules(CHECKLIST_CSV.as_bytes()).unwrap();
        let text = render_checklist(&rules);
        assert_eq!(text.matches("* Compliance Rule:").count(), 3);

        let first = text.find("Termination Clause").unwrap();
        let second = text.find("Liability Cap").unwrap();
        let third = text.find("Governing Law").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_missing_column_is_data_load_error() {
        let csv = "name,description\nTermination Clause,Checks termination terms\n";
        let err = read_rules(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ComplianceError::DataLoad(_)));
    }

    #[test]
    fn test_missing_file_is_data_load_error() {
        let err = load_checklist(Path::new("/nonexistent/checklist.csv")).unwrap_err();
        assert!(matches!(err, ComplianceError::DataLoad(_)));
    }

    #[test]
    fn test_empty_checklist_is_allowed() {
        let csv = "name,completion_criteria,description,instructions\n";
        let rules = read_rules(csv.as_bytes()).unwrap();
        assert!(rules.is_empty());
        assert_eq!(render_checklist(&rules), "");
    }
}
