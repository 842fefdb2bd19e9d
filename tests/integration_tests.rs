use contract_compliance::{
    analyze_contract_text, AnalysisEvent, AnalysisMode, AnalysisOutcome, ChatMessage, ChatModel,
    ComplianceError, ContractAnalyzer,
};
use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Replays canned responses in order, in place of a live endpoint.
struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedModel {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
        }
    }
}

impl ChatModel for ScriptedModel {
    async fn chat(
        &self,
        _model: &str,
        _temperature: f32,
        _messages: &[ChatMessage],
    ) -> contract_compliance::Result<String> {
        let mut responses = self.responses.lock().unwrap();
        Ok(responses
            .pop_front()
            .expect("scripted model ran out of responses"))
    }
}

fn analyzer(responses: &[&str]) -> ContractAnalyzer<ScriptedModel> {
    ContractAnalyzer::new(ScriptedModel::new(responses), "mistral:latest")
}

const CONFORMING_RESPONSE: &str = r#"{
    "compliance_passed": [{"rule": "Governing Law", "report": "Clause 12 names English law"}],
    "compliance_failed": [{
        "rule": "Termination Clause",
        "issue_detected": "No termination clause present",
        "best_practice": "Include explicit termination terms",
        "suggested": "Add a termination section"
    }],
    "compliance_score": 50.0,
    "summary": "Contract fails 1 of 2 rules."
}"#;

fn sample_rules() -> Vec<contract_compliance::ComplianceRule> {
    let csv = "\
name,completion_criteria,description,instructions
Termination Clause,Contract specifies termination conditions,Checks termination terms,Look for a termination section
Governing Law,Governing law is named,Checks jurisdiction,Search for governing law wording
";
    contract_compliance::checklist::read_rules(csv.as_bytes()).unwrap()
}

fn write_checklist(file_name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(file_name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[tokio::test]
async fn structured_mode_round_trips_conforming_json() {
    let analyzer = analyzer(&[CONFORMING_RESPONSE]);
    let outcome = analyzer.analyze("contract text", &sample_rules()).await.unwrap();

    let report = outcome.report().expect("structured mode yields a report");
    assert_eq!(report.compliance_passed.len(), 1);
    assert_eq!(report.compliance_failed.len(), 1);
    assert_eq!(report.compliance_score, 50.0);
    assert_eq!(report.summary, "Contract fails 1 of 2 rules.");
    assert_eq!(report.compliance_failed[0].rule, "Termination Clause");

    // Loose contract held by this fixture: every reported rule name exists
    // in the checklist.
    let names: Vec<String> = sample_rules().iter().map(|r| r.name.clone()).collect();
    for passed in &report.compliance_passed {
        assert!(names.contains(&passed.rule));
    }
    for failed in &report.compliance_failed {
        assert!(names.contains(&failed.rule));
    }
}

#[tokio::test]
async fn structured_mode_accepts_fenced_json() {
    let fenced = format!("```json\n{}\n```", CONFORMING_RESPONSE);
    let analyzer = analyzer(&[fenced.as_str()]);
    let outcome = analyzer.analyze("contract text", &sample_rules()).await.unwrap();
    assert!(outcome.report().is_some());
}

#[tokio::test]
async fn structured_mode_fails_after_exhausting_repairs() {
    let analyzer = analyzer(&[
        "the contract looks fine to me",
        "still not json",
        "nope",
    ]);
    let err = analyzer
        .analyze("contract text", &sample_rules())
        .await
        .unwrap_err();
    assert!(matches!(err, ComplianceError::SchemaValidation(_)));
    assert!(err.to_string().contains("not valid JSON"));
}

#[tokio::test]
async fn structured_mode_recovers_via_corrective_reprompt() {
    let analyzer = analyzer(&["I believe the contract is compliant.", CONFORMING_RESPONSE]);
    let outcome = analyzer.analyze("contract text", &sample_rules()).await.unwrap();
    assert!(outcome.report().is_some());
}

#[tokio::test]
async fn structured_mode_recovers_via_json_patch() {
    // First response parses but omits `summary`; the scripted patch adds it.
    let missing_summary = r#"{
        "compliance_passed": [],
        "compliance_failed": [],
        "compliance_score": 100.0
    }"#;
    let patch = r#"[{"op": "add", "path": "/summary", "value": "All rules passed."}]"#;

    let analyzer = analyzer(&[missing_summary, patch]);
    let outcome = analyzer.analyze("contract text", &sample_rules()).await.unwrap();

    let report = outcome.report().unwrap();
    assert_eq!(report.summary, "All rules passed.");
    assert_eq!(report.compliance_score, 100.0);
}

#[tokio::test]
async fn schema_error_reports_every_missing_field() {
    let analyzer = analyzer(&["{}"]).with_repair_attempts(0);
    let err = analyzer
        .analyze("contract text", &sample_rules())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("compliance_passed"));
    assert!(message.contains("compliance_failed"));
    assert!(message.contains("compliance_score"));
    assert!(message.contains("summary"));
}

#[tokio::test]
async fn freeform_mode_returns_raw_text() {
    let analyzer = analyzer(&["The contract is missing a termination clause."])
        .with_mode(AnalysisMode::Freeform);
    let outcome = analyzer.analyze("contract text", &sample_rules()).await.unwrap();

    match outcome {
        AnalysisOutcome::Text(text) => {
            assert_eq!(text, "The contract is missing a termination clause.");
        }
        AnalysisOutcome::Report(_) => panic!("freeform mode must not build a report"),
    }
}

#[tokio::test]
async fn progress_events_are_emitted() {
    let (tx, mut rx) = tokio::sync::mpsc::channel(32);
    let analyzer = analyzer(&[CONFORMING_RESPONSE]);
    analyzer
        .analyze_with_events("contract text", &sample_rules(), Some(tx))
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert!(matches!(events.first(), Some(AnalysisEvent::Starting)));
    assert!(matches!(events.last(), Some(AnalysisEvent::Success)));
}

#[tokio::test]
async fn end_to_end_single_failed_rule() {
    let checklist_path = write_checklist(
        "contract_compliance_e2e_checklist.csv",
        "name,completion_criteria,description,instructions\n\
         Termination Clause,Contract specifies termination conditions,\
         Checks that the contract defines how it can be ended,\
         Look for a termination or duration section\n",
    );

    let response = r#"{
        "compliance_passed": [],
        "compliance_failed": [{
            "rule": "Termination Clause",
            "issue_detected": "No termination clause present",
            "best_practice": "Include explicit termination terms",
            "suggested": "Add a termination section"
        }],
        "compliance_score": 0.0,
        "summary": "Contract fails 1 of 1 rules."
    }"#;

    let analyzer = analyzer(&[response]);
    let markdown = analyze_contract_text(
        &analyzer,
        &checklist_path,
        "This agreement has no termination clause.",
    )
    .await
    .unwrap();

    assert!(markdown.contains("##### ❌ Compliance Rule 1: Termination Clause."));
    assert!(markdown.contains("- Issue Detected: No termination clause present."));
    assert!(markdown.contains("##### Compliance Score: 0.0%"));
    assert!(markdown.contains("##### Summary: Contract fails 1 of 1 rules."));
    assert!(!markdown.contains("✅"));

    std::fs::remove_file(checklist_path).ok();
}

#[tokio::test]
async fn missing_checklist_fails_before_model_call() {
    let analyzer = analyzer(&[]);
    let err = analyze_contract_text(
        &analyzer,
        std::path::Path::new("/nonexistent/checklist.csv"),
        "contract text",
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ComplianceError::DataLoad(_)));
}
