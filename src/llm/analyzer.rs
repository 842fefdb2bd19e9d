use crate::checklist::{render_checklist, ComplianceRule};
use crate::error::{ComplianceError, Result};
use crate::llm::client::ChatModel;
use crate::llm::prompts;
use crate::llm::types::*;
use crate::report::{format_compliance_report, ComplianceReport};
use json_patch::Patch;
use log::{debug, warn};
use serde_json::Value;
use tokio::sync::mpsc::Sender;

const DEFAULT_REPAIR_ATTEMPTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// The model is instructed to emit JSON conforming to the report schema;
    /// the response is validated into a [`ComplianceReport`].
    Structured,
    /// The raw model response is returned unchanged; no validation is
    /// possible or attempted.
    Freeform,
}

#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Report(ComplianceReport),
    Text(String),
}

impl AnalysisOutcome {
    /// Markdown rendering of the outcome: the formatted report in structured
    /// mode, the raw model text in freeform mode.
    pub fn into_markdown(self) -> String {
        match self {
            AnalysisOutcome::Report(report) => format_compliance_report(&report),
            AnalysisOutcome::Text(text) => text,
        }
    }

    pub fn report(&self) -> Option<&ComplianceReport> {
        match self {
            AnalysisOutcome::Report(report) => Some(report),
            AnalysisOutcome::Text(_) => None,
        }
    }
}

/// Runs contract analyses against a chat model.
///
/// Owns report construction: either a fully validated [`ComplianceReport`]
/// comes out, or an error; no partial reports.
pub struct ContractAnalyzer<C: ChatModel> {
    client: C,
    model: String,
    mode: AnalysisMode,
    temperature: f32,
    repair_attempts: usize,
}

impl<C: ChatModel> ContractAnalyzer<C> {
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            mode: AnalysisMode::Structured,
            temperature: 0.0,
            repair_attempts: DEFAULT_REPAIR_ATTEMPTS,
        }
    }

    pub fn with_mode(mut self, mode: AnalysisMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// How many corrective round-trips are allowed after the first response
    /// before a structured analysis fails. Zero disables repair.
    pub fn with_repair_attempts(mut self, attempts: usize) -> Self {
        self.repair_attempts = attempts;
        self
    }

    pub async fn analyze(
        &self,
        contract_text: &str,
        rules: &[ComplianceRule],
    ) -> Result<AnalysisOutcome> {
        self.analyze_with_events(contract_text, rules, None).await
    }

    pub async fn analyze_with_events(
        &self,
        contract_text: &str,
        rules: &[ComplianceRule],
        progress: Option<Sender<AnalysisEvent>>,
    ) -> Result<AnalysisOutcome> {
        self.send_event(&progress, AnalysisEvent::Starting).await;

        let rules_text = render_checklist(rules);
        let system = prompts::system_prompt(&rules_text);
        let user = match self.mode {
            AnalysisMode::Structured => {
                let instructions = prompts::format_instructions()?;
                prompts::user_prompt(contract_text, Some(&instructions))
            }
            AnalysisMode::Freeform => prompts::user_prompt(contract_text, None),
        };

        let mut messages = vec![ChatMessage::system(system), ChatMessage::user(user)];

        self.send_event(&progress, AnalysisEvent::Drafting).await;

        let raw = self
            .client
            .chat(&self.model, self.temperature, &messages)
            .await?;

        match self.mode {
            AnalysisMode::Freeform => Ok(AnalysisOutcome::Text(raw)),
            AnalysisMode::Structured => self
                .validate_with_repair(raw, &mut messages, &progress)
                .await
                .map(AnalysisOutcome::Report),
        }
    }

    // Structured-mode validation loop. A response that parses as JSON but
    // fails the schema is repaired via an RFC 6902 patch against the model's
    // own output; a response that is not JSON at all triggers a corrective
    // re-prompt for the full object.
    async fn validate_with_repair(
        &self,
        first: String,
        messages: &mut Vec<ChatMessage>,
        progress: &Option<Sender<AnalysisEvent>>,
    ) -> Result<ComplianceReport> {
        let mut raw = first;
        let mut last_error = String::new();
        let total_attempts = self.repair_attempts + 1;

        for attempt in 1..=total_attempts {
            self.send_event(progress, AnalysisEvent::Validating { attempt })
                .await;

            let failure = match try_parse(&raw) {
                Ok(report) => {
                    self.send_event(progress, AnalysisEvent::Success).await;
                    return Ok(report);
                }
                Err(failure) => failure,
            };

            last_error = failure.reason();
            debug!("validation attempt {} failed: {}", attempt, last_error);

            if attempt == total_attempts {
                break;
            }

            self.send_event(
                progress,
                AnalysisEvent::CorrectionNeeded {
                    reason: last_error.clone(),
                },
            )
            .await;

            raw = match failure {
                ParseFailure::Invalid { value, .. } => {
                    self.send_event(progress, AnalysisEvent::Patching { attempt })
                        .await;
                    match self.request_patch(messages, &value, &last_error).await? {
                        Some(patched) => patched.to_string(),
                        None => self.request_full_correction(messages, &last_error).await?,
                    }
                }
                ParseFailure::NotJson(_) => {
                    messages.push(ChatMessage::assistant(raw.clone()));
                    self.request_full_correction(messages, &last_error).await?
                }
            };
        }

        self.send_event(
            progress,
            AnalysisEvent::Failed {
                reason: last_error.clone(),
            },
        )
        .await;
        Err(ComplianceError::SchemaValidation(last_error))
    }

    // Ask the model for an RFC 6902 patch against its own JSON. Transport
    // errors propagate; an unusable patch yields None so the caller can fall
    // back to a full corrective re-prompt.
    async fn request_patch(
        &self,
        messages: &mut Vec<ChatMessage>,
        current: &Value,
        error: &str,
    ) -> Result<Option<Value>> {
        messages.push(ChatMessage::assistant(current.to_string()));
        messages.push(ChatMessage::user(prompts::patch_prompt(error)));

        let patch_str = self
            .client
            .chat(&self.model, self.temperature, messages)
            .await?;
        let cleaned = clean_json_output(&patch_str);

        let patch: Patch = match serde_json::from_str(&cleaned) {
            Ok(patch) => patch,
            Err(e) => {
                warn!("repair patch is not valid JSON: {}", e);
                return Ok(None);
            }
        };

        let mut value = current.clone();
        if let Err(e) = json_patch::patch(&mut value, &patch) {
            warn!("repair patch failed to apply: {}", e);
            return Ok(None);
        }

        Ok(Some(value))
    }

    async fn request_full_correction(
        &self,
        messages: &mut Vec<ChatMessage>,
        error: &str,
    ) -> Result<String> {
        messages.push(ChatMessage::user(prompts::correction_prompt(error)));
        self.client
            .chat(&self.model, self.temperature, messages)
            .await
    }

    async fn send_event(&self, sender: &Option<Sender<AnalysisEvent>>, event: AnalysisEvent) {
        if let Some(tx) = sender {
            let _ = tx.send(event).await;
        }
    }
}

enum ParseFailure {
    NotJson(String),
    Invalid { value: Value, issues: Vec<String> },
}

impl ParseFailure {
    fn reason(&self) -> String {
        match self {
            ParseFailure::NotJson(msg) => msg.clone(),
            ParseFailure::Invalid { issues, .. } => issues.join("\n"),
        }
    }
}

fn try_parse(raw: &str) -> std::result::Result<ComplianceReport, ParseFailure> {
    let cleaned = clean_json_output(raw);
    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| ParseFailure::NotJson(format!("response is not valid JSON: {}", e)))?;
    ComplianceReport::from_value(&value).map_err(|issues| ParseFailure::Invalid { value, issues })
}

// Models often wrap JSON in code fences or prose. Slice out the first
// balanced-looking JSON object or array, whichever opens first.
fn clean_json_output(raw: &str) -> String {
    let obj = raw.find('{');
    let arr = raw.find('[');

    let sliced = match (obj, arr) {
        (Some(o), Some(a)) if a < o => raw.rfind(']').map(|end| &raw[a..=end]),
        (Some(o), _) => raw.rfind('}').map(|end| &raw[o..=end]),
        (None, Some(a)) => raw.rfind(']').map(|end| &raw[a..=end]),
        (None, None) => None,
    };

    sliced.unwrap_or(raw.trim()).to_string()
}
