use serde::{Deserialize, Serialize};

/// One message of the two-message chat payload (plus any corrective
/// follow-ups appended during structured-output repair).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatOptions {
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequestBody<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    pub options: ChatOptions,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseMessage {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseBody {
    pub message: Option<ResponseMessage>,
    pub error: Option<String>,
}

/// Progress notifications emitted during an analysis when the caller passes
/// a channel. Purely informational; dropping the receiver loses events but
/// never fails the analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnalysisEvent {
    Starting,
    Drafting,
    Validating { attempt: usize },
    CorrectionNeeded { reason: String },
    Patching { attempt: usize },
    Success,
    Failed { reason: String },
}
