use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("Failed to load compliance checklist: {0}")]
    DataLoad(String),

    #[error("PDF text extraction failed: {0}")]
    Extraction(String),

    #[error("Model endpoint unreachable: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Model endpoint reported a failure (status {status}): {message}")]
    Model { status: u16, message: String },

    #[error("Model output did not conform to the report schema:\n{0}")]
    SchemaValidation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ComplianceError>;
