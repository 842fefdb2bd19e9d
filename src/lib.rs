//! # Contract Compliance
//!
//! A library for analyzing legal contracts against a compliance checklist
//! using an LLM served over an Ollama-style chat endpoint.
//!
//! ## Core Concepts
//!
//! - **Checklist**: a CSV of compliance rules (name, expected outcome,
//!   description, review instructions), rendered into the system prompt
//! - **Structured mode**: the model's output is constrained to and validated
//!   against the [`ComplianceReport`] JSON schema, with bounded corrective
//!   repair when the output does not conform
//! - **Freeform mode**: the model's output is returned as unvalidated text
//! - **Report**: passed and failed rules, a self-reported score, and a
//!   summary, rendered as markdown with failed rules listed first
//!
//! ## Example
//!
//! ```rust,ignore
//! use contract_compliance::*;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let analyzer = ModelConfig::default().build_analyzer()?;
//!     let markdown = analyze_contract_file(
//!         &analyzer,
//!         Path::new("data/legal_contract_review_checklist.csv"),
//!         Path::new("contract.pdf"),
//!     )
//!     .await?;
//!     println!("{}", markdown);
//!     Ok(())
//! }
//! ```

pub mod checklist;
pub mod error;
pub mod extract;
pub mod llm;
pub mod report;

pub use checklist::{load_checklist, render_checklist, ComplianceRule};
pub use error::{ComplianceError, Result};
pub use extract::{extract_text, extract_text_from_bytes};
pub use llm::*;
pub use report::*;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Endpoint configuration for the model call. Process-global in spirit
/// (there is one endpoint), but explicitly constructed and passed around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Whole-request deadline in seconds; `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "mistral:latest".to_string(),
            temperature: 0.0,
            timeout_secs: None,
        }
    }
}

impl ModelConfig {
    /// Defaults overridden by `OLLAMA_BASE_URL` and `OLLAMA_MODEL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var("OLLAMA_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            config.model = model;
        }
        config
    }

    pub fn build_analyzer(&self) -> Result<ContractAnalyzer<OllamaClient>> {
        let client = match self.timeout_secs {
            Some(secs) => OllamaClient::with_timeout(&self.base_url, Duration::from_secs(secs))?,
            None => OllamaClient::new(&self.base_url),
        };
        Ok(ContractAnalyzer::new(client, &self.model).with_temperature(self.temperature))
    }
}

/// Analyzes already-extracted contract text: loads the checklist, assembles
/// the prompt, invokes the model, and renders the outcome as markdown.
pub async fn analyze_contract_text<C: ChatModel>(
    analyzer: &ContractAnalyzer<C>,
    checklist_path: &Path,
    contract_text: &str,
) -> Result<String> {
    let rules = load_checklist(checklist_path)?;
    info!("Analyzing contract against {} compliance rules", rules.len());

    let outcome = analyzer.analyze(contract_text, &rules).await?;
    Ok(outcome.into_markdown())
}

/// Full pipeline for a contract PDF on disk: text extraction, then
/// [`analyze_contract_text`].
pub async fn analyze_contract_file<C: ChatModel>(
    analyzer: &ContractAnalyzer<C>,
    checklist_path: &Path,
    pdf_path: &Path,
) -> Result<String> {
    let contract_text = extract_text(pdf_path)?;
    debug!(
        "Extracted {} characters of contract text from {}",
        contract_text.len(),
        pdf_path.display()
    );
    analyze_contract_text(analyzer, checklist_path, &contract_text).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "mistral:latest");
        assert_eq!(config.temperature, 0.0);
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn test_build_analyzer_with_timeout() {
        let config = ModelConfig {
            timeout_secs: Some(120),
            ..ModelConfig::default()
        };
        assert!(config.build_analyzer().is_ok());
    }
}
