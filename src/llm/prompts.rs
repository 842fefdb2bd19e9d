//! Static prompt templates for contract review.
//!
//! Templates carry `{placeholder}` slots substituted by the assembly
//! functions below; nothing here is mutated at runtime.

use crate::error::Result;
use crate::report::ComplianceReport;

pub const SYSTEM_TEMPLATE: &str = r#"AI Legal Contract Review Assistant

You are an AI-powered legal contract reviewer designed to assist users in analyzing contracts for compliance risks, missing clauses, and legal intent validation. You provide accurate and actionable insights.

Objectives:
1. Extract Key Clauses: Identify important legal clauses and their category (e.g., termination, liability, dispute resolution).
2. Check for Missing Terms: Compare the uploaded contract against best practices from the compliance checklist.
3. Assess Risks and Compliance: Highlight ambiguous or non-compliant clauses based on legal intent.
4. Provide Actionable Feedback: Offer clear, structured recommendations for contract improvements.

Behavioral Guidelines:
- Be Objective and Fact-Based: Insights should be grounded in the provided checklist.
- Use Clear, Legal-Friendly Language: Avoid unnecessary complexity while maintaining legal accuracy.
- Cite Evidence: When flagging risks or missing terms, refer to the relevant contract wording.
- Be Context-Aware: Understand contract categories (e.g., SaaS agreements, employment contracts, NDAs).

Compliance Rules:
{rules}

For each compliance rule, follow the "How to review" steps provided in the checklist to analyze the contract document. Ensure that all compliance rules are thoroughly analyzed, and provide detailed feedback for each rule based on the specified review steps.
"#;

pub const USER_TEMPLATE: &str = "\
Analyze this contract and list all compliance rules, including those that passed and those that failed.\n\
\n\
Contract PDF content:\n\
{contract}\n\
\n\
{format_instructions}";

pub const CORRECTION_TEMPLATE: &str = "\
Your previous response could not be processed:\n\
\n\
ERROR: {error}\n\
\n\
Respond again with the complete compliance report as a single valid JSON object \
conforming to the schema you were given. Do NOT include markdown code fences or \
any text outside the JSON object.";

pub const PATCH_TEMPLATE: &str = "\
The JSON you provided failed validation:\n\
\n\
ERROR: {error}\n\
\n\
TASK: Return a JSON Patch (RFC 6902) array to fix this. \
Do NOT return the full JSON. Return ONLY the patch array.\n\
Example: [{ \"op\": \"replace\", \"path\": \"/path/to/field\", \"value\": \"fixed_value\" }]";

/// System message: the fixed instruction template with the rendered
/// checklist embedded.
pub fn system_prompt(rules_text: &str) -> String {
    SYSTEM_TEMPLATE.replace("{rules}", rules_text)
}

/// User message: the contract text, plus formatting instructions when
/// structured output is requested. Empty contract text passes through
/// unchanged.
pub fn user_prompt(contract_text: &str, format_instructions: Option<&str>) -> String {
    USER_TEMPLATE
        .replace("{contract}", contract_text)
        .replace("{format_instructions}", format_instructions.unwrap_or(""))
}

/// Instructions describing the exact JSON shape a structured response must
/// conform to, built from the report schema.
pub fn format_instructions() -> Result<String> {
    let schema = ComplianceReport::schema_as_json()?;
    Ok(format!(
        "The output must be a single JSON object conforming to the JSON schema below.\n\
         \n\
         ```json\n{}\n```\n\
         \n\
         Return ONLY the JSON object. Do not include markdown code fences or any \
         text outside of it.",
        schema
    ))
}

pub fn correction_prompt(error: &str) -> String {
    CORRECTION_TEMPLATE.replace("{error}", error)
}

pub fn patch_prompt(error: &str) -> String {
    PATCH_TEMPLATE.replace("{error}", error)
}
