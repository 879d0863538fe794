//! Agent Definition
//!
//! Builds the agent manifest uploaded at deploy time, and implements
//! the agent's conversational behavior locally so it can be exercised
//! before (and compared against) the hosted deployment.

pub mod instruction;

use crate::convert;
use crate::types::{AgentManifest, AppConfig};

/// Tool names advertised in the manifest.
pub const TOOL_NAMES: &[&str] = &["csv_to_json", "analyze_csv"];

/// Build the agent manifest from config plus a resolved instruction.
pub fn build_manifest(config: &AppConfig, instruction: &str) -> AgentManifest {
    AgentManifest {
        name: config.agent_name.clone(),
        model: config.model.clone(),
        description: config.agent_description.clone(),
        instruction: instruction.to_string(),
        tools: TOOL_NAMES.iter().map(|t| t.to_string()).collect(),
    }
}

/// Heuristic the agent uses to decide whether a query is CSV data.
pub fn looks_like_csv(input: &str) -> bool {
    input.contains(',') && input.contains('\n')
}

const GREETING: &str = "Hello! Send me CSV data to convert to JSON!";

const HELP: &str = "\
Hello! I'm the CSV to JSON Converter!

How to use:
1. Paste your CSV data directly
2. I'll convert it to JSON format
3. Get clean, formatted results

Example CSV:
name,age,city
John,25,NYC
Jane,30,LA

Just paste your CSV data and I'll handle the rest!";

const HINT: &str =
    "Please paste CSV data with column headers and comma-separated values.";

/// Process one query the way the deployed agent does: CSV input gets
/// analyzed and converted, greetings get usage help, anything else
/// gets a hint.
pub fn handle_query(query: &str) -> String {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return GREETING.to_string();
    }

    if looks_like_csv(trimmed) {
        let summary = match convert::analyze(trimmed) {
            Ok(s) => s,
            Err(e) => return format!("Analysis failed: {}", e),
        };
        let table = match convert::parse(trimmed) {
            Ok(t) => t,
            Err(e) => return format!("Conversion failed: {}", e),
        };

        return format!(
            "CSV to JSON Conversion Complete!\n\n\
             Analysis:\n\
             - Rows: {}\n\
             - Columns: {}\n\n\
             JSON Output:\n\
             ```json\n{}\n```\n\n\
             Successfully converted {} records!",
            summary.total_rows,
            summary.columns.join(", "),
            table.to_json_pretty(),
            table.len(),
        );
    }

    let lowered = trimmed.to_lowercase();
    if ["hello", "hi", "help"].iter().any(|w| lowered.contains(w)) {
        return HELP.to_string();
    }

    HINT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::default_config;

    #[test]
    fn test_manifest_carries_instruction_and_tools() {
        let config = default_config();
        let manifest = build_manifest(&config, instruction::DEFAULT_INSTRUCTION);
        assert_eq!(manifest.name, "csv-json-converter");
        assert_eq!(manifest.model, "gemini-2.0-flash");
        assert_eq!(manifest.instruction, instruction::DEFAULT_INSTRUCTION);
        assert_eq!(manifest.tools, vec!["csv_to_json", "analyze_csv"]);
    }

    #[test]
    fn test_csv_query_converts() {
        let response = handle_query("name,age\nJohn,25\nJane,30");
        assert!(response.contains("Rows: 2"));
        assert!(response.contains(r#""name": "John""#));
        assert!(response.contains("converted 2 records"));
    }

    #[test]
    fn test_malformed_csv_query_reports_error() {
        let response = handle_query("name,age\nJohn");
        assert!(response.contains("failed"));
        assert!(response.contains("expected 2 fields, found 1"));
    }

    #[test]
    fn test_greeting_gets_help() {
        assert!(handle_query("hello there").contains("CSV to JSON Converter"));
    }

    #[test]
    fn test_empty_query_gets_greeting() {
        assert_eq!(handle_query("  "), GREETING);
    }

    #[test]
    fn test_other_text_gets_hint() {
        assert_eq!(handle_query("what is the weather"), HINT);
    }
}
