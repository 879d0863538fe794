//! Prompts
//!
//! Interactive terminal prompts for the setup wizard.
//! Uses the `dialoguer` crate for input handling.

use anyhow::Result;
use colored::Colorize;
use dialoguer::Input;
use regex::Regex;

/// Prompt the user for a required string value.
/// Repeats until a non-empty value is entered.
pub fn prompt_required(label: &str) -> Result<String> {
    loop {
        let value: String = Input::new()
            .with_prompt(format!("  {} {}", "\u{2192}".cyan(), label.white()))
            .allow_empty(true)
            .interact_text()?;

        let trimmed = value.trim().to_string();
        if !trimmed.is_empty() {
            return Ok(trimmed);
        }
        println!("{}", "  This field is required.".yellow());
    }
}

/// Prompt the user for a value with a pre-filled default.
pub fn prompt_with_default(label: &str, default: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(format!("  {} {}", "\u{2192}".cyan(), label.white()))
        .default(default.to_string())
        .interact_text()?;
    Ok(value.trim().to_string())
}

/// Prompt the user for a Google Cloud project id with validation:
/// 6-30 characters, lowercase letters, digits and hyphens, starting
/// with a letter and not ending with a hyphen.
pub fn prompt_project_id(label: &str) -> Result<String> {
    let re = Regex::new(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$")?;

    loop {
        let value = prompt_required(label)?;
        if re.is_match(&value) {
            return Ok(value);
        }
        println!(
            "{}",
            "  Invalid project id. Use 6-30 lowercase letters, digits, and hyphens.".yellow()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_id_pattern() {
        let re = Regex::new(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$").unwrap();
        assert!(re.is_match("vertex-ai-demo-468112"));
        assert!(re.is_match("my-project"));
        assert!(!re.is_match("My-Project"));
        assert!(!re.is_match("short"));
        assert!(!re.is_match("ends-with-"));
        assert!(!re.is_match("1starts-with-digit"));
    }
}
