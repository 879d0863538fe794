//! Prompt Template Files
//!
//! Prompt templates are kept as JSON files in the prompts directory
//! so they can be reviewed and re-uploaded to the registry at any
//! time.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::agent::instruction::DEFAULT_INSTRUCTION;
use crate::types::{AppConfig, PromptTemplate};

/// Load a prompt template from a JSON file.
pub fn load_template(path: &Path) -> Result<PromptTemplate> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read prompt file {}", path.display()))?;
    let template: PromptTemplate = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse prompt file {}", path.display()))?;
    Ok(template)
}

/// Save a prompt template as pretty JSON, creating the directory if
/// needed.
pub fn save_template(dir: &Path, template: &PromptTemplate) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create prompts directory {}", dir.display()))?;

    let path = dir.join(format!("{}.json", template.name));
    let json = serde_json::to_string_pretty(template).context("Failed to serialize template")?;
    fs::write(&path, json)
        .with_context(|| format!("Failed to write prompt file {}", path.display()))?;
    Ok(path)
}

/// List template files in the prompts directory.
pub fn list_templates(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// The built-in converter prompt template, seeded into the prompts
/// directory on first setup.
pub fn default_template(config: &AppConfig) -> PromptTemplate {
    PromptTemplate {
        name: config.prompt_name.clone(),
        display_name: "CSV to JSON Converter".to_string(),
        description: "Instruction for the CSV to JSON converter agent".to_string(),
        content: DEFAULT_INSTRUCTION.to_string(),
        tags: vec!["csv".to_string(), "json".to_string(), "converter".to_string()],
        version: "1.0".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::default_config;

    fn temp_prompts_dir() -> PathBuf {
        std::env::temp_dir().join(format!("tabula-prompts-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = temp_prompts_dir();
        let template = default_template(&default_config());

        let path = save_template(&dir, &template).unwrap();
        let loaded = load_template(&path).unwrap();

        assert_eq!(loaded.name, template.name);
        assert_eq!(loaded.content, template.content);
        assert_eq!(loaded.tags, template.tags);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_list_templates_only_json() {
        let dir = temp_prompts_dir();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.json"), "{}").unwrap();
        fs::write(dir.join("notes.txt"), "x").unwrap();

        let files = list_templates(&dir);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.json"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_default_template_uses_configured_name() {
        let mut config = default_config();
        config.prompt_name = "my_prompt".to_string();
        let template = default_template(&config);
        assert_eq!(template.name, "my_prompt");
        assert!(!template.content.is_empty());
    }
}
