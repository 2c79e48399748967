//! JSON Lines files: prompt templates, model completions and fine-tuning
//! records.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DatasetError;

/// A stored prompt or completion, one per line as `{"text": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptLine {
    pub text: String,
}

/// Reads prompt templates from a JSONL file. Blank lines are skipped.
pub fn read_prompt_templates(path: &Path) -> Result<Vec<String>, DatasetError> {
    let templates = read_text_lines(path)?;
    debug!(path = %path.display(), count = templates.len(), "Loaded prompt templates");
    Ok(templates)
}

/// Reads model completions, one `{"text": ...}` per prompt. Blank lines are
/// skipped.
pub fn read_completions(path: &Path) -> Result<Vec<String>, DatasetError> {
    let completions = read_text_lines(path)?;
    debug!(path = %path.display(), count = completions.len(), "Loaded completions");
    Ok(completions)
}

fn read_text_lines(path: &Path) -> Result<Vec<String>, DatasetError> {
    let content = fs::read_to_string(path)?;

    let mut texts = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed: PromptLine =
            serde_json::from_str(line).map_err(|e| DatasetError::InvalidRecord {
                line: line_no + 1,
                message: e.to_string(),
            })?;
        texts.push(parsed.text);
    }
    Ok(texts)
}

/// Writes non-empty prompts as `{"text": ...}` lines.
pub fn write_prompts(path: &Path, prompts: &[String]) -> Result<(), DatasetError> {
    let lines = prompts
        .iter()
        .filter(|p| !p.is_empty())
        .map(|text| PromptLine { text: text.clone() });
    write_jsonl(path, lines)
}

/// Serializes each record as one JSON line.
pub fn write_jsonl<T, I>(path: &Path, records: I) -> Result<(), DatasetError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
