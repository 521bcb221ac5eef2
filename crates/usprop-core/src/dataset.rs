use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::normalize::TextNormalizer;
use crate::qa_table::QaTable;
use crate::types::{Dataset, QaRecord, Validity, REQUIRED_KEYS, TASK_NAME};

/// Default artifact file name used by the preparation tool.
pub const DEFAULT_OUTPUT_FILE: &str = "formatted_data.json";

#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    normalizer: TextNormalizer,
}

impl DatasetBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn with_normalizer(normalizer: TextNormalizer) -> Self { Self { normalizer } }

    /// One record per table entry, in table order.
    pub fn build(&self, raw: &QaTable) -> Result<Dataset> {
        if raw.is_empty() {
            return Err(Error::EmptyInput("Q/A data must be a non-empty mapping".to_string()));
        }
        let examples: Vec<QaRecord> = raw
            .iter()
            .map(|(question, answer)| QaRecord {
                question: self.normalizer.normalize(question),
                answer: self.normalizer.normalize(answer),
                original_question: question.to_string(),
                original_answer: answer.to_string(),
            })
            .collect();
        tracing::info!("Preprocessed {} question-answer pairs", examples.len());
        Ok(Dataset { task: TASK_NAME.to_string(), examples })
    }

    /// Build and validate; an invalid record set is an error.
    pub fn prepare_dataset(&self, raw: &QaTable) -> Result<Dataset> {
        let dataset = self.build(raw)?;
        match dataset.validate() {
            Validity::Valid => tracing::info!("Preprocessed data validated successfully"),
            Validity::Invalid(reason) => return Err(Error::Validation(reason)),
        }
        Ok(dataset)
    }

    /// Build, validate and serialize. Nothing is serialized if validation fails.
    pub fn prepare(&self, raw: &QaTable) -> Result<String> {
        serialize(&self.prepare_dataset(raw)?)
    }
}

impl Dataset {
    /// Validate the examples in their exchange form.
    pub fn validate(&self) -> Validity {
        let records: Vec<Value> = self.examples.iter().map(record_to_value).collect();
        validate(&records)
    }

    /// First `n` records, for logging a sample after a run.
    pub fn sample(&self, n: usize) -> &[QaRecord] {
        &self.examples[..n.min(self.examples.len())]
    }
}

fn record_to_value(record: &QaRecord) -> Value {
    serde_json::json!({
        "question": record.question,
        "answer": record.answer,
        "original_question": record.original_question,
        "original_answer": record.original_answer,
    })
}

/// Structural check over exchange-form records. Never fails; the reason
/// names the record index and the offending keys.
pub fn validate(records: &[Value]) -> Validity {
    if records.is_empty() {
        return Validity::Invalid("Preprocessed data is empty".to_string());
    }
    for (i, record) in records.iter().enumerate() {
        let Some(fields) = record.as_object() else {
            return Validity::Invalid(format!("Item {i} is not an object: {record}"));
        };
        let missing: Vec<&str> = REQUIRED_KEYS.iter().copied().filter(|k| !fields.contains_key(*k)).collect();
        if !missing.is_empty() {
            return Validity::Invalid(format!("Missing required keys [{}] in item {i}: {record}", missing.join(", ")));
        }
        let non_string: Vec<&str> = REQUIRED_KEYS.iter().copied().filter(|k| !fields[*k].is_string()).collect();
        if !non_string.is_empty() {
            return Validity::Invalid(format!("Non-string values for [{}] in item {i}: {record}", non_string.join(", ")));
        }
    }
    Validity::Valid
}

/// Pretty JSON with 2-space indentation; non-ASCII is written as-is.
pub fn serialize(dataset: &Dataset) -> Result<String> {
    Ok(serde_json::to_string_pretty(dataset)?)
}

/// Write the artifact, creating parent directories as needed.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(path, e))?;
    }
    fs::write(path, contents).map_err(|e| Error::io(path, e))?;
    tracing::info!("Formatted data saved to {}", path.display());
    Ok(())
}
