use crate::config::OutputLayout;
use crate::domain::model::{Batch, ClassificationResult, InputRecord};
use crate::utils::error::{EmailIntelError, Result};

pub const SENDER_COLUMN: &str = "email_from";
pub const SUBJECT_COLUMN: &str = "subject";
pub const BODY_COLUMN: &str = "body";

const SUMMARY_HEADERS: [&str; 3] = ["email_from", "subject", "ai_analysis"];
const EXPANDED_HEADERS: [&str; 6] = [
    "From",
    "Category",
    "Urgency",
    "Intent",
    "Suggested Action",
    "Error",
];

/// Parse the input table. Fails before anything is classified when the
/// header lacks one of the required columns.
pub fn read_records(data: &[u8]) -> Result<Vec<InputRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let columns = [SENDER_COLUMN, SUBJECT_COLUMN, BODY_COLUMN].map(|name| (name, position(name)));
    let missing: Vec<String> = columns
        .iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EmailIntelError::MissingColumnsError { missing });
    }
    let [sender_idx, subject_idx, body_idx] = columns.map(|(_, idx)| idx.unwrap_or_default());

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell = |idx: usize| row.get(idx).unwrap_or_default().to_string();
        records.push(InputRecord {
            sender: cell(sender_idx),
            subject: cell(subject_idx),
            body: cell(body_idx),
        });
    }

    tracing::debug!("Read {} input rows", records.len());
    Ok(records)
}

/// Text for the `ai_analysis` column: the normalized object as pretty JSON,
/// or the raw reply / diagnostic when nothing could be parsed.
pub fn analysis_text(result: &ClassificationResult) -> Result<String> {
    if result.parse_error {
        return Ok(result.raw.clone());
    }
    Ok(serde_json::to_string_pretty(&result.fields_json())?)
}

/// Render the results table, one row per batch entry in batch order.
pub fn write_table(batch: &Batch, layout: OutputLayout) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    match layout {
        OutputLayout::Summary => {
            writer.write_record(SUMMARY_HEADERS)?;
            for item in &batch.items {
                writer.write_record([
                    item.record.sender.as_str(),
                    item.record.subject.as_str(),
                    analysis_text(&item.result)?.as_str(),
                ])?;
            }
        }
        OutputLayout::Expanded => {
            writer.write_record(EXPANDED_HEADERS)?;
            for item in &batch.items {
                let result = &item.result;
                let error = if result.parse_error { result.raw.as_str() } else { "" };
                writer.write_record([
                    item.record.sender.as_str(),
                    result.category.map(|c| c.as_str()).unwrap_or_default(),
                    result.urgency.map(|u| u.as_str()).unwrap_or_default(),
                    result.intent.as_deref().unwrap_or_default(),
                    result.suggested_action.as_deref().unwrap_or_default(),
                    error,
                ])?;
            }
        }
    }

    writer
        .into_inner()
        .map_err(|e| EmailIntelError::IoError(e.into_error()))
}
