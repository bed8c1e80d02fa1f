//! Tool-list codec: an ordered list of tools ⇄ the single text column the
//! store keeps per spindle.

use thiserror::Error;

use crate::model::Tool;

#[derive(Debug, Error)]
pub enum ToolListError {
    #[error("malformed tool list: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Encode an ordered tool list for storage.
pub fn encode_tools(tools: &[Tool]) -> String {
    serde_json::to_string(tools).expect("tool lists always serialize to JSON")
}

/// Decode a stored tool-list column.
///
/// Text that does not parse as a JSON array of tools is rejected whole;
/// there is never a truncated or partial result.
pub fn decode_tools(text: &str) -> Result<Vec<Tool>, ToolListError> {
    Ok(serde_json::from_str(text)?)
}
