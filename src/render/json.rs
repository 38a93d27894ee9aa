//! JSON rendering for extraction results.

use std::io::Write;

use crate::error::{Error, Result};
use crate::model::ExtractionResult;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with two-space indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an extraction result to a JSON string.
///
/// Non-ASCII text is written as-is, not escaped.
pub fn to_json(result: &ExtractionResult, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(result),
        JsonFormat::Compact => serde_json::to_string(result),
    };

    json.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Write an extraction result as JSON to a writer.
pub fn write_json<W: Write>(
    result: &ExtractionResult,
    format: JsonFormat,
    mut writer: W,
) -> Result<()> {
    let json = to_json(result, format)?;
    writer.write_all(json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingCandidate, HeadingLevel};

    fn sample() -> ExtractionResult {
        ExtractionResult {
            title: "Überblick 2024".to_string(),
            outline: vec![HeadingCandidate::new(HeadingLevel::H1, "1. Einleitung", 2)],
        }
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        let expected = r#"{
  "title": "Überblick 2024",
  "outline": [
    {
      "level": "H1",
      "text": "1. Einleitung",
      "page": 2
    }
  ]
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&ExtractionResult::empty(), JsonFormat::Compact).unwrap();
        assert_eq!(json, r#"{"title":"Untitled","outline":[]}"#);
    }

    #[test]
    fn test_write_json() {
        let mut buf = Vec::new();
        write_json(&sample(), JsonFormat::Compact, &mut buf).unwrap();
        let parsed: ExtractionResult = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, sample());
    }
}
