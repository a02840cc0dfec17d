use serde::{Deserialize, Serialize};

use crate::codeblocks::DetectedCodeBlock;

/// Response body of the non-streaming chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
}

/// Discriminator for streamed chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Content,
    Code,
    End,
}

/// One event in the streamed response sequence.
///
/// `content` chunks carry a single upstream text fragment, `code`
/// chunks carry a completed fenced code block, and the single `end`
/// chunk terminates the sequence with empty data. `language` and
/// `filename` are only present on `code` chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl StreamChunk {
    pub fn content(data: impl Into<String>) -> Self {
        Self {
            kind: ChunkKind::Content,
            data: data.into(),
            language: None,
            filename: None,
        }
    }

    pub fn code(block: &DetectedCodeBlock) -> Self {
        Self {
            kind: ChunkKind::Code,
            data: block.code.clone(),
            language: Some(block.language.clone()),
            filename: Some(block.filename.clone()),
        }
    }

    pub fn end() -> Self {
        Self {
            kind: ChunkKind::End,
            data: String::new(),
            language: None,
            filename: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn content_chunk_omits_code_fields() {
        let json = serde_json::to_string(&StreamChunk::content("hello")).unwrap();
        assert_eq!(json, r#"{"type":"content","data":"hello"}"#);
    }

    #[test]
    fn code_chunk_carries_language_and_filename() {
        let block = DetectedCodeBlock {
            language: "python".to_string(),
            code: "print(1)".to_string(),
            filename: "python_1.py".to_string(),
        };
        let json = serde_json::to_string(&StreamChunk::code(&block)).unwrap();
        assert_eq!(
            json,
            r#"{"type":"code","data":"print(1)","language":"python","filename":"python_1.py"}"#
        );
    }

    #[test]
    fn end_chunk_has_empty_data() {
        let json = serde_json::to_string(&StreamChunk::end()).unwrap();
        assert_eq!(json, r#"{"type":"end","data":""}"#);
    }
}
