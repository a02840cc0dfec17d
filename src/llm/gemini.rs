use async_stream::try_stream;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};

use crate::llm::{ChatModelClient, ChatStream, ChatTurn, LlmError};

/// Google Gemini client speaking the streamGenerateContent SSE API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        // Ensure base_url doesn't end with a slash
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            api_key,
            base_url,
            model,
            client: reqwest::Client::new(),
        }
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn handle_error_response(status: reqwest::StatusCode, body: &str) -> LlmError {
        // Gemini wraps failures in an {"error": {...}} envelope; fall
        // back to the raw body when it isn't JSON.
        let message = match serde_json::from_str::<GeminiErrorResponse>(body) {
            Ok(envelope) => envelope.error.message,
            Err(_) => body.to_string(),
        };
        LlmError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait::async_trait]
impl ChatModelClient for GeminiClient {
    async fn stream_chat(
        &self,
        history: Vec<ChatTurn>,
        message: &str,
    ) -> Result<ChatStream, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::Config("Gemini API key is not set".to_string()));
        }

        let request = build_request_body(&history, message);

        let response = self
            .client
            .post(self.stream_url())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(Self::handle_error_response(status, &body));
        }

        let stream = try_stream! {
            let mut bytes_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk_result) = bytes_stream.next().await {
                let bytes = chunk_result?;
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                // Process complete SSE events ("data: {json}" blocks
                // separated by a blank line).
                while let Some((boundary, sep_len)) = find_event_boundary(&buffer) {
                    let event = buffer[..boundary].to_string();
                    buffer.drain(..boundary + sep_len);

                    for line in event.lines() {
                        let Some(data) = line.strip_prefix("data: ") else {
                            continue;
                        };

                        let chunk: GenerateChunk = serde_json::from_str(data)
                            .map_err(|e| LlmError::Parse(e.to_string()))?;
                        let text = chunk.text();
                        if !text.is_empty() {
                            yield text;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Locate the end of the next complete SSE event, tolerating both
/// `\n\n` and `\r\n\r\n` separators.
fn find_event_boundary(buffer: &str) -> Option<(usize, usize)> {
    match (buffer.find("\r\n\r\n"), buffer.find("\n\n")) {
        (Some(crlf), Some(lf)) if crlf < lf => Some((crlf, 4)),
        (Some(crlf), None) => Some((crlf, 4)),
        (_, Some(lf)) => Some((lf, 2)),
        (None, None) => None,
    }
}

fn build_request_body(history: &[ChatTurn], message: &str) -> GenerateRequest {
    let mut contents: Vec<GeminiContent> = history
        .iter()
        .map(|turn| GeminiContent {
            role: Some(turn.role.as_str().to_string()),
            parts: vec![GeminiPart {
                text: turn.text.clone(),
            }],
        })
        .collect();

    contents.push(GeminiContent {
        role: Some("user".to_string()),
        parts: vec![GeminiPart {
            text: message.to_string(),
        }],
    });

    GenerateRequest { contents }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    candidates: Option<Vec<GeminiCandidate>>,
}

impl GenerateChunk {
    /// Concatenated text of the first candidate's parts for this chunk.
    fn text(&self) -> String {
        let mut out = String::new();
        if let Some(candidate) = self.candidates.as_ref().and_then(|c| c.first()) {
            if let Some(content) = &candidate.content {
                for part in &content.parts {
                    out.push_str(&part.text);
                }
            }
        }
        out
    }
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}
