use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use futures_util::StreamExt;

use crate::chat::history::adapt_history;
use crate::codeblocks::{CodeBlockDetector, DetectedCodeBlock};
use crate::llm::ChatModelClient;
use crate::models::{ChunkKind, Message, StreamChunk};

/// Drive one chat request end-to-end against the upstream model.
///
/// Emits a `content` chunk per upstream fragment, a `code` chunk the
/// first time each completed fenced block is seen in the accumulated
/// response, and exactly one terminal `end` chunk - also on failure,
/// where the error is folded into a final "Error: ..." content chunk
/// rather than surfaced as a distinct event. The accumulated buffer
/// and the emitted-block set live only as long as the returned
/// stream; dropping it cancels the upstream generation.
pub fn stream_chat_events(
    client: Arc<dyn ChatModelClient>,
    message: String,
    history: Vec<Message>,
) -> impl Stream<Item = StreamChunk> + Send {
    stream! {
        let turns = adapt_history(&history);

        let mut upstream = match client.stream_chat(turns, &message).await {
            Ok(upstream) => upstream,
            Err(e) => {
                yield StreamChunk::content(format!("Error: {e}"));
                yield StreamChunk::end();
                return;
            }
        };

        let detector = CodeBlockDetector::new();
        let mut accumulated = String::new();
        let mut emitted: Vec<DetectedCodeBlock> = Vec::new();

        while let Some(fragment) = upstream.next().await {
            match fragment {
                Ok(text) => {
                    accumulated.push_str(&text);
                    yield StreamChunk::content(text);

                    // Re-scan the whole buffer; already-closed blocks
                    // reappear with identical triples, so value
                    // equality suppresses re-emission.
                    for block in detector.detect(&accumulated) {
                        if !emitted.contains(&block) {
                            yield StreamChunk::code(&block);
                            emitted.push(block);
                        }
                    }
                }
                Err(e) => {
                    yield StreamChunk::content(format!("Error: {e}"));
                    yield StreamChunk::end();
                    return;
                }
            }
        }

        yield StreamChunk::end();
    }
}

/// Non-streaming variant: run the same orchestration to completion
/// and return the concatenated `content` payloads. Code blocks and
/// the end marker are not part of the materialized result.
pub async fn collect_response(
    client: Arc<dyn ChatModelClient>,
    message: String,
    history: Vec<Message>,
) -> String {
    let events = stream_chat_events(client, message, history);
    futures::pin_mut!(events);

    let mut response = String::new();
    while let Some(chunk) = events.next().await {
        if chunk.kind == ChunkKind::Content {
            response.push_str(&chunk.data);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatStream, ChatTurn, LlmError};
    use pretty_assertions::assert_eq;

    /// Scripted upstream standing in for Gemini.
    struct ScriptedClient {
        open_error: Option<String>,
        fragments: Vec<Result<String, String>>,
    }

    impl ScriptedClient {
        fn fragments(fragments: &[&str]) -> Self {
            Self {
                open_error: None,
                fragments: fragments.iter().map(|f| Ok(f.to_string())).collect(),
            }
        }

        fn failing_open(message: &str) -> Self {
            Self {
                open_error: Some(message.to_string()),
                fragments: Vec::new(),
            }
        }

        fn failing_mid_stream(fragments: &[&str], message: &str) -> Self {
            let mut scripted: Vec<Result<String, String>> =
                fragments.iter().map(|f| Ok(f.to_string())).collect();
            scripted.push(Err(message.to_string()));
            Self {
                open_error: None,
                fragments: scripted,
            }
        }
    }

    #[async_trait::async_trait]
    impl ChatModelClient for ScriptedClient {
        async fn stream_chat(
            &self,
            _history: Vec<ChatTurn>,
            _message: &str,
        ) -> Result<ChatStream, LlmError> {
            if let Some(message) = &self.open_error {
                return Err(LlmError::Api {
                    status: 500,
                    message: message.clone(),
                });
            }

            let items: Vec<Result<String, LlmError>> = self
                .fragments
                .iter()
                .map(|f| match f {
                    Ok(text) => Ok(text.clone()),
                    Err(message) => Err(LlmError::Parse(message.clone())),
                })
                .collect();
            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    async fn run(client: ScriptedClient) -> Vec<StreamChunk> {
        stream_chat_events(Arc::new(client), "message".to_string(), Vec::new())
            .collect()
            .await
    }

    #[tokio::test]
    async fn emits_content_per_fragment_and_single_end() {
        let chunks = run(ScriptedClient::fragments(&["Hello", " world"])).await;

        assert_eq!(
            chunks,
            vec![
                StreamChunk::content("Hello"),
                StreamChunk::content(" world"),
                StreamChunk::end(),
            ]
        );
    }

    #[tokio::test]
    async fn code_block_emitted_once_it_closes_and_never_again() {
        // The block closes in the second fragment; later fragments
        // rediscover it on every re-scan.
        let chunks = run(ScriptedClient::fragments(&[
            "Here:\n```python\nprint(1)\n",
            "```\n",
            "and that's it",
        ]))
        .await;

        let code_chunks: Vec<&StreamChunk> = chunks
            .iter()
            .filter(|c| c.kind == ChunkKind::Code)
            .collect();
        assert_eq!(code_chunks.len(), 1);
        assert_eq!(code_chunks[0].data, "print(1)");
        assert_eq!(code_chunks[0].language.as_deref(), Some("python"));
        assert_eq!(code_chunks[0].filename.as_deref(), Some("python_1.py"));

        // Code chunk arrives right after the fragment that closed the
        // fence, before any later content.
        assert_eq!(chunks[2].kind, ChunkKind::Code);
        assert_eq!(chunks[3], StreamChunk::content("and that's it"));
    }

    #[tokio::test]
    async fn unterminated_block_is_never_emitted() {
        let chunks = run(ScriptedClient::fragments(&["```python\nprint(1)\n"])).await;
        assert!(chunks.iter().all(|c| c.kind != ChunkKind::Code));
    }

    #[tokio::test]
    async fn no_duplicate_code_triples_across_a_request() {
        let chunks = run(ScriptedClient::fragments(&[
            "```python\na = 1\n```\n",
            "```python\na = 1\n```\n",
        ]))
        .await;

        // Identical second block gets the ordinal 2 filename, so it is
        // a distinct triple and is emitted; no two code chunks are
        // equal.
        let code_chunks: Vec<&StreamChunk> = chunks
            .iter()
            .filter(|c| c.kind == ChunkKind::Code)
            .collect();
        assert_eq!(code_chunks.len(), 2);
        assert_eq!(code_chunks[0].filename.as_deref(), Some("python_1.py"));
        assert_eq!(code_chunks[1].filename.as_deref(), Some("python_2.py"));
        for (i, a) in code_chunks.iter().enumerate() {
            for b in &code_chunks[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[tokio::test]
    async fn open_failure_yields_error_content_then_end() {
        let chunks = run(ScriptedClient::failing_open("quota exceeded")).await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].kind, ChunkKind::Content);
        assert!(chunks[0].data.starts_with("Error: "));
        assert!(chunks[0].data.contains("quota exceeded"));
        assert_eq!(chunks[1], StreamChunk::end());
    }

    #[tokio::test]
    async fn mid_stream_failure_still_ends_exactly_once() {
        let chunks =
            run(ScriptedClient::failing_mid_stream(&["partial"], "connection reset")).await;

        let ends = chunks.iter().filter(|c| c.kind == ChunkKind::End).count();
        assert_eq!(ends, 1);
        assert_eq!(chunks.last(), Some(&StreamChunk::end()));
        assert!(chunks[chunks.len() - 2].data.starts_with("Error: "));
    }

    #[tokio::test]
    async fn collect_response_concatenates_content_only() {
        let client = Arc::new(ScriptedClient::fragments(&[
            "Intro ",
            "```python\nprint(1)\n```",
            " outro",
        ]));

        let response = collect_response(client, "message".to_string(), Vec::new()).await;
        assert_eq!(response, "Intro ```python\nprint(1)\n``` outro");
    }

    #[tokio::test]
    async fn collect_response_surfaces_error_text() {
        let client = Arc::new(ScriptedClient::failing_open("bad key"));
        let response = collect_response(client, "message".to_string(), Vec::new()).await;
        assert!(response.starts_with("Error: "));
    }
}
