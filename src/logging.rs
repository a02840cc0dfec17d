use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Serialize)]
struct LogEntry {
    timestamp: String, // ISO-8601 UTC
    request_id: Uuid,
    role: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

/// Appends one JSONL entry per chat turn handled by the service.
pub struct ConversationLogger {
    file_path: PathBuf,
    file: Option<tokio::fs::File>,
}

impl ConversationLogger {
    /// Create a new logger; generates the file name based on the current UTC time.
    pub async fn new(base_dir: &Path) -> Result<Self> {
        let logs_dir = base_dir.join("logs");
        fs::create_dir_all(&logs_dir).await?;

        let now: DateTime<Utc> = Utc::now();
        let filename = format!("gemchat-{}.jsonl", now.format("%Y-%m-%d-%H%M%S"));
        let file_path = logs_dir.join(filename);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await?;
        Ok(Self {
            file_path,
            file: Some(file),
        })
    }

    /// Append a single log entry. Logging failures are reported to
    /// stderr and never propagated to the request path.
    pub async fn log(&mut self, request_id: Uuid, role: &str, content: &str, model: Option<&str>) {
        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339(),
            request_id,
            role: role.to_string(),
            content: content.to_string(),
            model: model.map(|s| s.to_string()),
        };
        if let Some(file) = &mut self.file {
            if let Ok(json) = serde_json::to_string(&entry) {
                if let Err(e) = file.write_all(json.as_bytes()).await {
                    eprintln!("[Logging error] {}", e);
                } else if let Err(e) = file.write_all(b"\n").await {
                    eprintln!("[Logging error] {}", e);
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn writes_one_json_line_per_entry() {
        let dir = TempDir::new().unwrap();
        let mut logger = ConversationLogger::new(dir.path()).await.unwrap();

        let request_id = Uuid::new_v4();
        logger.log(request_id, "user", "hello", None).await;
        logger
            .log(request_id, "assistant", "hi there", Some("gemini-2.0-flash-exp"))
            .await;

        let contents = tokio::fs::read_to_string(logger.path()).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["role"], "user");
        assert_eq!(first["content"], "hello");
        assert!(first.get("model").is_none());

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["model"], "gemini-2.0-flash-exp");
    }
}
