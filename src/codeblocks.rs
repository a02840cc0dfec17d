use regex::Regex;

/// Map a fence language tag to a file extension. Case-insensitive;
/// unknown or empty tags fall back to "txt".
pub fn extension_for(language: &str) -> &'static str {
    match language.to_lowercase().as_str() {
        "javascript" => "js",
        "typescript" => "ts",
        "jsx" => "jsx",
        "tsx" => "tsx",
        "python" => "py",
        "java" => "java",
        "cpp" => "cpp",
        "c" => "c",
        "csharp" => "cs",
        "php" => "php",
        "ruby" => "rb",
        "go" => "go",
        "rust" => "rs",
        "swift" => "swift",
        "kotlin" => "kt",
        "html" => "html",
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "json" => "json",
        "xml" => "xml",
        "yaml" => "yml",
        "yml" => "yml",
        "markdown" => "md",
        "md" => "md",
        "sql" => "sql",
        "bash" => "sh",
        "shell" => "sh",
        "sh" => "sh",
        _ => "txt",
    }
}

/// A completed fenced code block found in the accumulated response.
///
/// Value equality is what the streaming orchestrator dedups on, so
/// two blocks with the same language, body, and filename are the same
/// block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedCodeBlock {
    pub language: String,
    pub code: String,
    pub filename: String,
}

/// Finds closed ``` fences in a text buffer.
pub struct CodeBlockDetector {
    pattern: Regex,
}

impl CodeBlockDetector {
    pub fn new() -> Self {
        Self {
            // Opening fence with an optional language tag, then
            // everything (including newlines) up to the closing fence.
            pattern: Regex::new(r"(?s)```(\w+)?\n(.*?)```").unwrap(),
        }
    }

    /// Scan the whole buffer and return every closed code block in
    /// document order. Untagged fences get the "text" language;
    /// filenames carry a 1-based ordinal within this scan, so a given
    /// buffer always produces the same triples no matter how many
    /// times it is re-scanned.
    pub fn detect(&self, text: &str) -> Vec<DetectedCodeBlock> {
        let mut blocks = Vec::new();

        for captures in self.pattern.captures_iter(text) {
            let language = captures
                .get(1)
                .map(|m| m.as_str())
                .unwrap_or("text")
                .to_string();
            let code = captures
                .get(2)
                .map(|m| m.as_str())
                .unwrap_or("")
                .trim()
                .to_string();
            let filename = format!(
                "{}_{}.{}",
                language,
                blocks.len() + 1,
                extension_for(&language)
            );

            blocks.push(DetectedCodeBlock {
                language,
                code,
                filename,
            });
        }

        blocks
    }
}

impl Default for CodeBlockDetector {
    fn default() -> Self {
        Self::new()
    }
}
