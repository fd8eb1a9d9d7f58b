// src/token.rs
use serde::{Deserialize, Serialize};

/// One lexed token. `kind` names a terminal of the grammar; anything else
/// is reported as a syntax error where it appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: String,
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: impl Into<String>, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
            line,
        }
    }
}

/// Parse a JSON array of `{ "kind", "text", "line" }` objects.
pub fn load_tokens_json(data: &[u8]) -> Result<Vec<Token>, String> {
    serde_json::from_slice(data).map_err(|e| format!("Failed to parse token JSON: {e}"))
}
